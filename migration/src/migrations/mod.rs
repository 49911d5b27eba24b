pub mod m202510010001_create_attendance_sessions;
pub mod m202510010002_create_second_phase_keys;
pub mod m202510010003_create_maintenance_markers;
