pub mod attendance_session;
pub mod maintenance_marker;
pub mod second_phase_key;

pub use attendance_session::Entity as AttendanceSession;
pub use maintenance_marker::Entity as MaintenanceMarker;
pub use second_phase_key::Entity as SecondPhaseKey;
