mod attendance_test;
mod health_test;
mod internal_test;
