pub mod app;

pub use app::{local, make_test_app};
