use serde::Serialize;

/// JSON envelope shared by every endpoint:
///
/// ```json
/// {
///   "success": true,
///   "data": { "id": 7, "status": "active" },
///   "message": "Attendance session retrieved"
/// }
/// ```
///
/// Error responses carry `T::default()` as `data` and `success: false`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}
