//! Session models.

/// How a session continues after a request completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionModel {
    /// Each completed or interrupted request is followed by a reset, and the
    /// session lasts until either side sends `SessionEnd`
    #[default]
    MultiRequest,
    /// The session ends with its first request: ending output also ends the
    /// session
    SingleRequest,
}

impl SessionModel {
    /// Whether the session continues after a request.
    pub fn continues(self) -> bool {
        self == Self::MultiRequest
    }
}
