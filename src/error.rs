use thiserror::Error;

/// Fatal setup failures. Each one ends the run before the message loop starts.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Installing the global keyboard or mouse hook failed.
    #[error("failed to subscribe to global input: {0}")]
    Subscription(String),
    /// Module handle, cursor, class registration, window or timer setup failed.
    #[error("failed to set up overlay window: {0}")]
    WindowSetup(String),
}

impl TrackerError {
    pub fn subscription(err: impl std::fmt::Display) -> Self {
        TrackerError::Subscription(err.to_string())
    }

    pub fn window_setup(err: impl std::fmt::Display) -> Self {
        TrackerError::WindowSetup(err.to_string())
    }

    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrackerError::Subscription(_) => 2,
            TrackerError::WindowSetup(_) => 3,
        }
    }
}
