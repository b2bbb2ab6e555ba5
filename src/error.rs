use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No drawable target this frame. Transient: the next tick tries again.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),
    /// A drawing call failed inside the backend.
    #[error("backend failure: {0}")]
    Backend(String),
    /// The backend's scratch resources were already released.
    #[error("backend resources released")]
    Released,
}

impl RenderError {
    /// Failures that should stop self-scheduling until the host resumes.
    pub fn is_sticky(&self) -> bool {
        !matches!(self, RenderError::SurfaceUnavailable(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubscribeError {
    #[error("stats subscriber limit reached ({0})")]
    Full(usize),
}

pub fn surface(m: &str) -> RenderError {
    RenderError::SurfaceUnavailable(m.to_string())
}

pub fn backend(m: &str) -> RenderError {
    RenderError::Backend(m.to_string())
}
