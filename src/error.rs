// One error type for the whole crate.
// Every variant states *where* things went wrong.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Creating the demo window failed.
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Pushing a frame to the demo window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),

    /// The surface has not been created yet (or was destroyed), so it cannot be locked.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The surface went away while a frame was being drawn.
    #[error("surface lost: {0}")]
    SurfaceLost(String),

    /// The draw thread was told to stop in the middle of a frame.
    #[error("render cancelled")]
    Cancelled,

    /// Settings could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    pub fn surface_unavailable(msg: impl Into<String>) -> Self {
        Self::SurfaceUnavailable(msg.into())
    }

    pub fn surface_lost(msg: impl Into<String>) -> Self {
        Self::SurfaceLost(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            Error::surface_unavailable("x")
                .to_string()
                .contains("surface unavailable:")
        );
        assert!(Error::surface_lost("x").to_string().contains("surface lost:"));
        assert!(Error::config("x").to_string().contains("config error:"));
        assert_eq!(Error::Cancelled.to_string(), "render cancelled");
    }

    #[test]
    fn io_errors_convert() {
        let err: Error = std::io::Error::other("boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
