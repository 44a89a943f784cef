use std::path::PathBuf;

/// Failures that can occur while building a scene or loading resources.
///
/// Invalid BSDF or light samples are *not* errors: they are ordinary control
/// flow signalled through `Option`/zero-weight values. Numerical invariants
/// inside the kernel are `debug_assert!`s instead, since a silently wrong
/// image is worse than a crash.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid scene: {0}")]
    InvalidScene(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn invalid_scene(message: impl Into<String>) -> Self {
        Error::InvalidScene(message.into())
    }
}
