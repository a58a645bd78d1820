use std::path::PathBuf;

/// Errors produced while processing an image through the stage pipeline
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The source image could not be opened or decoded
    #[error("failed to load image {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The source image decoded to zero pixels
    #[error("input image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// A caller supplied a value outside the accepted range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A figure or debug artifact could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures caused by the source image itself
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Input { .. } | Error::EmptyImage { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
