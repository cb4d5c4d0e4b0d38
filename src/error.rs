use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to load image {path}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("canvas dimensions differ: test is {test_w}x{test_h}, goal is {goal_w}x{goal_h}")]
    DimensionMismatch {
        test_w: usize,
        test_h: usize,
        goal_w: usize,
        goal_h: usize,
    },

    #[error("pixel buffer holds {actual} bytes, {width}x{height} RGBA needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image is {width}x{height}, it needs at least one pixel")]
    EmptyImage { width: usize, height: usize },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("malformed drawing: {0}")]
    Genome(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    pub fn genome(msg: impl Into<String>) -> Self {
        Self::Genome(msg.into())
    }
}
