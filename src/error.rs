use std::error::Error;
use std::fmt::{Display, Formatter};

/// Typed failures raised by the preview pipeline.
///
/// These travel inside `anyhow::Error`; use [`find_preview_error`] to recover
/// the variant from a context chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewError {
    InvalidDimensions { width: u32, height: u32 },
    InvalidTexture { width: u32, height: u32, len: usize },
    MissingTexture { key: String },
    InvalidMesh { reason: String },
}

impl PreviewError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDimensions { .. } => "INVALID_DIMENSIONS",
            Self::InvalidTexture { .. } => "INVALID_TEXTURE",
            Self::MissingTexture { .. } => "MISSING_TEXTURE",
            Self::InvalidMesh { .. } => "INVALID_MESH",
        }
    }
}

impl Display for PreviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "preview size must be positive, got {width}x{height}")
            }
            Self::InvalidTexture { width, height, len } => write!(
                f,
                "texture payload {width}x{height} is invalid: expected {} bytes, got {len}",
                (*width as usize) * (*height as usize) * 4
            ),
            Self::MissingTexture { key } => {
                write!(f, "content generator did not provide texture '{key}'")
            }
            Self::InvalidMesh { reason } => write!(f, "invalid mesh: {reason}"),
        }
    }
}

impl Error for PreviewError {}

pub fn find_preview_error(error: &anyhow::Error) -> Option<&PreviewError> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<PreviewError>())
}
