pub mod chunk;
pub mod content;
pub mod encoding;
pub mod error;
pub mod math;
pub mod mesh;
pub mod plan;
pub mod preview;
pub mod procedural;
pub mod raster;
pub mod shading;
pub mod tangent;
pub mod texture;
pub mod tonemap;

pub use error::{find_preview_error, PreviewError};
pub use preview::{build_preview, build_preview_with, PreviewImage, PreviewKind};
