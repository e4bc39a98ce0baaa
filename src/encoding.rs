use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};

use crate::preview::PreviewImage;

/// Encode a preview as PNG, creating parent directories as needed.
pub fn write_png(path: &Path, preview: &PreviewImage) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }

    let image = RgbaImage::from_raw(preview.width(), preview.height(), preview.rgba().to_vec())
        .ok_or_else(|| {
            anyhow!(
                "preview buffer does not match {}x{} RGBA8",
                preview.width(),
                preview.height()
            )
        })?;
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to write PNG {}", path.display()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
