use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::error::{SlidesageError, SlidesageResult};
use crate::foundation::math::mul_div255_u16;

/// Raster image in premultiplied RGBA8 form.
#[derive(Clone, PartialEq)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl std::fmt::Debug for PreparedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes_ptr", &Arc::as_ptr(&self.rgba8_premul))
            .finish()
    }
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul_rgba8(width: u32, height: u32, bytes: Vec<u8>) -> SlidesageResult<Self> {
        if width == 0 || height == 0 {
            return Err(SlidesageError::media("image width/height must be > 0"));
        }
        if bytes.len() != width as usize * height as usize * 4 {
            return Err(SlidesageError::media(format!(
                "image byte length mismatch: got {}, expected {}",
                bytes.len(),
                width as usize * height as usize * 4
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(bytes),
        })
    }

    /// A single-color image.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> SlidesageResult<Self> {
        let px = width as usize * height as usize;
        let mut bytes = Vec::with_capacity(px * 4);
        for _ in 0..px {
            bytes.extend_from_slice(&premul);
        }
        Self::from_premul_rgba8(width, height, bytes)
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> SlidesageResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    PreparedImage::from_premul_rgba8(width, height, rgba8_premul)
}

/// Read and decode an image file.
pub fn load_image_file(path: &Path) -> SlidesageResult<PreparedImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u16(u16::from(*c), a) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
