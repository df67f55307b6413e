//! Texture loader.
//!
//! Decodes one image through an [`ImageDecoder`], uploads it as an RGBA8 2D
//! texture with an optional mip chain, and drops the CPU copy straight after
//! the upload attempt.

use std::path::{Path, PathBuf};

use anyhow::Context;
use image::imageops::FilterType;
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::error::SetupError;
use crate::gfx::{GraphicsApi, MipLevel, TextureDesc, TextureHandle};

/// Decoded image, always expanded to RGBA8.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file (1–4), for diagnostics.
    pub channels: u8,
    /// `width * height * 4` bytes, rows top to bottom.
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}

/// Image-decode collaborator.
pub trait ImageDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage>;
}

/// [`ImageDecoder`] backed by the `image` crate (PNG and JPEG).
#[derive(Debug, Default, Copy, Clone)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage> {
        let img = image::open(path).with_context(|| format!("cannot read {}", path.display()))?;
        let channels = img.color().channel_count();
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(DecodedImage {
            width,
            height,
            channels,
            pixels: rgba.into_raw(),
        })
    }
}

/// Upload options.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureSettings {
    /// Generate a full mip chain for minification.
    pub mipmaps: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self { mipmaps: true }
    }
}

/// Uploaded texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub mip_levels: u32,
}

/// Number of levels in a full mip chain for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builds levels 1.. of the mip chain by repeated halving.
fn downsample_chain(image: &DecodedImage) -> Vec<RgbaImage> {
    let levels = mip_level_count(image.width, image.height);
    let mut chain: Vec<RgbaImage> = Vec::with_capacity(levels.saturating_sub(1) as usize);

    let Some(base) =
        ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(image.width, image.height, &image.pixels[..])
    else {
        return chain;
    };

    let (mut w, mut h) = (image.width, image.height);
    for _ in 1..levels {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        let next = match chain.last() {
            Some(prev) => image::imageops::resize(prev, w, h, FilterType::Triangle),
            None => image::imageops::resize(&base, w, h, FilterType::Triangle),
        };
        chain.push(next);
    }

    chain
}

fn decode_failure(path: &Path, reason: String) -> SetupError {
    let reason = if reason.trim().is_empty() {
        "decoder reported no reason".to_string()
    } else {
        reason
    };
    SetupError::Decode {
        path: PathBuf::from(path),
        reason,
    }
}

fn upload<G: GraphicsApi>(
    gpu: &mut G,
    image: &DecodedImage,
    settings: &TextureSettings,
    label: &str,
) -> (Option<TextureHandle>, u32) {
    let chain = if settings.mipmaps {
        downsample_chain(image)
    } else {
        Vec::new()
    };

    let mut levels = Vec::with_capacity(chain.len() + 1);
    levels.push(MipLevel {
        width: image.width,
        height: image.height,
        pixels: &image.pixels,
    });
    levels.extend(chain.iter().map(|level| MipLevel {
        width: level.width(),
        height: level.height(),
        pixels: level.as_raw(),
    }));

    let handle = gpu.create_texture(&TextureDesc {
        label,
        levels: &levels,
    });
    (handle, levels.len() as u32)
}

/// Decodes `path` and uploads it.
///
/// The texture allocation step is never reached if decoding fails or yields
/// no pixels. The decoded pixels are released before returning either way.
pub fn load_texture<G, D>(
    gpu: &mut G,
    decoder: &D,
    path: &Path,
    settings: &TextureSettings,
) -> Result<Texture, SetupError>
where
    G: GraphicsApi,
    D: ImageDecoder + ?Sized,
{
    log::debug!("decoding texture {}", path.display());

    let image = decoder
        .decode(path)
        .map_err(|e| decode_failure(path, format!("{e:#}")))?;

    if image.is_empty() {
        return Err(decode_failure(path, "decoder returned no pixel data".to_string()));
    }
    let expected = image.width as usize * image.height as usize * 4;
    if image.pixels.len() != expected {
        return Err(decode_failure(
            path,
            format!(
                "pixel buffer holds {} bytes, expected {expected} for {}x{} RGBA",
                image.pixels.len(),
                image.width,
                image.height
            ),
        ));
    }

    let label = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("texture");
    let (handle, mip_levels) = upload(gpu, &image, settings, label);

    let (width, height, channels) = (image.width, image.height, image.channels);
    drop(image);

    let handle = handle.ok_or(SetupError::TextureAllocation { width, height })?;
    log::info!("texture {label} uploaded ({width}x{height}, {channels} channels, {mip_levels} mips)");

    Ok(Texture {
        handle,
        width,
        height,
        channels,
        mip_levels,
    })
}
