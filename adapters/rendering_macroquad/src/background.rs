use anyhow::{Context, Result};
use chernomap_rendering::BackgroundPresentation;
use image::imageops::FilterType;
use macroquad::texture::Texture2D;

/// RGBA pixels resampled to the presentation's requested resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DecodedBackground {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) rgba: Vec<u8>,
}

impl DecodedBackground {
    /// Reads and resamples the background image with a Lanczos filter.
    pub(crate) fn load(background: &BackgroundPresentation) -> Result<Self> {
        let width = u16::try_from(background.width)
            .with_context(|| format!("background width {} is too large", background.width))?;
        let height = u16::try_from(background.height)
            .with_context(|| format!("background height {} is too large", background.height))?;

        let decoded = image::open(&background.path).with_context(|| {
            format!("failed to decode background at {}", background.path.display())
        })?;
        let rgba = decoded
            .resize_exact(background.width, background.height, FilterType::Lanczos3)
            .to_rgba8()
            .into_raw();

        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Uploads the pixels to the GPU. Must run inside the window future.
    pub(crate) fn upload(&self) -> Texture2D {
        Texture2D::from_rgba8(self.width, self.height, &self.rgba)
    }
}
