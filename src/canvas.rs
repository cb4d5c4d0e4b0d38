use std::path::Path;

use image::{imageops::FilterType::Lanczos3, ColorType, DynamicImage, ImageReader};
use tracing::info;

use crate::{
    error::{Error, Result},
    models::color::Color,
};

/// Row-major RGBA8 raster, channel order r, g, b, a.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Canvas {
    /// Opaque white.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            data: vec![255u8; width * height * 4],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Canvas> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Canvas {
            width,
            height,
            data,
        })
    }

    /// Composites the image over opaque white, so the result is always fully opaque.
    pub fn from_image(img: DynamicImage) -> Canvas {
        let rgba = img.into_rgba8();
        let (width, height) = (rgba.width() as usize, rgba.height() as usize);
        let mut data = rgba.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as f64 / 255.0;
            let white = 255.0 * (1.0 - a);
            for c in &mut px[..3] {
                *c = (*c as f64 * a + white).round() as u8;
            }
            px[3] = 255;
        }
        Canvas {
            width,
            height,
            data,
        }
    }

    /// Decodes an image file, downscaling it when it exceeds the given maximum size.
    pub fn load(
        path: impl AsRef<Path>,
        max_width: Option<u32>,
        max_height: Option<u32>,
    ) -> Result<Canvas> {
        let path = path.as_ref();
        let image_error = |source| Error::Image {
            path: path.to_path_buf(),
            source,
        };
        let mut img = ImageReader::open(path)
            .map_err(|e| image_error(image::ImageError::IoError(e)))?
            .decode()
            .map_err(image_error)?;

        // downscale if source image is too large
        let max_w = max_width.unwrap_or(u32::MAX);
        let max_h = max_height.unwrap_or(u32::MAX);
        if img.width() > max_w || img.height() > max_h {
            let (w, h) = (img.width(), img.height());
            img = img.resize(max_w.min(w), max_h.min(h), Lanczos3);
            info!(
                "downscaled {}x{} to {}x{}",
                w,
                h,
                img.width(),
                img.height()
            );
        }

        Ok(Canvas::from_image(img))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        image::save_buffer(
            path,
            &self.data,
            self.width as u32,
            self.height as u32,
            ColorType::Rgba8,
        )
        .map_err(|source| Error::Image {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn same_size(&self, other: &Canvas) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn fill(&mut self, color: Color) {
        let px = to_bytes(color);
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let i = self.index(x, y);
        &mut self.data[i..i + 4]
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        4 * (y * self.width + x)
    }
}

fn to_bytes(color: Color) -> [u8; 4] {
    [color.r, color.g, color.b, color.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}
