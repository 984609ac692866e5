//! Resizing and palette quantization of composited frames.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::compositor::CompositedFrame;
use crate::geometry::Geometry;
use crate::palette::Palette;
use crate::target::RenderedFrame;

/// A grid of palette indices stored row by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexGrid {
    width: u32,
    height: u32,
    indices: Vec<u8>,
}

impl IndexGrid {
    /// Creates a grid from row-major indices.
    ///
    /// Returns `None` if `indices` doesn't hold exactly `width * height` entries.
    pub fn from_raw(width: u32, height: u32, indices: Vec<u8>) -> Option<Self> {
        if indices.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            indices,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Palette index at (`x`, `y`).
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.indices[(y * self.width + x) as usize]
    }

    /// Iterates over the rows, top to bottom. A zero-width grid still has
    /// `height` (empty) rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let width = self.width as usize;
        (0..self.height as usize).map(move |y| &self.indices[y * width..(y + 1) * width])
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.indices
    }
}

/// Display delay for a frame shown `source_delay_ms` in the original.
///
/// Drawing a frame on a terminal takes a good part of the frame time
/// already, so the original timing is divided by 10 before
/// `delay_multiplier` is applied. Never negative.
pub fn render_delay(source_delay_ms: u32, delay_multiplier: f64) -> u64 {
    let delay = (source_delay_ms as f64 / 10.0 * delay_multiplier).ceil();
    if delay.is_finite() && delay > 0.0 {
        delay as u64
    } else {
        0
    }
}

/// Resizes `frame` to `geometry` with a Lanczos3 filter and maps every
/// pixel through `palette`, exactly once per pixel in row-major order.
pub fn quantize<P: Palette + ?Sized>(
    frame: &CompositedFrame,
    geometry: Geometry,
    palette: &P,
    delay_multiplier: f64,
) -> RenderedFrame {
    let Geometry { width, height } = geometry;
    let delay = render_delay(frame.delay_ms, delay_multiplier);

    if width == 0 || height == 0 {
        return RenderedFrame {
            grid: IndexGrid {
                width,
                height,
                indices: Vec::new(),
            },
            delay,
        };
    }

    let scaled: RgbaImage = imageops::resize(&frame.raster, width, height, FilterType::Lanczos3);
    let indices = scaled
        .pixels()
        .map(|pixel| palette.nearest_index(*pixel))
        .collect();

    RenderedFrame {
        grid: IndexGrid {
            width,
            height,
            indices,
        },
        delay,
    }
}
