//! The prepared, ready-to-play image.

use std::path::Path;

use crate::compositor::{compose, SourceImage};
use crate::geometry::{resolve, TerminalSize};
use crate::palette::Palette;
use crate::quantizer::{quantize, IndexGrid};
use crate::Result;

/// Options controlling how an image is prepared.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// How often an animation is played. 0 shows the first picture only.
    /// Ignored for still images, which are always shown once.
    pub loop_count: u32,

    /// Scales the inter-frame delay; above 1.0 slows an animation down,
    /// below 1.0 speeds it up.
    pub delay_multiplier: f64,

    /// Fixed output width in cells. 0 fits the image to the terminal.
    ///
    /// The height follows from the aspect ratio. Handy over SSH, where
    /// terminal resizes aren't always picked up.
    pub user_width: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            loop_count: 1,
            delay_multiplier: 1.0,
            user_width: 0,
        }
    }
}

/// One quantized frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedFrame {
    pub grid: IndexGrid,
    /// How long the frame stays visible, in sink delay units (milliseconds)
    pub delay: u64,
}

/// A fully prepared image: quantized frames in playback order plus the
/// number of passes to play.
#[derive(Clone, Debug)]
pub struct RenderTarget {
    frames: Vec<RenderedFrame>,
    loop_count: u32,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Decodes, fits and quantizes the image at `path`.
    ///
    /// # Errors
    /// Fails on I/O and decode errors, and if the terminal size is needed
    /// but can't be determined.
    pub fn open<P, T, C>(path: P, options: &RenderOptions, terminal: &T, palette: &C) -> Result<Self>
    where
        P: AsRef<Path>,
        T: TerminalSize + ?Sized,
        C: Palette + ?Sized,
    {
        let source = SourceImage::open(path, options.loop_count > 0)?;
        Self::from_source(source, options, terminal, palette)
    }

    /// Like [`RenderTarget::open`] for an in-memory image.
    pub fn from_bytes<T, C>(bytes: &[u8], options: &RenderOptions, terminal: &T, palette: &C) -> Result<Self>
    where
        T: TerminalSize + ?Sized,
        C: Palette + ?Sized,
    {
        let source = SourceImage::from_bytes(bytes, options.loop_count > 0)?;
        Self::from_source(source, options, terminal, palette)
    }

    /// Runs the pipeline on an already decoded image.
    pub fn from_source<T, C>(
        source: SourceImage,
        options: &RenderOptions,
        terminal: &T,
        palette: &C,
    ) -> Result<Self>
    where
        T: TerminalSize + ?Sized,
        C: Palette + ?Sized,
    {
        let animated = source.is_animated() && options.loop_count > 0;
        let (width, height) = source.dimensions();
        let geometry = resolve(width, height, options.user_width, animated, terminal)?;

        let loop_count = if animated { options.loop_count } else { 1 };
        let mut composited = compose(source);
        if !animated {
            composited.truncate(1);
            if let Some(first) = composited.first_mut() {
                first.delay_ms = 0;
            }
        }

        let frames: Vec<RenderedFrame> = composited
            .iter()
            .map(|frame| quantize(frame, geometry, palette, options.delay_multiplier))
            .collect();

        log::debug!(
            "prepared {} frame(s) at {}x{}, {} loop(s)",
            frames.len(),
            geometry.width,
            geometry.height,
            loop_count
        );

        Ok(Self {
            frames,
            loop_count,
            width: geometry.width,
            height: geometry.height,
        })
    }

    /// Assembles a target from already quantized frames.
    ///
    /// Returns `None` if a frame's size differs from `width`x`height`.
    pub fn from_frames(frames: Vec<RenderedFrame>, loop_count: u32, width: u32, height: u32) -> Option<Self> {
        if frames
            .iter()
            .any(|f| f.grid.width() != width || f.grid.height() != height)
        {
            return None;
        }
        Some(Self {
            frames,
            loop_count,
            width,
            height,
        })
    }

    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}
