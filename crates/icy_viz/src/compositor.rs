//! Decoding and animation-frame compositing.
//!
//! GIF frames are often partial: a frame only covers the area that changed
//! and relies on what the previous frames left behind. The compositor keeps
//! a persistent canvas, draws each frame over it, captures the result and
//! then applies the frame's disposal instruction before the next one.

use std::io::Cursor;
use std::path::Path;

use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::{Result, VizError};

/// What happens to the canvas after a frame has been shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Disposal {
    /// No instruction; the canvas is left alone and nothing is remembered.
    #[default]
    Unspecified,
    /// Leave the canvas as is and remember it for a later [`Disposal::Previous`].
    Keep,
    /// Clear the canvas to transparent.
    Background,
    /// Go back to the last remembered canvas.
    Previous,
}

impl From<gif::DisposalMethod> for Disposal {
    fn from(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Any => Disposal::Unspecified,
            gif::DisposalMethod::Keep => Disposal::Keep,
            gif::DisposalMethod::Background => Disposal::Background,
            gif::DisposalMethod::Previous => Disposal::Previous,
        }
    }
}

/// A single frame as stored in an animation.
#[derive(Clone, Debug)]
pub struct SourceFrame {
    /// Horizontal offset on the canvas
    pub left: u32,
    /// Vertical offset on the canvas
    pub top: u32,
    /// Frame pixels, usually smaller than the canvas
    pub pixels: RgbaImage,
    /// Display time in hundredths of a second
    pub delay: u16,
    pub disposal: Disposal,
}

/// A decoded image, still or animated.
#[derive(Clone, Debug)]
pub enum SourceImage {
    Still(DynamicImage),
    Animated {
        /// Logical screen width
        width: u32,
        /// Logical screen height
        height: u32,
        frames: Vec<SourceFrame>,
    },
}

impl SourceImage {
    /// Reads and decodes the image at `path`.
    ///
    /// With `animate` set, GIFs are decoded frame by frame. Everything else,
    /// including GIFs when `animate` is off, decodes to the first picture only.
    /// The format is detected from the file content.
    pub fn open<P: AsRef<Path>>(path: P, animate: bool) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, animate)
    }

    /// Decodes an in-memory image. See [`SourceImage::open`].
    pub fn from_bytes(bytes: &[u8], animate: bool) -> Result<Self> {
        let format = image::guess_format(bytes)?;
        log::debug!("detected {:?} image ({} bytes)", format, bytes.len());

        if format == ImageFormat::Gif && animate {
            decode_animation(bytes)
        } else {
            Ok(SourceImage::Still(image::load_from_memory_with_format(
                bytes, format,
            )?))
        }
    }

    /// Intrinsic size; the logical screen size for animations.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SourceImage::Still(image) => (image.width(), image.height()),
            SourceImage::Animated { width, height, .. } => (*width, *height),
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self, SourceImage::Animated { .. })
    }
}

fn decode_animation(bytes: &[u8]) -> Result<SourceImage> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = options.read_info(Cursor::new(bytes))?;

    let width = decoder.width() as u32;
    let height = decoder.height() as u32;
    let mut frames = Vec::new();

    while let Some(frame) = decoder.read_next_frame()? {
        let (w, h) = (frame.width as u32, frame.height as u32);
        let pixels = RgbaImage::from_raw(w, h, frame.buffer.to_vec()).ok_or(
            VizError::InvalidFrame {
                width: w,
                height: h,
                len: frame.buffer.len(),
            },
        )?;

        frames.push(SourceFrame {
            left: frame.left as u32,
            top: frame.top as u32,
            pixels,
            delay: frame.delay,
            disposal: frame.dispose.into(),
        });
    }

    log::debug!(
        "decoded animation {}x{} with {} frames",
        width,
        height,
        frames.len()
    );
    Ok(SourceImage::Animated {
        width,
        height,
        frames,
    })
}

/// A fully composited frame at source resolution.
#[derive(Clone, Debug)]
pub struct CompositedFrame {
    pub raster: RgbaImage,
    /// Display time in milliseconds
    pub delay_ms: u32,
}

/// Persistent drawing surface for animations.
struct Canvas {
    image: RgbaImage,
    previous: Option<RgbaImage>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: blank(width, height),
            previous: None,
        }
    }

    fn draw(&mut self, frame: &SourceFrame) {
        imageops::overlay(
            &mut self.image,
            &frame.pixels,
            frame.left as i64,
            frame.top as i64,
        );
    }

    fn dispose(&mut self, disposal: Disposal) {
        match disposal {
            Disposal::Background => {
                self.image = blank(self.image.width(), self.image.height());
                // background also updates the remembered canvas, as keep does
                self.previous = Some(self.image.clone());
            }
            Disposal::Keep => self.previous = Some(self.image.clone()),
            Disposal::Previous => {
                if let Some(previous) = &self.previous {
                    self.image = previous.clone();
                }
            }
            Disposal::Unspecified => {}
        }
    }
}

fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))
}

/// Turns a decoded image into one composited raster per logical frame.
///
/// Still images yield a single frame with no delay.
pub fn compose(source: SourceImage) -> Vec<CompositedFrame> {
    match source {
        SourceImage::Still(image) => vec![CompositedFrame {
            raster: image.to_rgba8(),
            delay_ms: 0,
        }],
        SourceImage::Animated {
            width,
            height,
            frames,
        } => {
            let mut canvas = Canvas::new(width, height);
            let mut composited = Vec::with_capacity(frames.len());

            for (i, frame) in frames.iter().enumerate() {
                canvas.draw(frame);
                composited.push(CompositedFrame {
                    raster: canvas.image.clone(),
                    delay_ms: frame.delay as u32 * 10,
                });
                log::trace!(
                    "frame {}: {}x{}+{}+{} delay {}cs {:?}",
                    i,
                    frame.pixels.width(),
                    frame.pixels.height(),
                    frame.left,
                    frame.top,
                    frame.delay,
                    frame.disposal
                );
                canvas.dispose(frame.disposal);
            }

            composited
        }
    }
}
