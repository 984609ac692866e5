//! # icy_viz
//!
//! Show still images and animated GIFs in any 256-color terminal.
//!
//! ## Features
//!
//! - **Geometry**: fits the image to the terminal viewport (or a fixed width)
//!   and corrects for character cells being twice as tall as wide
//! - **Compositing**: replays GIF frame disposal onto a persistent canvas
//! - **Quantization**: Lanczos3 resize followed by a nearest-color lookup
//!   into the xterm 256-color palette
//! - **Playback**: redraws frames in place with the animation's own timing,
//!   either live on a terminal or exported as a replayable shell script
//!
//! ## Quick Start
//!
//! ```ignore
//! use icy_viz::{render, RenderOptions, RenderTarget, TerminalSink, Tput, Xterm256};
//!
//! let target = RenderTarget::open("cat.gif", &RenderOptions::default(), &Tput, &Xterm256)?;
//! let mut sink = TerminalSink::new(std::io::stdout().lock());
//! render(&target, &mut sink)?;
//! ```
//!
//! ### Exporting to a script
//!
//! ```ignore
//! use icy_viz::{render, ScriptSink};
//!
//! let mut sink = ScriptSink::new("motd.sh");
//! render(&target, &mut sink)?;
//! ```

use thiserror::Error;

pub mod compositor;
pub mod geometry;
pub mod palette;
pub mod quantizer;
pub mod render;
pub mod sink;
pub mod target;

pub use compositor::{compose, CompositedFrame, Disposal, SourceFrame, SourceImage};
pub use geometry::{resolve, FixedSize, Geometry, TerminalSize, Tput, ANIMATION_COLUMNS};
pub use palette::{Palette, Xterm256};
pub use quantizer::{quantize, render_delay, IndexGrid};
pub use render::render;
pub use sink::{ScriptSink, Sink, TerminalSink};
pub use target::{RenderOptions, RenderTarget, RenderedFrame};

/// Errors that can occur while preparing or rendering an image.
#[derive(Debug, Error)]
pub enum VizError {
    /// Reading the source file failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The still image could not be decoded or its format is unsupported
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// The animated GIF could not be decoded
    #[error(transparent)]
    Gif(#[from] gif::DecodingError),

    /// Terminal geometry could not be determined
    #[error("couldn't determine {query}: {reason}")]
    TerminalSize { query: &'static str, reason: String },

    /// A GIF frame's pixel buffer doesn't match its declared size
    #[error("invalid frame: {width}x{height} with {len} bytes")]
    InvalidFrame { width: u32, height: u32, len: usize },

    /// Writing to the output sink failed
    #[error("output error: {0}")]
    Output(#[source] std::io::Error),
}

/// Result type for icy_viz operations.
pub type Result<T> = core::result::Result<T, VizError>;
