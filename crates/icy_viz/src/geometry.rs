//! Output size computation.
//!
//! The resolved geometry is the pixel grid the image gets resized to before
//! quantization. Every pixel becomes one character cell, so the height is
//! halved at the end to keep the picture's proportions on a terminal whose
//! cells are roughly twice as tall as they are wide.

use std::process::{Command, Stdio};

use crate::{Result, VizError};

/// Column budget used for looping animations instead of the terminal width.
///
/// Every frame is redrawn in full, so keeping animations narrow keeps the
/// redraw fast enough to follow the frame timing.
pub const ANIMATION_COLUMNS: u32 = 40;

/// Source of the current terminal viewport size.
pub trait TerminalSize {
    /// Number of text rows.
    fn rows(&self) -> Result<u32>;

    /// Number of text columns.
    fn columns(&self) -> Result<u32>;
}

/// Queries the terminal size by running `tput lines` and `tput cols`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tput;

impl Tput {
    fn query(&self, query: &'static str) -> Result<u32> {
        // tput needs the controlling terminal, so only stdout is captured
        let output = Command::new("tput")
            .arg(query)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| VizError::TerminalSize {
                query,
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(VizError::TerminalSize {
                query,
                reason: format!("tput {}", output.status),
            });
        }

        parse_tput_output(query, &String::from_utf8_lossy(&output.stdout))
    }
}

impl TerminalSize for Tput {
    fn rows(&self) -> Result<u32> {
        self.query("lines")
    }

    fn columns(&self) -> Result<u32> {
        self.query("cols")
    }
}

/// Parses the output of a `tput` query. Anything but a single line holding
/// an integer is rejected.
fn parse_tput_output(query: &'static str, stdout: &str) -> Result<u32> {
    let lines: Vec<&str> = stdout.lines().collect();
    if lines.len() != 1 {
        return Err(VizError::TerminalSize {
            query,
            reason: format!("unexpected output {:?}", stdout),
        });
    }

    lines[0]
        .trim()
        .parse::<u32>()
        .map_err(|e| VizError::TerminalSize {
            query,
            reason: format!("couldn't parse {:?}: {}", lines[0], e),
        })
}

/// A terminal of known size.
///
/// Useful when the size is already known (or irrelevant because a fixed
/// output width is used) and in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedSize {
    pub rows: u32,
    pub columns: u32,
}

impl TerminalSize for FixedSize {
    fn rows(&self) -> Result<u32> {
        Ok(self.rows)
    }

    fn columns(&self) -> Result<u32> {
        Ok(self.columns)
    }
}

/// Resolved output size in pixels (one pixel per character cell).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

/// Exact scale factor `num / den`.
#[derive(Clone, Copy, Debug)]
struct Scale {
    num: u64,
    den: u64,
}

impl Scale {
    const ONE: Scale = Scale { num: 1, den: 1 };

    fn new(num: u32, den: u32) -> Self {
        Self {
            num: num as u64,
            den: den as u64,
        }
    }

    /// `floor(self * n)`, saturating at `u32::MAX`
    fn apply(self, n: u32) -> u32 {
        u32::try_from(n as u64 * self.num / self.den).unwrap_or(u32::MAX)
    }

    fn min(self, other: Scale) -> Scale {
        if self.num * other.den <= other.num * self.den {
            self
        } else {
            other
        }
    }
}

/// Computes the output size for an image of `width`x`height` pixels.
///
/// A non-zero `user_width` fixes the output width and the terminal is never
/// queried. Otherwise the image is scaled down (or up) just enough to fit
/// the viewport; one row is kept free for the shell prompt that follows the
/// image. Looping animations use [`ANIMATION_COLUMNS`] instead of the
/// terminal width.
///
/// # Errors
/// Fails if the terminal size is needed and can't be determined.
pub fn resolve<T: TerminalSize + ?Sized>(
    width: u32,
    height: u32,
    user_width: u32,
    looping_animation: bool,
    terminal: &T,
) -> Result<Geometry> {
    if width == 0 || height == 0 {
        return Ok(Geometry::default());
    }

    let scale = if user_width > 0 {
        Scale::new(user_width, width)
    } else {
        let columns = if looping_animation {
            ANIMATION_COLUMNS
        } else {
            terminal.columns()?
        };
        let rows = terminal.rows()?;
        let max_height = rows.saturating_mul(2).saturating_sub(1);
        log::debug!("terminal viewport {}x{} (usable height {})", columns, rows, max_height);

        if columns < width || max_height < height {
            Scale::new(columns, width).min(Scale::new(max_height, height))
        } else {
            Scale::ONE
        }
    };

    let geometry = Geometry {
        width: scale.apply(width),
        height: scale.apply(height) / 2,
    };
    log::debug!(
        "resolved geometry {}x{} -> {}x{}",
        width,
        height,
        geometry.width,
        geometry.height
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Counts queries and fails on demand.
    #[derive(Default)]
    struct CountingTerminal {
        rows: u32,
        columns: u32,
        fail: bool,
        row_queries: Cell<u32>,
        column_queries: Cell<u32>,
    }

    impl TerminalSize for CountingTerminal {
        fn rows(&self) -> Result<u32> {
            self.row_queries.set(self.row_queries.get() + 1);
            if self.fail {
                return Err(VizError::TerminalSize {
                    query: "lines",
                    reason: "no terminal".into(),
                });
            }
            Ok(self.rows)
        }

        fn columns(&self) -> Result<u32> {
            self.column_queries.set(self.column_queries.get() + 1);
            Ok(self.columns)
        }
    }

    fn terminal(columns: u32, rows: u32) -> FixedSize {
        FixedSize { rows, columns }
    }

    #[test]
    fn test_fits_without_scaling() {
        let g = resolve(80, 40, 0, false, &terminal(100, 30)).unwrap();
        assert_eq!(g, Geometry { width: 80, height: 20 });

        // 2*21-1 = 41 rows of pixels available
        let g = resolve(80, 41, 0, false, &terminal(80, 21)).unwrap();
        assert_eq!(g, Geometry { width: 80, height: 20 });
    }

    #[test]
    fn test_too_wide_scales_to_columns() {
        let g = resolve(200, 100, 0, false, &terminal(100, 100)).unwrap();
        assert_eq!(g, Geometry { width: 100, height: 25 });
    }

    #[test]
    fn test_too_tall_scales_to_rows() {
        // usable height 2*25-1 = 49, scale 49/98 = 1/2
        let g = resolve(60, 98, 0, false, &terminal(200, 25)).unwrap();
        assert_eq!(g, Geometry { width: 30, height: 24 });
    }

    #[test]
    fn test_user_width_ignores_terminal() {
        let term = CountingTerminal {
            fail: true,
            ..Default::default()
        };
        let g = resolve(49, 30, 1, false, &term).unwrap();
        assert_eq!(g.width, 1);
        assert_eq!(g.height, 0);
        assert_eq!(term.row_queries.get(), 0);
        assert_eq!(term.column_queries.get(), 0);

        let g = resolve(300, 200, 150, false, &term).unwrap();
        assert_eq!(g, Geometry { width: 150, height: 50 });

        // upscaling: floor(7 * 5 / 3) = 11, halved = 5
        let g = resolve(3, 5, 7, false, &term).unwrap();
        assert_eq!(g, Geometry { width: 7, height: 5 });
    }

    #[test]
    fn test_huge_user_width_saturates() {
        let term = CountingTerminal {
            fail: true,
            ..Default::default()
        };
        // 100_000 * 100_000 doesn't fit in u32
        let g = resolve(1, 100_000, 100_000, false, &term).unwrap();
        assert_eq!(g, Geometry { width: 100_000, height: u32::MAX / 2 });
    }

    #[test]
    fn test_looping_animation_skips_column_query() {
        let term = CountingTerminal {
            rows: 100,
            columns: 500,
            ..Default::default()
        };
        let g = resolve(80, 40, 0, true, &term).unwrap();
        assert_eq!(g, Geometry { width: 40, height: 10 });
        assert_eq!(term.column_queries.get(), 0);
        assert_eq!(term.row_queries.get(), 1);
    }

    #[test]
    fn test_terminal_failure_is_fatal() {
        let term = CountingTerminal {
            fail: true,
            ..Default::default()
        };
        let err = resolve(10, 10, 0, false, &term).unwrap_err();
        assert!(err.to_string().contains("lines"));
    }

    #[test]
    fn test_zero_rows_gives_empty_geometry() {
        let g = resolve(10, 10, 0, false, &terminal(80, 0)).unwrap();
        assert_eq!(g, Geometry { width: 0, height: 0 });
    }

    #[test]
    fn test_parse_tput_output() {
        assert_eq!(parse_tput_output("cols", "120\n").unwrap(), 120);
        assert!(parse_tput_output("cols", "").is_err());
        assert!(parse_tput_output("cols", "80\n24\n").is_err());

        let err = parse_tput_output("lines", "abc\n").unwrap_err();
        assert!(err.to_string().starts_with("couldn't determine lines"));
    }
}
