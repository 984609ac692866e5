//! Fixed color palettes for terminal output.

use image::{Rgb, Rgba};

/// Maps an arbitrary color to an index of a fixed palette.
///
/// Any `Fn(Rgba<u8>) -> u8` is a palette, which keeps test palettes short.
pub trait Palette {
    fn nearest_index(&self, color: Rgba<u8>) -> u8;
}

impl<F> Palette for F
where
    F: Fn(Rgba<u8>) -> u8,
{
    fn nearest_index(&self, color: Rgba<u8>) -> u8 {
        self(color)
    }
}

/// The xterm 256-color palette addressed by `ESC[48;5;<n>m`.
///
/// Indices 0-15 are the system colors, 16-231 a 6x6x6 color cube and
/// 232-255 a gray ramp.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xterm256;

const SYSTEM_COLORS: [[u8; 3]; 16] = [
    [0, 0, 0],
    [128, 0, 0],
    [0, 128, 0],
    [128, 128, 0],
    [0, 0, 128],
    [128, 0, 128],
    [0, 128, 128],
    [192, 192, 192],
    [128, 128, 128],
    [255, 0, 0],
    [0, 255, 0],
    [255, 255, 0],
    [0, 0, 255],
    [255, 0, 255],
    [0, 255, 255],
    [255, 255, 255],
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const fn build_xterm_colors() -> [[u8; 3]; 256] {
    let mut colors = [[0u8; 3]; 256];
    let mut i = 0;
    while i < 16 {
        colors[i] = SYSTEM_COLORS[i];
        i += 1;
    }
    while i < 232 {
        let n = i - 16;
        colors[i] = [CUBE_LEVELS[n / 36], CUBE_LEVELS[(n / 6) % 6], CUBE_LEVELS[n % 6]];
        i += 1;
    }
    while i < 256 {
        let level = (8 + (i - 232) * 10) as u8;
        colors[i] = [level, level, level];
        i += 1;
    }
    colors
}

static XTERM_COLORS: [[u8; 3]; 256] = build_xterm_colors();

impl Xterm256 {
    /// The color at `index`.
    pub fn color(&self, index: u8) -> Rgb<u8> {
        Rgb(XTERM_COLORS[index as usize])
    }
}

impl Palette for Xterm256 {
    /// Nearest entry by squared RGB distance; ties go to the lowest index.
    /// Transparency darkens the color, so fully transparent pixels come out
    /// black.
    fn nearest_index(&self, color: Rgba<u8>) -> u8 {
        let [r, g, b, a] = color.0;
        let premultiply = |c: u8| (c as u32 * a as u32 / 255) as i32;
        let (r, g, b) = (premultiply(r), premultiply(g), premultiply(b));

        let mut best = 0;
        let mut best_distance = i32::MAX;
        for (i, entry) in XTERM_COLORS.iter().enumerate() {
            let dr = r - entry[0] as i32;
            let dg = g - entry[1] as i32;
            let db = b - entry[2] as i32;
            let distance = dr * dr + dg * dg + db * db;
            if distance < best_distance {
                best = i;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_layout() {
        let p = Xterm256;
        assert_eq!(p.color(9), Rgb([255, 0, 0]));
        assert_eq!(p.color(16), Rgb([0, 0, 0]));
        assert_eq!(p.color(52), Rgb([95, 0, 0]));
        assert_eq!(p.color(231), Rgb([255, 255, 255]));
        assert_eq!(p.color(232), Rgb([8, 8, 8]));
        assert_eq!(p.color(255), Rgb([238, 238, 238]));
    }

    #[test]
    fn test_exact_colors_map_to_themselves() {
        let p = Xterm256;
        for i in 0..=255u8 {
            let Rgb([r, g, b]) = p.color(i);
            let found = p.nearest_index(Rgba([r, g, b, 255]));
            assert_eq!(p.color(found), p.color(i), "index {}", i);
            assert!(found <= i);
        }
        assert_eq!(p.nearest_index(Rgba([95, 0, 0, 255])), 52);
        assert_eq!(p.nearest_index(Rgba([255, 0, 0, 255])), 9);
    }

    #[test]
    fn test_nearest_color() {
        let p = Xterm256;
        assert_eq!(p.nearest_index(Rgba([250, 5, 3, 255])), 9);
        assert_eq!(p.nearest_index(Rgba([100, 100, 100, 255])), p.nearest_index(Rgba([102, 102, 102, 255])));
        assert_eq!(p.color(p.nearest_index(Rgba([100, 100, 100, 255]))), Rgb([98, 98, 98]));
    }

    #[test]
    fn test_transparent_is_black() {
        assert_eq!(Xterm256.nearest_index(Rgba([255, 255, 255, 0])), 0);
    }

    #[test]
    fn test_closure_palette() {
        let palette = |c: Rgba<u8>| c.0[0];
        assert_eq!(palette.nearest_index(Rgba([42, 0, 0, 255])), 42);
    }
}
