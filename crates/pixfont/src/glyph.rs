use crate::error::{FontError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where rows and columns are added or removed when a glyph is resized.
///
/// The opposite corner stays anchored: resizing with `TopRight` keeps the
/// bottom-left pixel where it was.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Corner {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

impl Corner {
    fn grows_left(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::BottomLeft)
    }

    fn grows_top(self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }
}

/// Largest glyph or font canvas side accepted when reading a font.
pub const MAX_SIDE: usize = 4096;

/// Inclusive cell bounds of the filled pixels of a glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

/// A fixed-size boolean bitmap, row-major.
///
/// `baseline` and `left_offset` are per-glyph overrides; `None` means the
/// glyph inherits the font-level value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Glyph {
    width: usize,
    height: usize,
    pub baseline: Option<i32>,
    pub left_offset: Option<i32>,
    pixels: Vec<bool>,
}

impl Glyph {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            baseline: None,
            left_offset: None,
            pixels: vec![false; width * height],
        }
    }

    /// Build a glyph from an existing pixel buffer.
    ///
    /// # Panics
    ///
    /// Panics if `pixels.len() != width * height`.
    pub fn with_pixels(width: usize, height: usize, pixels: Vec<bool>) -> Self {
        match Self::try_with_pixels(width, height, pixels) {
            Ok(glyph) => glyph,
            Err(e) => panic!("Glyph::with_pixels: {e}"),
        }
    }

    pub fn try_with_pixels(width: usize, height: usize, pixels: Vec<bool>) -> Result<Self> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(FontError::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            baseline: None,
            left_offset: None,
            pixels,
        })
    }

    /// Build a glyph, padding with unset pixels or truncating so the buffer
    /// holds exactly `width * height` entries.
    pub fn from_pixels_lossy(width: usize, height: usize, mut pixels: Vec<bool>) -> Self {
        pixels.resize(width * height, false);
        Self {
            width,
            height,
            baseline: None,
            left_offset: None,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(x + y * self.width)
    }

    /// Out-of-range coordinates read as unset.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.pixels[i])
    }

    /// Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = value;
        }
    }

    pub fn has_pixels(&self) -> bool {
        self.pixels.iter().any(|&p| p)
    }

    pub fn filled_bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.pixels[x + y * self.width] {
                    continue;
                }
                bounds = Some(match bounds {
                    None => Bounds {
                        min_x: x,
                        max_x: x,
                        min_y: y,
                        max_y: y,
                    },
                    Some(b) => Bounds {
                        min_x: b.min_x.min(x),
                        max_x: b.max_x.max(x),
                        min_y: b.min_y.min(y),
                        max_y: b.max_y.max(y),
                    },
                });
            }
        }
        bounds
    }

    pub fn baseline_or(&self, default: i32) -> i32 {
        self.baseline.unwrap_or(default)
    }

    pub fn left_offset_or(&self, default: i32) -> i32 {
        self.left_offset.unwrap_or(default)
    }

    /// Resize the canvas, adding or removing rows and columns at `corner`.
    ///
    /// Explicit metric overrides move with the drawing: growing at the top
    /// shifts the baseline down, growing at the left shifts the left offset
    /// right. Inherited (`None`) metrics are left alone.
    pub fn resize(&self, width: usize, height: usize, corner: Corner) -> Glyph {
        let dx = if corner.grows_left() {
            width as i32 - self.width as i32
        } else {
            0
        };
        let dy = if corner.grows_top() {
            height as i32 - self.height as i32
        } else {
            0
        };

        let mut out = Glyph::new(width, height);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                if self.get(x - dx, y - dy) {
                    out.set(x, y, true);
                }
            }
        }
        out.baseline = self.baseline.map(|b| b + dy);
        out.left_offset = self.left_offset.map(|l| l + dx);
        out
    }
}
