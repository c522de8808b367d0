//! Vector outline generation from traced glyph bitmaps.
//!
//! Grid coordinates are scaled by the pixel size and shifted so that the
//! glyph's left offset lands on x = 0 and its baseline on y = 0, with y
//! pointing up. Font binary encoding is left to a [`FontWriter`].
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    font::FontData,
    glyph::Glyph,
    trace::{trace_glyph, Point},
    unicode::UnicodeNames,
};

/// Design units per pixel.
pub const PIXEL_SIZE: i32 = 128;

const SPACE: u32 = 32;
const NOTDEF: &str = ".notdef";

#[derive(Clone, Debug)]
pub struct OutlineOptions {
    pub pixel_size: i32,
    /// Style name written when the font has none.
    pub fallback_style: String,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            pixel_size: PIXEL_SIZE,
            fallback_style: "Medium".into(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathCommand {
    MoveTo(i32, i32),
    LineTo(i32, i32),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlyphBox {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlineGlyph {
    pub name: Option<String>,
    pub unicode: u32,
    pub advance_width: i32,
    pub left_side_bearing: i32,
    pub bounds: GlyphBox,
    pub path: Vec<PathCommand>,
}

impl OutlineGlyph {
    fn blank(name: Option<String>, unicode: u32, advance_width: i32) -> Self {
        Self {
            name,
            unicode,
            advance_width,
            left_side_bearing: 0,
            bounds: GlyphBox::default(),
            path: Vec::new(),
        }
    }

    pub fn contour_count(&self) -> usize {
        self.path
            .iter()
            .filter(|c| matches!(c, PathCommand::MoveTo(..)))
            .count()
    }

    /// The path as SVG path data, in design units.
    pub fn svg_path_data(&self) -> String {
        let mut parts = Vec::with_capacity(self.path.len() + self.contour_count());
        for (i, command) in self.path.iter().enumerate() {
            match command {
                PathCommand::MoveTo(x, y) => {
                    if i > 0 {
                        parts.push("Z".to_string());
                    }
                    parts.push(format!("M{x} {y}"));
                }
                PathCommand::LineTo(x, y) => parts.push(format!("L{x} {y}")),
            }
        }
        if !self.path.is_empty() {
            parts.push("Z".to_string());
        }
        parts.join(" ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FontInfo {
    pub family: String,
    pub style: String,
    pub units_per_em: i32,
    pub ascender: i32,
    pub descender: i32,
}

/// Receives a finished outline font, e.g. to encode font tables.
pub trait FontWriter {
    type Error;
    fn begin_font(&mut self, info: &FontInfo) -> std::result::Result<(), Self::Error>;
    fn add_glyph(&mut self, glyph: &OutlineGlyph) -> std::result::Result<(), Self::Error>;

    fn finish(&mut self) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutlineFont {
    pub info: FontInfo,
    /// `.notdef` first, then glyphs in font order.
    pub glyphs: Vec<OutlineGlyph>,
}

impl OutlineFont {
    pub fn glyph(&self, unicode: u32) -> Option<&OutlineGlyph> {
        self.glyphs
            .iter()
            .find(|g| g.unicode == unicode && g.name.as_deref() != Some(NOTDEF))
    }

    pub fn write_to<W: FontWriter>(&self, writer: &mut W) -> std::result::Result<(), W::Error> {
        writer.begin_font(&self.info)?;
        for glyph in &self.glyphs {
            writer.add_glyph(glyph)?;
        }
        writer.finish()
    }
}

/// Scale a cell count to design units, saturating at the `i32` range.
fn units(pixel_size: i32, cells: i64) -> i32 {
    i64::from(pixel_size)
        .saturating_mul(cells)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn cells(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Append one closed subpath per contour to `path`.
fn push_contours(
    path: &mut Vec<PathCommand>,
    contours: &[Vec<Point>],
    left_offset: i32,
    baseline: i32,
    pixel_size: i32,
) {
    let to_design = |p: Point| {
        (
            units(pixel_size, i64::from(p.x) - i64::from(left_offset)),
            units(pixel_size, i64::from(baseline) - i64::from(p.y)),
        )
    };
    for contour in contours {
        let Some(&first) = contour.first() else {
            continue;
        };
        let (x, y) = to_design(first);
        path.push(PathCommand::MoveTo(x, y));
        for &point in &contour[1..] {
            let (x, y) = to_design(point);
            path.push(PathCommand::LineTo(x, y));
        }
        path.push(PathCommand::LineTo(x, y));
    }
}

/// Build the outline of one glyph.
///
/// Returns `None` for glyphs without filled pixels, except the space which
/// is always kept with an empty path.
pub fn build_glyph(
    font: &FontData,
    id: u32,
    glyph: &Glyph,
    names: &UnicodeNames,
    options: &OutlineOptions,
) -> Option<OutlineGlyph> {
    let p = options.pixel_size;
    let left_offset = font.resolved_left_offset(glyph);
    let baseline = font.resolved_baseline(glyph);
    let advance_width = units(
        p,
        cells(glyph.width()) + i64::from(font.spacing) - i64::from(left_offset),
    );
    let name = names.get(id).map(str::to_string);

    let Some(filled) = glyph.filled_bounds() else {
        return (id == SPACE).then(|| OutlineGlyph::blank(name, id, advance_width));
    };
    let mut path = Vec::new();
    push_contours(&mut path, &trace_glyph(glyph), left_offset, baseline, p);

    let left_offset = i64::from(left_offset);
    let baseline = i64::from(baseline);
    let (min_x, max_x) = (cells(filled.min_x), cells(filled.max_x));
    let (min_y, max_y) = (cells(filled.min_y), cells(filled.max_y));

    Some(OutlineGlyph {
        name,
        unicode: id,
        advance_width,
        left_side_bearing: units(p, (min_x - left_offset).min(0)),
        bounds: GlyphBox {
            x_min: units(p, min_x - left_offset),
            x_max: units(p, max_x - left_offset),
            y_min: units(p, baseline - max_y),
            y_max: units(p, baseline - min_y),
        },
        path,
    })
}

/// Build the complete outline font: `.notdef`, every drawn glyph in font
/// order, and a space (synthesized from font metrics when not drawn).
pub fn build_outline_font(
    font: &FontData,
    names: &UnicodeNames,
    options: &OutlineOptions,
) -> OutlineFont {
    let p = options.pixel_size;
    let mut glyphs = vec![OutlineGlyph::blank(
        Some(NOTDEF.to_string()),
        0,
        units(p, cells(font.width) + i64::from(font.spacing)),
    )];

    glyphs.extend(
        font.glyphs
            .iter()
            .filter_map(|(&id, glyph)| build_glyph(font, id, glyph, names, options)),
    );

    if !font.glyphs.contains_key(&SPACE) {
        glyphs.push(OutlineGlyph::blank(
            names.get(SPACE).map(str::to_string),
            SPACE,
            units(
                p,
                cells(font.width) + i64::from(font.spacing) - i64::from(font.left_offset),
            ),
        ));
    }

    let style = if font.style.is_empty() {
        options.fallback_style.clone()
    } else {
        font.style.clone()
    };

    debug!(
        glyphs = glyphs.len(),
        drawn = font.glyphs.len(),
        "built outline font"
    );

    OutlineFont {
        info: FontInfo {
            family: font.name.clone(),
            style,
            units_per_em: units(p, font.em_size.into()),
            ascender: units(p, font.ascend.into()),
            descender: units(p, font.descend.into()),
        },
        glyphs,
    }
}
