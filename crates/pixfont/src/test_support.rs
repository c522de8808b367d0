//! Test support utilities for pixfont.
//!
//! This module provides helper types and functions that are useful for testing
//! glyph tracing and outline output, but are not part of the core API.

use crate::{FontError, FontInfo, FontWriter, Glyph, OutlineGlyph};

/// Build a glyph from ASCII rows: `#` is a filled pixel, anything else is
/// empty. All rows must have the same length.
pub fn glyph_from_rows(rows: &[&str]) -> Glyph {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.chars().count());
    let pixels: Vec<bool> = rows
        .iter()
        .flat_map(|row| row.chars().map(|c| c == '#'))
        .collect();
    Glyph::with_pixels(width, height, pixels)
}

/// A font writer that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingWriter {
    pub info: Option<FontInfo>,
    pub glyphs: Vec<OutlineGlyph>,
    pub finished: bool,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FontWriter for RecordingWriter {
    type Error = FontError;

    fn begin_font(&mut self, info: &FontInfo) -> std::result::Result<(), Self::Error> {
        self.info = Some(info.clone());
        Ok(())
    }

    fn add_glyph(&mut self, glyph: &OutlineGlyph) -> std::result::Result<(), Self::Error> {
        self.glyphs.push(glyph.clone());
        Ok(())
    }

    fn finish(&mut self) -> std::result::Result<(), Self::Error> {
        self.finished = true;
        Ok(())
    }
}
