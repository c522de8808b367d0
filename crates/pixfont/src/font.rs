use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec,
    error::{FontError, Result},
    glyph::{Corner, Glyph},
};

/// A pixel font: global metrics plus the glyphs drawn so far.
///
/// Codepoints missing from `glyphs` are blank glyphs inheriting the
/// font-level canvas size and metrics.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FontData {
    pub width: usize,
    pub height: usize,
    pub baseline: i32,
    pub ascend: i32,
    pub descend: i32,
    /// Horizontal gap added after each glyph's advance.
    pub spacing: i32,
    /// Pixels per em.
    pub em_size: i32,
    pub left_offset: i32,
    pub name: String,
    pub author: String,
    pub style: String,
    pub glyphs: IndexMap<u32, Glyph>,
}

impl Default for FontData {
    fn default() -> Self {
        Self {
            width: 8,
            height: 10,
            baseline: 8,
            ascend: 7,
            descend: 0,
            spacing: 1,
            em_size: 8,
            left_offset: 0,
            name: "My Amazing Font".into(),
            author: "Anonymous".into(),
            style: "Medium".into(),
            glyphs: IndexMap::new(),
        }
    }
}

impl FontData {
    pub fn glyph(&self, id: u32) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// The stored glyph, or a blank one sized to the font canvas.
    pub fn glyph_or_blank(&self, id: u32) -> Glyph {
        self.glyphs
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Glyph::new(self.width, self.height))
    }

    /// Insert or replace a glyph. A replaced glyph keeps its position.
    pub fn set_glyph(&mut self, id: u32, glyph: Glyph) {
        self.glyphs.insert(id, glyph);
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn resolved_baseline(&self, glyph: &Glyph) -> i32 {
        glyph.baseline_or(self.baseline)
    }

    pub fn resolved_left_offset(&self, glyph: &Glyph) -> i32 {
        glyph.left_offset_or(self.left_offset)
    }

    /// Resize glyph `id` (or a blank one) so the drawing stays put relative
    /// to its resolved metrics.
    pub fn resize_glyph(&mut self, id: u32, width: usize, height: usize, corner: Corner) {
        let mut glyph = self.glyph_or_blank(id);
        glyph.baseline = Some(self.resolved_baseline(&glyph));
        glyph.left_offset = Some(self.resolved_left_offset(&glyph));
        let mut resized = glyph.resize(width, height, corner);
        if resized.baseline == Some(self.baseline) {
            resized.baseline = None;
        }
        if resized.left_offset == Some(self.left_offset) {
            resized.left_offset = None;
        }
        self.set_glyph(id, resized);
    }

    /// Load a font from raw bytes: plain `.pfs` text, or a zip archive
    /// holding one.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        if bytes.len() >= 4 && &bytes[0..4] == b"PK\x03\x04" {
            return Self::load_archive(bytes);
        }
        let text =
            std::str::from_utf8(bytes).map_err(|e| FontError::Encoding(format!("utf8 error: {e}")))?;
        codec::deserialize(text)
    }

    #[cfg(feature = "archive")]
    fn load_archive(bytes: &[u8]) -> Result<Self> {
        use std::io::Cursor;
        use zip::ZipArchive;

        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| FontError::Archive(format!("zip open error: {e}")))?;
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| FontError::Archive(format!("zip entry error: {e}")))?;
            if file.name().ends_with(".pfs") {
                tracing::debug!(entry = file.name(), "loading font from archive");
                let mut buf = String::new();
                file.read_to_string(&mut buf)
                    .map_err(|e| FontError::Archive(format!("zip read error: {e}")))?;
                return codec::deserialize(&buf);
            }
        }
        Err(FontError::Archive("zip archive contained no .pfs".into()))
    }

    #[cfg(not(feature = "archive"))]
    fn load_archive(_bytes: &[u8]) -> Result<Self> {
        Err(FontError::Archive(
            "zip archives need the `archive` feature".into(),
        ))
    }

    pub fn read<R: Read>(reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        let mut reader = reader;
        reader.read_to_end(&mut buf)?;
        Self::load(&buf)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    pub fn to_pfs(&self) -> String {
        codec::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_font() {
        let font = FontData::default();
        assert_eq!((font.width, font.height), (8, 10));
        assert_eq!(font.baseline, 8);
        assert_eq!(font.ascend, 7);
        assert_eq!(font.descend, 0);
        assert_eq!(font.spacing, 1);
        assert_eq!(font.em_size, 8);
        assert_eq!(font.left_offset, 0);
        assert!(font.glyphs.is_empty());
    }

    #[test]
    fn blank_glyph_uses_font_canvas() {
        let font = FontData::default();
        let g = font.glyph_or_blank(65);
        assert_eq!((g.width(), g.height()), (8, 10));
        assert!(!g.has_pixels());
        assert!(font.glyph(65).is_none());
    }

    #[test]
    fn replacing_glyph_keeps_order() {
        let mut font = FontData::default();
        font.set_glyph(66, Glyph::new(1, 1));
        font.set_glyph(65, Glyph::new(1, 1));
        font.set_glyph(66, Glyph::new(2, 2));
        let ids: Vec<u32> = font.glyphs.keys().copied().collect();
        assert_eq!(ids, vec![66, 65]);
        assert_eq!(font.glyph(66).map(Glyph::width), Some(2));
    }

    #[test]
    fn resize_glyph_materializes_shifted_metrics() {
        let mut font = FontData::default();
        font.resize_glyph(65, 8, 12, Corner::TopRight);
        let g = font.glyph(65).unwrap();
        assert_eq!(g.height(), 12);
        assert_eq!(g.baseline, Some(10));
        assert_eq!(g.left_offset, None);
    }

    #[test]
    fn non_utf8_is_an_encoding_error() {
        let err = FontData::load(&[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, FontError::Encoding(_)));
    }
}
