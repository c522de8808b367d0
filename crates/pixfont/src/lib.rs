//! pixfont: pixel font toolkit.
//! Features: `.pfs` parsing/writing, bitmap contour tracing, vector outline generation.

pub mod codec;
mod error;
mod font;
mod glyph;
pub mod outline;
pub mod trace;
mod unicode;
pub use codec::{deserialize, serialize};
pub use error::{FontError, Result};
pub use font::FontData;
pub use glyph::{Bounds, Corner, Glyph, MAX_SIDE};
pub use outline::{
    build_glyph, build_outline_font, FontInfo, FontWriter, GlyphBox, OutlineFont, OutlineGlyph,
    OutlineOptions, PathCommand, PIXEL_SIZE,
};
pub use trace::{trace_glyph, Contour, Point};
pub use unicode::UnicodeNames;

// Test utilities
pub mod test_support;
