//! `.pfs` text format.
//!
//! ```text
//! <name>
//! <author>
//! <style>
//! <width>:<height>:<baseline>:<ascend>:<descend>:<spacing>:<emSize>:<leftOffset>
//! <codepoint>:<base64 pixels>[:<width>:<height>:<baseline>:<leftOffset>]
//! ...
//! ```
//!
//! Pixels are packed row-major, eight per byte, most significant bit first.
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use tracing::debug;

use crate::{
    error::{FontError, Result},
    font::FontData,
    glyph::{Glyph, MAX_SIDE},
};

const PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

// Number of metric fields before and after the left offset was introduced.
const LEGACY_METRIC_FIELDS: usize = 7;
const METRIC_FIELDS: usize = 8;

fn escape(value: &str) -> String {
    value.replace('\n', "\\n")
}

fn unescape(value: &str) -> String {
    value.replace("\\n", "\n")
}

/// Pack pixels into `ceil(len / 8)` bytes; bit `7 - o` of byte `n / 8`
/// holds pixel `n + o`.
pub fn pack_pixels(pixels: &[bool]) -> Vec<u8> {
    pixels
        .chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .filter(|&(_, &p)| p)
                .fold(0u8, |byte, (o, _)| byte | (1u8 << (7 - o)))
        })
        .collect()
}

/// Inverse of [`pack_pixels`]. Missing bytes read as unset pixels.
pub fn unpack_pixels(bytes: &[u8], count: usize) -> Vec<bool> {
    (0..count)
        .map(|n| {
            bytes
                .get(n / 8)
                .is_some_and(|byte| *byte & (1u8 << (7 - n % 8)) != 0)
        })
        .collect()
}

/// Write `font` in the `.pfs` text format.
///
/// Glyphs without a single set pixel are left out. The metric suffix is
/// only written when a glyph's size or resolved metrics differ from the
/// font defaults.
pub fn serialize(font: &FontData) -> String {
    let mut out = String::new();
    out.push_str(&escape(&font.name));
    out.push('\n');
    out.push_str(&escape(&font.author));
    out.push('\n');
    out.push_str(&escape(&font.style));
    out.push('\n');
    out.push_str(&format!(
        "{}:{}:{}:{}:{}:{}:{}:{}",
        font.width,
        font.height,
        font.baseline,
        font.ascend,
        font.descend,
        font.spacing,
        font.em_size,
        font.left_offset
    ));

    let mut skipped = 0usize;
    for (id, glyph) in &font.glyphs {
        if !glyph.has_pixels() {
            skipped += 1;
            continue;
        }
        out.push_str(&format!("\n{id}:{}", PAYLOAD.encode(pack_pixels(glyph.pixels()))));

        let baseline = font.resolved_baseline(glyph);
        let left_offset = font.resolved_left_offset(glyph);
        if glyph.width() != font.width
            || glyph.height() != font.height
            || baseline != font.baseline
            || left_offset != font.left_offset
        {
            out.push_str(&format!(
                ":{}:{}:{}:{}",
                glyph.width(),
                glyph.height(),
                baseline,
                left_offset
            ));
        }
    }

    debug!(
        glyphs = font.glyphs.len() - skipped,
        skipped, "serialized font"
    );
    out
}

/// Parse the `.pfs` text format. Any error aborts the whole font.
pub fn deserialize(text: &str) -> Result<FontData> {
    let mut lines = text.split('\n');

    let mut header = |what: &str| {
        lines
            .next()
            .map(unescape)
            .ok_or_else(|| FontError::MalformedHeader(format!("missing {what} line")))
    };
    let name = header("name")?;
    let author = header("author")?;
    let style = header("style")?;
    let metrics = lines
        .next()
        .ok_or_else(|| FontError::MalformedHeader("missing metrics line".into()))?;

    let mut font = parse_metrics(metrics)?;
    font.name = name;
    font.author = author;
    font.style = style;

    // Header occupies lines 1..=4. Glyph lines are trimmed, which also drops
    // a CRLF terminator.
    for (idx, raw) in lines.enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (id, glyph) = parse_glyph_line(&font, line, idx + 5)?;
        font.set_glyph(id, glyph);
    }

    debug!(glyphs = font.glyphs.len(), name = %font.name, "deserialized font");
    Ok(font)
}

fn parse_metrics(line: &str) -> Result<FontData> {
    let fields: Vec<&str> = line.split(':').map(str::trim).collect();
    if fields.len() != METRIC_FIELDS && fields.len() != LEGACY_METRIC_FIELDS {
        return Err(FontError::MalformedHeader(format!(
            "expected {METRIC_FIELDS} metric fields, found {}",
            fields.len()
        )));
    }

    fn number<T: std::str::FromStr>(field: &str, what: &str) -> Result<T> {
        field
            .parse()
            .map_err(|_| FontError::MalformedHeader(format!("invalid {what}: {field:?}")))
    }

    let width = number(fields[0], "width")?;
    let height = number(fields[1], "height")?;
    canvas_size(width, height).map_err(FontError::MalformedHeader)?;

    Ok(FontData {
        width,
        height,
        baseline: number(fields[2], "baseline")?,
        ascend: number(fields[3], "ascend")?,
        descend: number(fields[4], "descend")?,
        spacing: number(fields[5], "spacing")?,
        em_size: number(fields[6], "em size")?,
        left_offset: match fields.get(7) {
            Some(field) => number(field, "left offset")?,
            None => 0,
        },
        ..FontData::default()
    })
}

/// Pixel count of a `width` x `height` canvas, refusing sides above
/// [`MAX_SIDE`].
fn canvas_size(width: usize, height: usize) -> std::result::Result<usize, String> {
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(format!(
            "canvas {width}x{height} exceeds {MAX_SIDE} pixels per side"
        ));
    }
    width
        .checked_mul(height)
        .ok_or_else(|| format!("canvas {width}x{height} is too large"))
}

fn parse_glyph_line(font: &FontData, line: &str, line_no: usize) -> Result<(u32, Glyph)> {
    let invalid = |reason: String| FontError::InvalidGlyphLine {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(':').collect();
    if !matches!(fields.len(), 2 | 4 | 5 | 6) {
        return Err(invalid(format!("unexpected field count {}", fields.len())));
    }

    fn field<T: std::str::FromStr>(
        fields: &[&str],
        idx: usize,
        what: &str,
    ) -> std::result::Result<Option<T>, String> {
        fields
            .get(idx)
            .map(|f| f.trim().parse().map_err(|_| format!("invalid {what}: {f:?}")))
            .transpose()
    }

    let id: u32 = field(&fields, 0, "codepoint")
        .map_err(invalid)?
        .ok_or_else(|| invalid("missing codepoint".into()))?;
    let bytes = PAYLOAD
        .decode(fields[1].trim())
        .map_err(|e| invalid(format!("bad base64 payload: {e}")))?;

    // Size and baseline travel together; a 4-field line carries no overrides.
    let (width, height, baseline) = if fields.len() >= 5 {
        (
            field(&fields, 2, "width").map_err(invalid)?.unwrap_or(font.width),
            field(&fields, 3, "height").map_err(invalid)?.unwrap_or(font.height),
            field::<i32>(&fields, 4, "baseline").map_err(invalid)?,
        )
    } else {
        (font.width, font.height, None)
    };
    let left_offset: Option<i32> = field(&fields, 5, "left offset").map_err(invalid)?;
    let count = canvas_size(width, height).map_err(invalid)?;

    let mut glyph = Glyph::from_pixels_lossy(width, height, unpack_pixels(&bytes, count));
    glyph.baseline = baseline.filter(|&b| b != font.baseline);
    glyph.left_offset = left_offset.filter(|&l| l != font.left_offset);
    Ok((id, glyph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn font_with(id: u32, glyph: Glyph) -> FontData {
        let mut font = FontData::default();
        font.set_glyph(id, glyph);
        font
    }

    #[test]
    fn packs_msb_first() {
        let mut pixels = vec![false; 10];
        pixels[0] = true;
        pixels[1] = true;
        pixels[9] = true;
        assert_eq!(pack_pixels(&pixels), vec![0b1100_0000, 0b0100_0000]);
    }

    #[test]
    fn three_by_three_checkerboard_packs_to_two_bytes() {
        let t = true;
        let f = false;
        let packed = pack_pixels(&[t, f, t, f, t, f, t, f, t]);
        assert_eq!(packed.len(), 2);
        assert_eq!(packed[0], 0b1010_1010);
        assert_eq!(packed[1] & 0b0111_1111, 0);
    }

    #[test]
    fn unpack_pads_missing_bytes() {
        assert_eq!(
            unpack_pixels(&[0b1100_0000], 10),
            vec![true, true, false, false, false, false, false, false, false, false]
        );
    }

    #[test]
    fn header_escapes_newlines() {
        let mut font = FontData::default();
        font.name = "Two\nLines".into();
        let text = serialize(&font);
        assert!(text.starts_with("Two\\nLines\n"));
        assert_eq!(deserialize(&text).unwrap().name, "Two\nLines");
    }

    #[test]
    fn default_sized_glyph_has_no_suffix() {
        let mut glyph = Glyph::new(8, 10);
        glyph.set(0, 0, true);
        let text = serialize(&font_with(65, glyph));
        let last = text.lines().last().unwrap();
        assert_eq!(last.split(':').count(), 2);
        assert!(last.starts_with("65:"));
    }

    #[test]
    fn explicit_baseline_equal_to_default_writes_no_suffix() {
        let mut glyph = Glyph::new(8, 10);
        glyph.set(0, 0, true);
        glyph.baseline = Some(8);
        let text = serialize(&font_with(65, glyph));
        assert_eq!(text.lines().last().unwrap().split(':').count(), 2);
    }

    #[test]
    fn overridden_glyph_writes_full_suffix() {
        let mut glyph = Glyph::new(3, 2);
        glyph.set(2, 1, true);
        glyph.left_offset = Some(-1);
        let text = serialize(&font_with(120, glyph));
        assert!(text.ends_with(":3:2:8:-1"), "{text}");
    }

    #[test]
    fn empty_glyphs_are_omitted() {
        let text = serialize(&font_with(65, Glyph::new(8, 10)));
        assert_eq!(text.lines().count(), 4);
        assert!(deserialize(&text).unwrap().glyphs.is_empty());
    }

    #[test]
    fn legacy_metrics_line_defaults_left_offset() {
        let font = deserialize("n\na\ns\n8:10:8:7:-1:1:8").unwrap();
        assert_eq!(font.left_offset, 0);
        assert_eq!(font.descend, -1);
    }

    #[test]
    fn short_metrics_line_is_fatal() {
        let err = deserialize("n\na\ns\n8:10:8").unwrap_err();
        assert!(matches!(err, FontError::MalformedHeader(_)));
    }

    #[test]
    fn non_numeric_metrics_are_fatal() {
        let err = deserialize("n\na\ns\n8:ten:8:7:0:1:8:0").unwrap_err();
        assert!(matches!(err, FontError::MalformedHeader(_)));
    }

    #[test]
    fn missing_lines_are_fatal() {
        assert!(matches!(
            deserialize("").unwrap_err(),
            FontError::MalformedHeader(_)
        ));
        assert!(matches!(
            deserialize("n\na\ns").unwrap_err(),
            FontError::MalformedHeader(_)
        ));
    }

    #[test]
    fn glyph_line_errors_report_line_number() {
        let err = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\n\n65:gA==:1").unwrap_err();
        match err {
            FontError::InvalidGlyphLine { line, .. } => assert_eq!(line, 6),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_base64_is_fatal() {
        let err = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==\n66:*&^").unwrap_err();
        assert!(matches!(err, FontError::InvalidGlyphLine { line: 6, .. }));
    }

    #[test]
    fn non_numeric_id_is_fatal() {
        let err = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\nA:gA==").unwrap_err();
        assert!(matches!(err, FontError::InvalidGlyphLine { .. }));
    }

    #[test]
    fn five_field_line_keeps_font_left_offset() {
        let font = deserialize("n\na\ns\n8:10:8:7:0:1:8:2\n65:wA==:2:1:1").unwrap();
        let glyph = font.glyph(65).unwrap();
        assert_eq!((glyph.width(), glyph.height()), (2, 1));
        assert_eq!(glyph.pixels(), &[true, true]);
        assert_eq!(glyph.baseline, Some(1));
        assert_eq!(glyph.left_offset, None);
        assert_eq!(font.resolved_left_offset(glyph), 2);
    }

    #[test]
    fn crlf_input_is_accepted() {
        let font = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\r\n65:gA==:2:2:1:0\r\n").unwrap();
        assert_eq!(font.left_offset, 0);
        let glyph = font.glyph(65).unwrap();
        assert!(glyph.get(0, 0));
        assert_eq!(glyph.left_offset, None);
    }

    #[test]
    fn header_lines_are_kept_verbatim() {
        let font = deserialize("name\r\nauthor \n style\n8:10:8:7:0:1:8:0").unwrap();
        assert_eq!(font.name, "name\r");
        assert_eq!(font.author, "author ");
        assert_eq!(font.style, " style");
    }

    #[test]
    fn four_field_line_uses_font_canvas() {
        let font = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==:2:2").unwrap();
        let glyph = font.glyph(65).unwrap();
        assert_eq!((glyph.width(), glyph.height()), (8, 10));
        assert_eq!(glyph.baseline, None);
        assert!(glyph.get(0, 0));
    }

    #[test]
    fn overflowing_glyph_size_is_an_error() {
        let err = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==:4294967296:4294967296:0:0")
            .unwrap_err();
        assert!(matches!(err, FontError::InvalidGlyphLine { line: 5, .. }));
    }

    #[test]
    fn oversized_glyph_is_an_error() {
        let err = deserialize("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==:100000:100000:0:0").unwrap_err();
        assert!(matches!(err, FontError::InvalidGlyphLine { line: 5, .. }));

        let wide = format!("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==:{}:1:0:0", MAX_SIDE + 1);
        assert!(deserialize(&wide).is_err());

        let edge = format!("n\na\ns\n8:10:8:7:0:1:8:0\n65:gA==:{MAX_SIDE}:1:0:0");
        assert_eq!(deserialize(&edge).unwrap().glyph(65).unwrap().width(), MAX_SIDE);
    }

    #[test]
    fn oversized_font_canvas_is_an_error() {
        for metrics in ["100000:100000:8:7:0:1:8:0", "4294967296:4294967296:8:7:0:1:8:0"] {
            let err = deserialize(&format!("n\na\ns\n{metrics}")).unwrap_err();
            assert!(matches!(err, FontError::MalformedHeader(_)), "{metrics}");
        }
    }
}
