use pixfont::{FontData, Glyph};

const FILLED: char = '█';
const EMPTY: char = '·';

pub struct ConsoleRenderer {
    lines: Vec<String>,
    fg: Option<u8>,
}

impl ConsoleRenderer {
    pub fn new(fg: Option<u8>) -> Self {
        Self {
            lines: Vec::new(),
            fg,
        }
    }

    fn pixel(&self, filled: bool) -> String {
        match (filled, self.fg) {
            (false, _) => EMPTY.to_string(),
            (true, None) => FILLED.to_string(),
            (true, Some(fg)) => format!("\x1B[38;5;{fg}m{FILLED}\x1B[0m"),
        }
    }

    /// Draw the glyph row by row, with a rule where the baseline falls.
    pub fn draw_glyph(&mut self, glyph: &Glyph, baseline: i32) {
        let width = glyph.width();
        for y in 0..glyph.height() as i32 {
            if y == baseline && y > 0 {
                self.lines.push("─".repeat(width));
            }
            let row: String = (0..width as i32)
                .map(|x| self.pixel(glyph.get(x, y)))
                .collect();
            self.lines.push(row);
        }
        if baseline == glyph.height() as i32 {
            self.lines.push("─".repeat(width));
        }
    }

    pub fn into_string(self) -> String {
        self.lines.join("\n")
    }
}

/// Convenience: render one glyph of `font` (blank if not drawn yet).
pub fn render_glyph(font: &FontData, id: u32, fg: Option<u8>) -> String {
    let glyph = font.glyph_or_blank(id);
    let mut renderer = ConsoleRenderer::new(fg);
    renderer.draw_glyph(&glyph, font.resolved_baseline(&glyph));
    renderer.into_string()
}
