use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pixfont::{build_outline_font, FontData, OutlineOptions, UnicodeNames};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::console::render_glyph;
mod console;

#[derive(Parser)]
#[command(name = "pixfont", about = "Pixel font toolkit CLI")]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Inspect font metadata
    Inspect {
        #[arg(short, long)]
        font: String,
    },
    /// Print a glyph bitmap
    Preview {
        #[arg(short, long)]
        font: String,
        /// Codepoint: decimal, U+XXXX, 0xXXXX or a single character
        #[arg(short = 'c', long = "char")]
        codepoint: String,
        #[arg(long)]
        fg: Option<u8>,
    },
    /// Print the vector outlines generated for a font
    Outline {
        #[arg(short, long)]
        font: String,
        /// UnicodeData.txt used to name glyphs
        #[arg(long)]
        unicode_data: Option<String>,
        /// Only print this codepoint
        #[arg(short = 'c', long = "char")]
        codepoint: Option<String>,
    },
    /// Rewrite a font in the current .pfs format
    Normalize {
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_codepoint(raw: &str) -> Result<u32> {
    let hex = raw
        .strip_prefix("U+")
        .or_else(|| raw.strip_prefix("u+"))
        .or_else(|| raw.strip_prefix("0x"));
    if let Some(hex) = hex {
        return u32::from_str_radix(hex, 16).with_context(|| format!("invalid codepoint {raw:?}"));
    }
    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw
            .parse()
            .with_context(|| format!("invalid codepoint {raw:?}"));
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c as u32),
        _ => bail!("expected a codepoint or a single character, got {raw:?}"),
    }
}

fn open_font(path: &str) -> Result<FontData> {
    FontData::open(path).with_context(|| format!("failed to load {path}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Cmd::Inspect { font } => {
            let f = open_font(&font)?;
            println!("Pixel font: {} ({})", f.name, f.style);
            println!("  Author: {}", f.author);
            println!(
                "  Canvas: {}x{}, baseline {}, left offset {}",
                f.width, f.height, f.baseline, f.left_offset
            );
            println!(
                "  Ascend {}, descend {}, spacing {}, em size {}",
                f.ascend, f.descend, f.spacing, f.em_size
            );
            println!("  Defined glyphs: {}", f.glyph_count());
        }
        Cmd::Preview {
            font,
            codepoint,
            fg,
        } => {
            let f = open_font(&font)?;
            let id = parse_codepoint(&codepoint)?;
            if f.glyph(id).is_none() {
                eprintln!("U+{id:04X} is not drawn yet");
            }
            println!("{}", render_glyph(&f, id, fg));
        }
        Cmd::Outline {
            font,
            unicode_data,
            codepoint,
        } => {
            let f = open_font(&font)?;
            let names = match unicode_data {
                Some(path) => UnicodeNames::load(&path)
                    .with_context(|| format!("failed to load {path}"))?,
                None => UnicodeNames::empty(),
            };
            let only = codepoint.as_deref().map(parse_codepoint).transpose()?;
            let outline = build_outline_font(&f, &names, &OutlineOptions::default());
            let info = &outline.info;
            println!(
                "Outline font: {} {} (units per em {}, ascender {}, descender {})",
                info.family, info.style, info.units_per_em, info.ascender, info.descender
            );
            for glyph in &outline.glyphs {
                if only.is_some_and(|id| id != glyph.unicode) {
                    continue;
                }
                println!(
                    "U+{:04X} {} advance={} lsb={} contours={} {}",
                    glyph.unicode,
                    glyph.name.as_deref().unwrap_or("-"),
                    glyph.advance_width,
                    glyph.left_side_bearing,
                    glyph.contour_count(),
                    glyph.svg_path_data()
                );
            }
        }
        Cmd::Normalize { input, output } => {
            let f = open_font(&input)?;
            fs::write(&output, f.to_pfs())?;
            info!(glyphs = f.glyph_count(), %output, "normalized font");
            eprintln!("Normalized {input} -> {output}");
        }
    }
    Ok(())
}
