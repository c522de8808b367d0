#![cfg(feature = "archive")]

use std::io::{Cursor, Write};

use pixfont::{FontData, FontError};
use zip::{write::SimpleFileOptions, ZipWriter};

fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(content.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive").into_inner()
}

#[test]
fn loads_first_pfs_entry_from_zip() {
    let bytes = zip_with(&[
        ("README.txt", "not a font"),
        ("fonts/sample.pfs", include_str!("data/sample.pfs")),
        ("fonts/legacy.pfs", include_str!("data/legacy.pfs")),
    ]);
    let font = FontData::load(&bytes).expect("load archive");
    assert_eq!(font.name, "Sample");
    assert_eq!(font.glyph_count(), 3);
}

#[test]
fn zip_without_font_is_an_archive_error() {
    let bytes = zip_with(&[("README.txt", "nothing here")]);
    let err = FontData::load(&bytes).unwrap_err();
    assert!(matches!(err, FontError::Archive(_)));
}

#[test]
fn broken_font_inside_zip_is_a_parse_error() {
    let bytes = zip_with(&[("bad.pfs", "only\ntwo")]);
    let err = FontData::read(Cursor::new(bytes)).unwrap_err();
    assert!(matches!(err, FontError::MalformedHeader(_)));
}
