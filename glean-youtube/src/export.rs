//! CSV output.
//!
//! The file starts with a UTF-8 byte order mark so spreadsheet tools detect
//! the encoding, followed by a header row that is written even when there
//! are no records.
use crate::error::ExportError;
use crate::types::TranscriptRecord;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const COLUMNS: [&str; 8] = [
    "video_id",
    "title",
    "url",
    "publish_date",
    "duration",
    "transcript",
    "language",
    "is_generated",
];

#[derive(Serialize)]
struct Row<'a> {
    video_id: &'a str,
    title: &'a str,
    url: &'a str,
    publish_date: &'a str,
    duration: &'a str,
    transcript: &'a str,
    language: &'a str,
    is_generated: bool,
}

impl<'a> From<&'a TranscriptRecord> for Row<'a> {
    fn from(r: &'a TranscriptRecord) -> Self {
        Self {
            video_id: &r.video.id,
            title: &r.video.title,
            url: &r.video.url,
            publish_date: &r.video.publish_date,
            duration: &r.video.duration,
            transcript: &r.text,
            language: &r.language_code,
            is_generated: r.is_generated,
        }
    }
}

/// Write BOM, header, and one row per record to `out`.
pub fn write_csv<W: Write>(mut out: W, records: &[TranscriptRecord]) -> Result<(), ExportError> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.serialize(Row::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write all records to it.
pub fn write_csv_file(path: &Path, records: &[TranscriptRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), records)?;
    info!(
        event = "harvest.export.written",
        path = %path.display(),
        rows = records.len(),
        "wrote transcripts csv"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VideoReference;

    fn record(id: &str, text: &str) -> TranscriptRecord {
        TranscriptRecord {
            video: VideoReference {
                id: id.into(),
                title: "A, \"quoted\" title".into(),
                url: VideoReference::watch_url(id),
                publish_date: "2024-05-01T10:00:00Z".into(),
                duration: "PT4M13S".into(),
            },
            text: text.into(),
            language_code: "ja".into(),
            is_generated: true,
        }
    }

    #[test]
    fn empty_export_has_bom_and_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert!(buf.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&buf[UTF8_BOM.len()..]).unwrap();
        assert_eq!(
            text,
            "video_id,title,url,publish_date,duration,transcript,language,is_generated\n"
        );
    }

    #[test]
    fn rows_are_quoted_and_ordered() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[record("a1", "こんにちは 世界"), record("b2", "")]).unwrap();
        let text = String::from_utf8(buf[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "a1,\"A, \"\"quoted\"\" title\",https://www.youtube.com/watch?v=a1,2024-05-01T10:00:00Z,PT4M13S,こんにちは 世界,ja,true"
        );
        assert!(lines[2].starts_with("b2,"));
        assert!(lines[2].ends_with(",,ja,true"));
    }

    #[test]
    fn file_export_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out/nested/transcripts.csv");
        write_csv_file(&path, &[record("x", "t")]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
    }
}
