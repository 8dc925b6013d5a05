//! Tabular message files.
//!
//! Both the collector output and the preprocessed table share one layout:
//! `Channel Title, Channel Username, ID, Message, Date, Media Path`, header
//! row first.

pub mod token_list;

use std::fs::{self, File};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

pub use token_list::{format_token_list, parse_token_list};

/// Column headers, in file order.
pub const HEADERS: [&str; 6] = [
    "Channel Title",
    "Channel Username",
    "ID",
    "Message",
    "Date",
    "Media Path",
];

/// One scraped message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    #[serde(rename = "Channel Title")]
    pub channel_title: String,
    /// Grouping key for sampling.
    #[serde(rename = "Channel Username")]
    pub channel_username: String,
    #[serde(rename = "ID")]
    pub message_id: i64,
    /// Raw text, or a token-list literal after preprocessing.
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Media Path")]
    pub media_path: Option<String>,
}

impl MessageRow {
    /// Message text, treating a blank cell as missing.
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Tokens stored in the `Message` cell.
    pub fn tokens(&self) -> Result<Vec<String>, DatasetError> {
        parse_token_list(self.message.as_deref().unwrap_or_default())
    }
}

fn csv_error(path: &Path, source: csv::Error) -> DatasetError {
    DatasetError::Csv {
        path: path.display().to_string(),
        source,
    }
}

/// Read every row of a message table.
///
/// Header names are trimmed before matching. Rows that do not fit the
/// layout are skipped with a warning; I/O failures are returned.
pub fn read_rows(path: &Path) -> Result<Vec<MessageRow>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (index, record) in reader.deserialize::<MessageRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
            Err(e) => {
                skipped += 1;
                tracing::warn!(row = index + 1, "Skipping malformed row: {e}");
            }
        }
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), skipped, "Loaded message table");
    Ok(rows)
}

/// Writes message rows to a CSV file, header first.
pub struct RowWriter {
    path: String,
    writer: csv::Writer<File>,
    written: usize,
}

impl RowWriter {
    /// Create (or truncate) `path`, creating parent directories.
    pub fn create(path: &Path) -> Result<Self, DatasetError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Header is written by hand so an empty table still has one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;
        writer
            .write_record(HEADERS)
            .map_err(|e| csv_error(path, e))?;

        Ok(Self {
            path: path.display().to_string(),
            writer,
            written: 0,
        })
    }

    pub fn write_row(&mut self, row: &MessageRow) -> Result<(), DatasetError> {
        self.writer
            .serialize(row)
            .map_err(|source| DatasetError::Csv {
                path: self.path.clone(),
                source,
            })?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered rows to disk.
    pub fn finish(mut self) -> Result<usize, DatasetError> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(channel: &str, id: i64, message: Option<&str>) -> MessageRow {
        MessageRow {
            channel_title: format!("{channel} title"),
            channel_username: channel.to_string(),
            message_id: id,
            message: message.map(String::from),
            date: "2024-05-01T10:00:00+00:00".into(),
            media_path: None,
        }
    }

    // ── Reading ─────────────────────────────────────────────────────

    #[test]
    fn read_trims_header_names_and_maps_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.csv");
        fs::write(
            &path,
            " Channel Title , Channel Username,ID,Message ,Date,Media Path\n\
             Shop,@shop,1,\"['ዋጋ', '300']\",2024-05-01 10:00:00+00:00,\n\
             Shop,@shop,2,,2024-05-01 11:00:00+00:00,data/raw/photos/@shop_2.jpg\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].channel_username, "@shop");
        assert_eq!(rows[0].tokens().unwrap(), vec!["ዋጋ", "300"]);
        assert_eq!(rows[0].media_path, None);
        assert_eq!(rows[1].message, None);
        assert_eq!(
            rows[1].media_path.as_deref(),
            Some("data/raw/photos/@shop_2.jpg")
        );
    }

    #[test]
    fn read_skips_rows_that_do_not_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.csv");
        fs::write(
            &path,
            "Channel Title,Channel Username,ID,Message,Date,Media Path\n\
             Shop,@shop,not-a-number,hi,2024,\n\
             Shop,@shop,7,hi,2024,\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].message_id, 7);
    }

    #[test]
    fn read_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_rows(&dir.path().join("absent.csv")).is_err());
    }

    // ── Writing ─────────────────────────────────────────────────────

    #[test]
    fn writer_emits_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");

        let mut writer = RowWriter::create(&path).unwrap();
        writer.write_row(&row("@a", 1, Some("hello, world"))).unwrap();
        writer.write_row(&row("@a", 2, None)).unwrap();
        assert_eq!(writer.finish().unwrap(), 2);

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Channel Title,Channel Username,ID,Message,Date,Media Path")
        );
        assert_eq!(
            lines.next(),
            Some("@a title,@a,1,\"hello, world\",2024-05-01T10:00:00+00:00,")
        );

        let back = read_rows(&path).unwrap();
        assert_eq!(back, vec![row("@a", 1, Some("hello, world")), row("@a", 2, None)]);
    }

    #[test]
    fn writer_with_no_rows_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        RowWriter::create(&path).unwrap().finish().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Channel Title,Channel Username,ID,Message,Date,Media Path\n"
        );
    }

    // ── Row helpers ─────────────────────────────────────────────────

    #[test]
    fn text_treats_blank_as_missing() {
        assert_eq!(row("@a", 1, Some("   ")).text(), None);
        assert_eq!(row("@a", 1, None).text(), None);
        assert_eq!(row("@a", 1, Some("x")).text(), Some("x"));
    }

    #[test]
    fn tokens_of_missing_message_is_an_error() {
        assert!(row("@a", 1, None).tokens().is_err());
    }
}
