//! Offer line source reading delimited text files.

use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use std::path::Path;

use async_trait::async_trait;
use cap_std::fs::File;
use tracing::debug;

use super::cap_paths::open_parent;
use crate::domain::ports::{OfferLineReader, OfferLineSource, OfferSourceError, SourceLine};

/// File-backed [`OfferLineSource`].
///
/// Lines are split on `\n`; a trailing `\r` is removed. A final line without
/// a terminator is still delivered. Bytes that are not valid UTF-8 are
/// replaced with `U+FFFD`, so one badly encoded line never ends the read.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOfferLineSource;

#[async_trait]
impl OfferLineSource for FileOfferLineSource {
    async fn open(&self, path: &Path) -> Result<Box<dyn OfferLineReader>, OfferSourceError> {
        let open_error =
            |error: std::io::Error| OfferSourceError::open(format!("{}: {error}", path.display()));
        let (directory, file_name) = open_parent(path).map_err(open_error)?;
        let file = directory.open(&file_name).map_err(open_error)?;
        Ok(Box::new(FileLineReader {
            reader: BufReader::new(file),
            next_line_number: 1,
            buffer: Vec::new(),
        }))
    }
}

struct FileLineReader {
    reader: BufReader<File>,
    next_line_number: u64,
    buffer: Vec<u8>,
}

#[async_trait]
impl OfferLineReader for FileLineReader {
    async fn next_line(&mut self) -> Result<Option<SourceLine>, OfferSourceError> {
        self.buffer.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|error| {
                OfferSourceError::read(format!("line {}: {error}", self.next_line_number))
            })?;
        if read == 0 {
            return Ok(None);
        }
        let line_number = self.next_line_number;
        let decoded = String::from_utf8_lossy(&self.buffer);
        if matches!(decoded, Cow::Owned(_)) {
            debug!(line_number, "replaced invalid UTF-8 in offer line");
        }
        let text = decoded
            .strip_suffix('\n')
            .unwrap_or(decoded.as_ref())
            .trim_end_matches('\r')
            .to_owned();
        self.next_line_number = self.next_line_number.saturating_add(1);
        Ok(Some(SourceLine { line_number, text }))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use tempfile::TempDir;

    use super::*;
    use crate::test_support::cap_fs::write_file;

    async fn read_all(path: &Path) -> Vec<SourceLine> {
        let mut reader = FileOfferLineSource.open(path).await.expect("open source");
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.expect("read line") {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn numbers_lines_and_strips_terminators() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("offers.csv");
        write_file(&path, b"a,b\r\n\r\nc,d\ne,f").expect("write input");

        let lines = read_all(&path).await;

        let texts: Vec<(u64, &str)> = lines
            .iter()
            .map(|line| (line.line_number, line.text.as_str()))
            .collect();
        assert_eq!(texts, vec![(1, "a,b"), (2, ""), (3, "c,d"), (4, "e,f")]);
    }

    #[tokio::test]
    async fn empty_file_yields_no_lines() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("empty.csv");
        write_file(&path, b"").expect("write input");

        assert!(read_all(&path).await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_open_error() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("missing.csv");

        let Err(error) = FileOfferLineSource.open(&path).await else {
            panic!("expected open failure");
        };

        assert!(matches!(error, OfferSourceError::Open { .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_and_reading_continues() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("latin1.csv");
        write_file(&path, b"ok\nMen\xfc,d\r\nlast\n").expect("write input");

        let lines = read_all(&path).await;

        let texts: Vec<(u64, &str)> = lines
            .iter()
            .map(|line| (line.line_number, line.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![(1, "ok"), (2, "Men\u{FFFD},d"), (3, "last")]
        );
    }
}
