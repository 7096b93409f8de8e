//! Offer sink appending chunks to a JSON Lines file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use cap_std::fs::{File, OpenOptions};
use tracing::warn;

use super::cap_paths::open_parent;
use crate::domain::Offer;
use crate::domain::ports::{OfferSink, OfferSinkError};

/// [`OfferSink`] writing one JSON object per offer.
///
/// Each chunk is serialised in full before anything touches the file and is
/// then appended with a single write. A failed write truncates the file back
/// to its length before the chunk, so no partial chunk is left behind.
#[derive(Debug)]
pub struct JsonLinesOfferSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesOfferSink {
    /// Append to `path`, creating it on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(offers: &[Offer]) -> Result<Vec<u8>, OfferSinkError> {
        let mut buffer = Vec::new();
        for offer in offers {
            serde_json::to_writer(&mut buffer, offer)
                .map_err(|error| OfferSinkError::write(format!("encode offer: {error}")))?;
            buffer.push(b'\n');
        }
        Ok(buffer)
    }

    fn append(&self, payload: &[u8]) -> io::Result<()> {
        let (directory, file_name) = open_parent(&self.path)?;
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        let mut file = directory.open_with(&file_name, &options)?;
        append_or_roll_back(&mut file, payload)
    }
}

/// Append target that can be cut back to an earlier length.
trait Truncate: Write {
    fn current_len(&self) -> io::Result<u64>;

    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

fn append_or_roll_back<T: Truncate>(target: &mut T, payload: &[u8]) -> io::Result<()> {
    let original_len = target.current_len()?;
    let written = target.write_all(payload).and_then(|()| target.flush());
    if let Err(error) = written {
        if let Err(rollback_error) = target.truncate_to(original_len) {
            warn!(
                error = %rollback_error,
                original_len,
                "failed to truncate partially written offer chunk"
            );
        }
        return Err(error);
    }
    Ok(())
}

#[async_trait]
impl OfferSink for JsonLinesOfferSink {
    async fn write_chunk(&self, offers: &[Offer]) -> Result<(), OfferSinkError> {
        let payload = Self::encode(offers)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| OfferSinkError::unavailable("output writer poisoned"))?;
        self.append(&payload).map_err(|error| {
            OfferSinkError::write(format!("{}: {error}", self.path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::{Money, ProductId};
    use crate::test_support::cap_fs::read_file_to_string;

    fn offer(name: &str, cents: u64) -> Offer {
        Offer {
            name: name.to_owned(),
            description: format!("Description of {name}"),
            state: "NORMAL".to_owned(),
            meal_id: ProductId::new(1),
            side_dish_id: None,
            drink_id: ProductId::new(3),
            price: Money::from_minor_units(cents),
        }
    }

    #[tokio::test]
    async fn appends_one_object_per_offer_across_chunks() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("offers.jsonl");
        let sink = JsonLinesOfferSink::new(&path);

        sink.write_chunk(&[offer("a", 950), offer("b", 700)])
            .await
            .expect("first chunk");
        sink.write_chunk(&[offer("c", 5)]).await.expect("second chunk");

        let contents = read_file_to_string(&path).expect("read output");
        let records: Vec<Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "a");
        assert_eq!(records[0]["price"], "9.50");
        assert_eq!(records[0]["mealId"], 1);
        assert_eq!(records[0]["sideDishId"], Value::Null);
        assert_eq!(records[2]["price"], "0.05");
    }

    /// Accepts `capacity` more bytes, then fails every write.
    struct ShortWriter {
        contents: Vec<u8>,
        capacity: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.capacity == 0 {
                return Err(io::Error::other("disk full"));
            }
            let accepted = buf.len().min(self.capacity);
            self.contents.extend_from_slice(&buf[..accepted]);
            self.capacity -= accepted;
            Ok(accepted)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Truncate for ShortWriter {
        fn current_len(&self) -> io::Result<u64> {
            Ok(u64::try_from(self.contents.len()).expect("small buffer"))
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.contents
                .truncate(usize::try_from(len).expect("small length"));
            Ok(())
        }
    }

    #[rstest]
    #[case(0)]
    #[case(5)]
    #[case(20)]
    fn failed_write_leaves_no_partial_chunk(#[case] capacity: usize) {
        let mut target = ShortWriter {
            contents: b"{\"name\":\"kept\"}\n".to_vec(),
            capacity,
        };
        let payload = JsonLinesOfferSink::encode(&[offer("a", 950), offer("b", 700)])
            .expect("encode chunk");
        assert!(payload.len() > capacity);

        let result = append_or_roll_back(&mut target, &payload);

        assert!(result.is_err());
        assert_eq!(target.contents, b"{\"name\":\"kept\"}\n".to_vec());
    }

    #[rstest]
    fn successful_write_appends_the_whole_chunk() {
        let mut target = ShortWriter {
            contents: Vec::new(),
            capacity: usize::MAX,
        };
        let payload = JsonLinesOfferSink::encode(&[offer("a", 950)]).expect("encode chunk");

        append_or_roll_back(&mut target, &payload).expect("append");

        assert_eq!(target.contents, payload);
    }

    #[tokio::test]
    async fn missing_directory_is_a_write_error() {
        let temp = TempDir::new().expect("temp dir");
        let sink = JsonLinesOfferSink::new(temp.path().join("absent").join("offers.jsonl"));

        let result = sink.write_chunk(&[offer("a", 100)]).await;

        assert!(matches!(result, Err(OfferSinkError::Write { .. })));
    }
}
