// envelope.rs — The published document shape.
//
// Write side: `EnvelopeWriter` streams the document piecewise so each
// category's payload can be written as soon as it arrives. The output is
// byte-for-byte what serde_json would produce for the equivalent compact
// object, with `data` entries in the order they were written.
//
// Read side: `Envelope` deserializes a published file for consumers.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EnvelopeError, FetchError};

/// Value of `meta.format` in every envelope this crate writes.
pub const ENVELOPE_FORMAT: &str = "RdsData";

/// Value of `meta.version`; bumped whenever the envelope contract changes.
pub const ENVELOPE_VERSION: u32 = 2;

/// Client identity written to `meta.agent` unless configured otherwise.
pub fn default_agent() -> String {
    format!("rds-downloader/{}", env!("CARGO_PKG_VERSION"))
}

/// The `meta` object of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub format: String,
    pub version: u32,
    pub agent: String,
}

impl EnvelopeMeta {
    /// Meta for the current contract version with the given client identity.
    pub fn current(agent: impl Into<String>) -> Self {
        Self {
            format: ENVELOPE_FORMAT.to_string(),
            version: ENVELOPE_VERSION,
            agent: agent.into(),
        }
    }
}

/// A published envelope, as seen by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub meta: EnvelopeMeta,
    pub data: Map<String, Value>,
}

impl Envelope {
    /// Load and check an envelope file.
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, EnvelopeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| EnvelopeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let envelope: Envelope =
            serde_json::from_slice(&bytes).map_err(|source| EnvelopeError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if envelope.meta.format != ENVELOPE_FORMAT || envelope.meta.version != ENVELOPE_VERSION {
            return Err(EnvelopeError::Unsupported {
                path: path.to_path_buf(),
                format: envelope.meta.format,
                version: envelope.meta.version,
            });
        }
        Ok(envelope)
    }

    /// Category names present in `data`.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

/// Fold `(name, payload)` pairs so every name appears once, at the position
/// of its first occurrence, carrying its last payload.
pub fn fold_last_write_wins<I>(entries: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut folded: Vec<(String, Value)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (name, payload) in entries {
        match positions.get(&name) {
            Some(&at) => folded[at].1 = payload,
            None => {
                positions.insert(name.clone(), folded.len());
                folded.push((name, payload));
            }
        }
    }
    folded
}

/// Streams one envelope into a sink.
///
/// Call [`EnvelopeWriter::begin`], then [`EnvelopeWriter::entry`] per
/// category, then [`EnvelopeWriter::finish`]. Dropping the writer before
/// `finish` leaves an incomplete document in the sink. Names passed to
/// `entry` must be distinct; see [`fold_last_write_wins`].
pub struct EnvelopeWriter<'a> {
    sink: &'a mut (dyn Write + Send),
    entries: usize,
}

impl<'a> EnvelopeWriter<'a> {
    /// Write the opening of the document and its `meta` object.
    pub fn begin(sink: &'a mut (dyn Write + Send), meta: &EnvelopeMeta) -> Result<Self, FetchError> {
        sink.write_all(br#"{"meta":"#)?;
        serde_json::to_writer(&mut *sink, meta)?;
        sink.write_all(br#","data":{"#)?;
        Ok(Self { sink, entries: 0 })
    }

    /// Append one `category: payload` entry to `data`.
    pub fn entry(&mut self, category: &str, payload: &Value) -> Result<(), FetchError> {
        if self.entries > 0 {
            self.sink.write_all(b",")?;
        }
        serde_json::to_writer(&mut *self.sink, category)?;
        self.sink.write_all(b":")?;
        serde_json::to_writer(&mut *self.sink, payload)?;
        self.entries += 1;
        Ok(())
    }

    /// Close the document and flush the sink. Returns the number of entries.
    pub fn finish(self) -> Result<usize, FetchError> {
        self.sink.write_all(b"}}")?;
        self.sink.flush()?;
        Ok(self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn write_envelope(entries: &[(&str, Value)]) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        let meta = EnvelopeMeta::current("unit-test");
        let mut writer = EnvelopeWriter::begin(&mut out, &meta).unwrap();
        for (category, payload) in entries {
            writer.entry(category, payload).unwrap();
        }
        assert_eq!(writer.finish().unwrap(), entries.len());
        out
    }

    #[test]
    fn streamed_bytes_are_compact_json_in_order() {
        let out = write_envelope(&[("foo", json!(42)), ("bar", json!("baz"))]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"{"meta":{"format":"RdsData","version":2,"agent":"unit-test"},"data":{"foo":42,"bar":"baz"}}"#
        );
    }

    #[test]
    fn empty_data_is_still_a_valid_document() {
        let out = write_envelope(&[]);
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["data"], json!({}));
        assert_eq!(value["meta"]["version"], ENVELOPE_VERSION);
    }

    #[test]
    fn category_names_are_escaped() {
        let out = write_envelope(&[("we\"ird", json!([1, 2]))]);
        let value: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["data"]["we\"ird"], json!([1, 2]));
    }

    #[test]
    fn duplicate_categories_resolve_last_write_wins() {
        let folded = fold_last_write_wins(vec![
            ("foo".to_string(), json!(1)),
            ("bar".to_string(), json!("b")),
            ("foo".to_string(), json!(2)),
        ]);
        let entries: Vec<(&str, Value)> = folded
            .iter()
            .map(|(name, payload)| (name.as_str(), payload.clone()))
            .collect();
        let out = write_envelope(&entries);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches(r#""foo":"#).count(), 1);
        assert!(text.ends_with(r#""data":{"foo":2,"bar":"b"}}"#));
    }

    #[test]
    fn fold_keeps_distinct_names_untouched() {
        let entries = vec![
            ("zeta".to_string(), json!(1)),
            ("alpha".to_string(), json!(2)),
        ];
        assert_eq!(fold_last_write_wins(entries.clone()), entries);
        assert!(fold_last_write_wins(Vec::new()).is_empty());
    }

    #[test]
    fn read_from_round_trips_written_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rds-data.json");
        std::fs::write(
            &path,
            write_envelope(&[("foo", json!(42)), ("bar", json!("baz"))]),
        )
        .unwrap();

        let envelope = Envelope::read_from(&path).unwrap();
        assert_eq!(envelope.meta, EnvelopeMeta::current("unit-test"));
        assert_eq!(envelope.data["foo"], json!(42));
        assert_eq!(envelope.categories().count(), 2);
    }

    #[test]
    fn read_from_rejects_foreign_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(
            &path,
            r#"{"meta":{"format":"Other","version":1,"agent":"x"},"data":{}}"#,
        )
        .unwrap();

        let err = Envelope::read_from(&path).unwrap_err();
        assert!(matches!(err, EnvelopeError::Unsupported { version: 1, .. }));
    }

    #[test]
    fn read_from_reports_missing_file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = Envelope::read_from(&path).unwrap_err();
        assert!(matches!(err, EnvelopeError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn default_agent_names_the_downloader() {
        assert!(default_agent().starts_with("rds-downloader/"));
    }
}
