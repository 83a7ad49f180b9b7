/*!
Loading of offset-annotated document containers: a raw text blob, the token ranges the external
tokenizer produced (grouped into sentences), and the manually annotated ground-truth spans, all
as one JSON record, optionally gzip-compressed. A document without a text payload fails to load
as a whole; an individual annotation with malformed offsets is dropped and the rest of the
document proceeds. Loaded documents are immutable.
*/
use crate::span::{Label, Span};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{self, Display};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

/// One loaded document. `sentences` holds the tokenizer's `(start, end)` character ranges
/// grouped by sentence; ground truth is fixed at load time.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub sentences: Vec<Vec<(usize, usize)>>,
    pub ground_truth: Vec<Span>,
}

impl Document {
    /// The flattened token sequence across all sentences.
    pub fn tokens(&self) -> Vec<(usize, usize)> {
        self.sentences.iter().flatten().copied().collect()
    }

    /// Loads a container file; `.gz` payloads are detected by their magic bytes, not by file
    /// name.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Document, DocumentError> {
        let path = path.as_ref();
        let id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = fs::read(path)?;
        Document::from_bytes(id, &bytes)
    }

    /// Parses a container from raw bytes, decompressing first when the payload is gzip.
    pub fn from_bytes(id: String, bytes: &[u8]) -> Result<Document, DocumentError> {
        let raw: RawDocument = if bytes.starts_with(&[0x1f, 0x8b]) {
            let mut decompressed = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut decompressed)?;
            serde_json::from_slice(&decompressed)?
        } else {
            serde_json::from_slice(bytes)?
        };
        Document::from_raw(id, raw)
    }

    fn from_raw(id: String, raw: RawDocument) -> Result<Document, DocumentError> {
        let id = raw.filename.unwrap_or(id);
        let text = match raw.text {
            Some(text) if !text.is_empty() => text,
            _ => return Err(DocumentError::MissingText { id }),
        };
        let sentences = if !raw.sentences.is_empty() {
            raw.sentences
        } else if !raw.tokens.is_empty() {
            vec![raw.tokens]
        } else {
            Vec::new()
        };
        let mut ground_truth = Vec::new();
        for (index, entity) in raw.entities.into_iter().enumerate() {
            match entity.into_span(&text) {
                Ok(Some(span)) => ground_truth.push(span),
                Ok(None) => {
                    debug!(document = %id, index, "annotation label outside the target set");
                }
                Err(error) => {
                    warn!(document = %id, index, %error, "dropping annotation with malformed offsets");
                }
            }
        }
        Ok(Document {
            id,
            text,
            sentences,
            ground_truth,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    sentences: Vec<Vec<(usize, usize)>>,
    #[serde(default)]
    tokens: Vec<(usize, usize)>,
    #[serde(default, alias = "ground_truth")]
    entities: Vec<RawEntity>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    start: Option<usize>,
    #[serde(default)]
    end: Option<usize>,
}

impl RawEntity {
    /// `Ok(None)` for labels outside the target set, `Err` for malformed offsets. The surface
    /// text is always rederived from the base text; the container's copy is informational.
    fn into_span(self, text: &str) -> Result<Option<Span>, Box<dyn Error>> {
        let Some(label) = self.label.as_deref().and_then(Label::from_label) else {
            return Ok(None);
        };
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err("annotation is missing its start or end offset".into());
        };
        let span = Span::from_text(text, label, start, end)?;
        Ok(Some(span))
    }
}

/// Failure to load one document. The surrounding run skips the document and continues.
#[derive(Debug)]
pub enum DocumentError {
    Io(io::Error),
    Json(serde_json::Error),
    MissingText { id: String },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::Io(e) => write!(f, "could not read document container: {}", e),
            DocumentError::Json(e) => write!(f, "could not parse document container: {}", e),
            DocumentError::MissingText { id } => {
                write!(f, "document {} has no text payload", id)
            }
        }
    }
}

impl Error for DocumentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DocumentError::Io(e) => Some(e),
            DocumentError::Json(e) => Some(e),
            DocumentError::MissingText { .. } => None,
        }
    }
}

impl From<io::Error> for DocumentError {
    fn from(e: io::Error) -> Self {
        DocumentError::Io(e)
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Json(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const CONTAINER: &str = r#"{
        "filename": "sitzung_851.json",
        "text": "Karl Nehammer spricht in Wien.",
        "sentences": [[[0, 4], [5, 13], [14, 21], [22, 24], [25, 29], [29, 30]]],
        "entities": [
            {"text": "Karl Nehammer", "label": "PER", "start": 0, "end": 13},
            {"text": "Wien", "label": "LOC", "start": 25, "end": 29}
        ]
    }"#;

    #[test]
    fn plain_container_loads_with_derived_text() {
        let document = Document::from_bytes("fallback".into(), CONTAINER.as_bytes()).unwrap();
        assert_eq!(document.id, "sitzung_851.json");
        assert_eq!(document.ground_truth.len(), 2);
        assert_eq!(document.ground_truth[0].text, "Karl Nehammer");
        assert_eq!(document.tokens().len(), 6);
    }

    #[test]
    fn gzip_container_is_detected_by_magic_bytes() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CONTAINER.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();
        let document = Document::from_bytes("x".into(), &compressed).unwrap();
        assert_eq!(document.id, "sitzung_851.json");
        assert_eq!(document.ground_truth.len(), 2);
    }

    #[test]
    fn truncated_gzip_fails_to_load() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CONTAINER.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();
        let result = Document::from_bytes("x".into(), &compressed[..compressed.len() / 2]);
        assert!(matches!(result, Err(DocumentError::Io(_))));
    }

    #[test]
    fn missing_text_is_fatal_for_the_document() {
        let result = Document::from_bytes("empty.json".into(), br#"{"entities": []}"#);
        assert!(matches!(
            result,
            Err(DocumentError::MissingText { id }) if id == "empty.json"
        ));
    }

    #[test]
    fn malformed_annotations_are_dropped_individually() {
        let container = r#"{
            "text": "Wien und Graz.",
            "entities": [
                {"label": "LOC", "start": 0, "end": 4},
                {"label": "LOC", "start": 9, "end": 99},
                {"label": "LOC", "start": 9},
                {"label": "MISC", "start": 0, "end": 4}
            ]
        }"#;
        let document = Document::from_bytes("d.json".into(), container.as_bytes()).unwrap();
        assert_eq!(document.ground_truth.len(), 1);
        assert_eq!(document.ground_truth[0].text, "Wien");
    }

    #[test]
    fn load_from_disk_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        fs::write(&path, CONTAINER).unwrap();
        let document = Document::load(&path).unwrap();
        assert_eq!(document.text, "Karl Nehammer spricht in Wien.");
    }
}
