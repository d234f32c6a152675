//! JSON corpus loader.
//!
//! Reads the paper dump format: a top-level JSON array of objects carrying an
//! `abstractText` string (nullable) and a `referenceAuthors` list whose
//! entries hold `person.firstname` / `person.lastname`.
//!
//! Bad records are skipped, not fatal. Only an unreadable file or a document
//! that is not a JSON array fails the load.

use super::{Corpus, PaperRecord};
use crate::error::{Error, Result};
use core::fmt;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawPaper {
    #[serde(rename = "abstractText", default)]
    abstract_text: Option<String>,
    #[serde(rename = "referenceAuthors", default)]
    reference_authors: Option<Vec<RawAuthor>>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    person: RawPerson,
}

#[derive(Debug, Deserialize)]
struct RawPerson {
    firstname: String,
    lastname: String,
}

/// Why a source record was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// `abstractText` absent, null, or blank.
    MissingAbstract,
    /// Record did not match the expected shape.
    Malformed(String),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MissingAbstract => write!(f, "missing abstract"),
            DataError::Malformed(msg) => write!(f, "malformed record: {msg}"),
        }
    }
}

fn to_record(value: serde_json::Value) -> std::result::Result<PaperRecord, DataError> {
    let raw: RawPaper =
        serde_json::from_value(value).map_err(|e| DataError::Malformed(e.to_string()))?;

    let abstract_text = match raw.abstract_text {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Err(DataError::MissingAbstract),
    };

    let co_authors = raw
        .reference_authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| format!("{} {}", a.person.firstname, a.person.lastname))
        .collect();

    Ok(PaperRecord {
        abstract_text,
        co_authors,
    })
}

/// Parse a corpus from JSON text.
pub fn parse_corpus(json: &str) -> Result<Corpus> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| Error::Load(e.to_string()))?;

    let total = values.len();
    let mut records = Vec::with_capacity(total);
    let mut skipped = 0;

    for (idx, value) in values.into_iter().enumerate() {
        match to_record(value) {
            Ok(record) => records.push(record),
            Err(reason) => {
                tracing::warn!(record = idx, %reason, "skipping paper record");
                skipped += 1;
            }
        }
    }

    let corpus = Corpus::from_records(records).with_skipped(skipped);
    tracing::info!(
        total,
        retained = corpus.len(),
        skipped = corpus.skipped(),
        "corpus parsed"
    );
    Ok(corpus)
}

/// Load a corpus from a local JSON file.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Corpus> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::Load(format!("{}: {e}", path.display())))?;
    parse_corpus(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {
            "abstractText": "We study quantum entanglement.",
            "referenceAuthors": [
                {"person": {"firstname": "Lise", "lastname": "Meitner"}},
                {"person": {"firstname": "Emmy", "lastname": "Noether"}}
            ]
        },
        {"abstractText": null, "referenceAuthors": []},
        {"referenceAuthors": [{"person": {"firstname": "No", "lastname": "Abstract"}}]},
        {"abstractText": "Bad author entry", "referenceAuthors": [{"name": "x"}]},
        {"abstractText": "Lattice methods for sieving."}
    ]"#;

    #[test]
    fn test_parse_skips_bad_records() {
        let corpus = parse_corpus(SAMPLE).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.skipped(), 3);

        let first = &corpus.records()[0];
        assert_eq!(first.abstract_text, "We study quantum entanglement.");
        assert_eq!(first.co_authors, vec!["Lise Meitner", "Emmy Noether"]);

        let second = &corpus.records()[1];
        assert_eq!(second.abstract_text, "Lattice methods for sieving.");
        assert!(second.co_authors.is_empty());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_corpus(r#"{"abstractText": "x"}"#).unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }

    #[test]
    fn test_all_null_abstracts_gives_empty_corpus() {
        let corpus = parse_corpus(r#"[{"abstractText": null}, {"abstractText": ""}]"#).unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.skipped(), 2);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_corpus("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Load(_)));
    }
}
