use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::annotation::{ParsedAnnotations, parse_annotations};
use crate::util::normalize_newlines;

pub const TEXT_EXTENSION: &str = "txt";
pub const ANNOTATION_EXTENSION: &str = "a2";

#[derive(Debug)]
pub struct SourceDocument {
    pub doc_key: String,
    pub text_path: PathBuf,
    pub annotation_path: PathBuf,
    pub text: String,
    pub annotations: ParsedAnnotations,
}

pub fn discover_doc_keys(input_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("failed to read {}", input_dir.display()))?;

    let mut keys = BTreeSet::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", input_dir.display()))?;
        let file_name = entry.file_name();
        let file_name = file_name
            .to_str()
            .with_context(|| format!("invalid UTF-8 filename: {}", entry.path().display()))?;

        let stem = file_name.split('.').next().unwrap_or(file_name);
        keys.insert(stem.to_string());
    }

    Ok(keys.into_iter().collect())
}

pub fn document_paths(input_dir: &Path, doc_key: &str) -> (PathBuf, PathBuf) {
    (
        input_dir.join(format!("{doc_key}.{TEXT_EXTENSION}")),
        input_dir.join(format!("{doc_key}.{ANNOTATION_EXTENSION}")),
    )
}

pub fn load_document(input_dir: &Path, doc_key: &str) -> Result<SourceDocument> {
    let (text_path, annotation_path) = document_paths(input_dir, doc_key);

    info!(path = %text_path.display(), "loading raw text");
    let text = read_text(&text_path)?;

    info!(path = %annotation_path.display(), "loading ground truth annotations");
    let annotations = read_annotations(&annotation_path)?;

    Ok(SourceDocument {
        doc_key: doc_key.to_string(),
        text_path,
        annotation_path,
        text,
        annotations,
    })
}

pub fn read_text(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read raw text {}", path.display()))?;
    Ok(normalize_newlines(&raw))
}

pub fn read_annotations(path: &Path) -> Result<ParsedAnnotations> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read annotation file {}", path.display()))?;
    parse_annotations(&normalize_newlines(&raw))
        .with_context(|| format!("failed to parse annotation file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_keys_are_deduplicated_and_sorted() {
        let dir = tempfile::TempDir::new().unwrap();
        for name in [
            "BB-rel-F-200.txt",
            "BB-rel-F-200.a2",
            "BB-rel-F-100.a1",
            "BB-rel-F-100.txt",
            "BB-rel-F-100.a2",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let keys = discover_doc_keys(dir.path()).unwrap();
        assert_eq!(keys, vec!["BB-rel-F-100", "BB-rel-F-200"]);
    }

    #[test]
    fn doc_key_stops_at_first_dot() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("doc.v2.txt"), "").unwrap();

        assert_eq!(discover_doc_keys(dir.path()).unwrap(), vec!["doc"]);
    }

    #[test]
    fn missing_input_dir_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(discover_doc_keys(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn load_document_requires_both_files() {
        let dir = tempfile::TempDir::new().unwrap();
        fs::write(dir.path().join("doc.txt"), "A B").unwrap();

        let err = load_document(dir.path(), "doc").unwrap_err();
        assert!(format!("{err:#}").contains("doc.a2"));

        fs::write(dir.path().join("doc.a2"), "T1\tX 0 1\tA\n").unwrap();
        let document = load_document(dir.path(), "doc").unwrap();
        assert_eq!(document.text, "A B");
        assert_eq!(document.annotations.entities.len(), 1);
        assert_eq!(document.text_path, dir.path().join("doc.txt"));
    }

    #[test]
    fn read_text_normalizes_line_endings() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "Title\r\nBody text").unwrap();

        assert_eq!(read_text(&path).unwrap(), "Title\nBody text");
    }

    #[test]
    fn read_annotations_splits_lone_carriage_returns() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.a2");
        fs::write(
            &path,
            "T1\tX 0 1\tA\rT2\tX 2 3\tB\rR1\tRel Arg1:T1 Arg2:T2\r",
        )
        .unwrap();

        let parsed = read_annotations(&path).unwrap();
        assert_eq!(parsed.entities.len(), 2);
        assert_eq!(parsed.entities[0].text, "A");
        assert_eq!(parsed.relations.len(), 1);
    }

    #[test]
    fn read_annotations_reports_the_file_on_parse_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("doc.a2");
        fs::write(&path, "R1\tLives_In\n").unwrap();

        let err = read_annotations(&path).unwrap_err();
        assert!(format!("{err:#}").contains("doc.a2"));
        assert!(format!("{err:#}").contains("line 1"));
    }
}
