use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntity {
    pub entity_id: String,
    pub entity_type: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRelation {
    pub relation_id: String,
    pub relation_type: String,
    pub source_ref: String,
    pub target_ref: String,
}

impl RawRelation {
    pub fn source_entity_id(&self) -> &str {
        endpoint_entity_id(&self.source_ref)
    }

    pub fn target_entity_id(&self) -> &str {
        endpoint_entity_id(&self.target_ref)
    }
}

pub fn endpoint_entity_id(reference: &str) -> &str {
    reference
        .rsplit_once(':')
        .map(|(_, entity_id)| entity_id)
        .unwrap_or(reference)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub begin: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NerEntry(pub usize, pub usize, pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry(pub usize, pub usize, pub usize, pub usize, pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub doc_key: String,
    pub sentences: Vec<Vec<String>>,
    pub ner: Vec<Vec<NerEntry>>,
    pub relations: Vec<Vec<RelationEntry>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub token_count: usize,
    pub truncated: bool,
    pub malformed_entity_lines: usize,
    pub entities_parsed: usize,
    pub entities_aligned: usize,
    pub entities_unaligned: usize,
    pub entities_out_of_range: usize,
    pub relations_parsed: usize,
    pub relations_emitted: usize,
    pub relations_unresolved: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub document_count: usize,
    pub truncated_document_count: usize,
    pub malformed_entity_lines: usize,
    pub entities_parsed: usize,
    pub entities_aligned: usize,
    pub entities_unaligned: usize,
    pub entities_out_of_range: usize,
    pub relations_parsed: usize,
    pub relations_emitted: usize,
    pub relations_unresolved: usize,
}

impl AddAssign<&DocumentStats> for ConversionCounts {
    fn add_assign(&mut self, stats: &DocumentStats) {
        self.document_count += 1;
        if stats.truncated {
            self.truncated_document_count += 1;
        }
        self.malformed_entity_lines += stats.malformed_entity_lines;
        self.entities_parsed += stats.entities_parsed;
        self.entities_aligned += stats.entities_aligned;
        self.entities_unaligned += stats.entities_unaligned;
        self.entities_out_of_range += stats.entities_out_of_range;
        self.relations_parsed += stats.relations_parsed;
        self.relations_emitted += stats.relations_emitted;
        self.relations_unresolved += stats.relations_unresolved;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceHashEntry {
    pub doc_key: String,
    pub text_sha256: String,
    pub annotation_sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionPaths {
    pub input_dir: String,
    pub output_dir: String,
    pub output_path: Option<String>,
    pub log_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionOptions {
    pub max_sentence_tokens: usize,
    pub out_of_range: String,
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub token: String,
    pub started_at: String,
    pub finished_at: String,
    pub command: String,
    pub paths: ConversionPaths,
    pub options: ConversionOptions,
    pub counts: ConversionCounts,
    pub source_hashes: Vec<SourceHashEntry>,
}
