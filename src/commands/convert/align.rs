use std::collections::HashMap;

use tracing::trace;

use crate::cli::OutOfRangePolicy;
use crate::model::{
    DocumentStats, NerEntry, RawEntity, RawRelation, RelationEntry, StructuredDocument, WordSpan,
};

#[derive(Debug, Clone, Copy)]
pub struct AlignOptions {
    pub max_sentence_tokens: usize,
    pub out_of_range: OutOfRangePolicy,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            max_sentence_tokens: 250,
            out_of_range: OutOfRangePolicy::Keep,
        }
    }
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(' ').collect()
}

/// Maps a character span onto the inclusive range of words lying fully inside it.
///
/// Word offsets are rebuilt by summing `chars + 1` over the preceding words, so
/// they agree with offsets taken against the original space-joined text. The
/// result is the hull of all qualifying words; gaps between them are not checked.
pub fn align_span(tokens: &[&str], start_offset: usize, end_offset: usize) -> Option<WordSpan> {
    let mut span: Option<WordSpan> = None;
    let mut cumulative_length = 0_usize;

    for (index, token) in tokens.iter().enumerate() {
        let token_length = token.chars().count();
        if cumulative_length >= start_offset && cumulative_length + token_length <= end_offset {
            span = Some(match span {
                Some(current) => WordSpan {
                    begin: current.begin,
                    end: current.end.max(index),
                },
                None => WordSpan {
                    begin: index,
                    end: index,
                },
            });
        }
        cumulative_length += token_length + 1;
    }

    span.filter(|value| value.begin <= value.end)
}

pub fn align_document(
    doc_key: &str,
    text: &str,
    entities: &[RawEntity],
    relations: &[RawRelation],
    options: AlignOptions,
) -> (StructuredDocument, DocumentStats) {
    let tokens = tokenize(text);
    let emitted_len = tokens.len().min(options.max_sentence_tokens);

    let mut stats = DocumentStats {
        token_count: tokens.len(),
        truncated: tokens.len() > emitted_len,
        entities_parsed: entities.len(),
        relations_parsed: relations.len(),
        ..DocumentStats::default()
    };

    let mut ner = Vec::new();
    let mut spans_by_id = HashMap::<&str, WordSpan>::new();

    for entity in entities {
        let Some(span) = align_span(&tokens, entity.start_offset, entity.end_offset) else {
            trace!(
                doc_key,
                entity_id = %entity.entity_id,
                text = %entity.text,
                "entity span covers no whole word"
            );
            stats.entities_unaligned += 1;
            continue;
        };

        if span.end >= emitted_len {
            stats.entities_out_of_range += 1;
            if options.out_of_range == OutOfRangePolicy::Drop {
                continue;
            }
        }

        stats.entities_aligned += 1;
        ner.push(NerEntry(span.begin, span.end, entity.entity_type.clone()));
        spans_by_id.insert(entity.entity_id.as_str(), span);
    }

    let mut relation_entries = Vec::new();
    for relation in relations {
        let source = spans_by_id.get(relation.source_entity_id());
        let target = spans_by_id.get(relation.target_entity_id());

        match (source, target) {
            (Some(source), Some(target)) => {
                relation_entries.push(RelationEntry(
                    source.begin,
                    source.end,
                    target.begin,
                    target.end,
                    relation.relation_type.clone(),
                ));
                stats.relations_emitted += 1;
            }
            _ => {
                trace!(doc_key, relation_id = %relation.relation_id, "relation endpoint unresolved");
                stats.relations_unresolved += 1;
            }
        }
    }

    let sentence = tokens[..emitted_len]
        .iter()
        .map(|token| token.to_string())
        .collect::<Vec<_>>();

    let document = StructuredDocument {
        doc_key: doc_key.to_string(),
        sentences: vec![sentence],
        ner: vec![ner],
        relations: vec![relation_entries],
    };

    (document, stats)
}
