use thiserror::Error;

use crate::model::{RawEntity, RawRelation};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnnotationError {
    #[error("malformed entity annotation at line {line_number}: {line:?}")]
    MalformedEntity { line_number: usize, line: String },

    #[error("invalid entity offset {value:?} at line {line_number}")]
    InvalidOffset { line_number: usize, value: String },

    #[error("malformed relation annotation at line {line_number}: {line:?}")]
    MalformedRelation { line_number: usize, line: String },
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedAnnotations {
    pub entities: Vec<RawEntity>,
    pub relations: Vec<RawRelation>,
    pub malformed_entity_lines: usize,
}

// A `T` line must carry exactly three tab fields with integer offsets, but a
// middle field that is not `type start end` only skips the line.
pub fn parse_annotations(content: &str) -> Result<ParsedAnnotations, AnnotationError> {
    let mut parsed = ParsedAnnotations::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        match raw_line.chars().next() {
            Some('T') => match parse_entity_line(raw_line.trim(), line_number)? {
                Some(entity) => parsed.entities.push(entity),
                None => parsed.malformed_entity_lines += 1,
            },
            Some('R') => {
                let relation = parse_relation_line(raw_line.trim()).ok_or_else(|| {
                    AnnotationError::MalformedRelation {
                        line_number,
                        line: raw_line.to_string(),
                    }
                })?;
                parsed.relations.push(relation);
            }
            _ => {}
        }
    }

    Ok(parsed)
}

fn parse_entity_line(
    line: &str,
    line_number: usize,
) -> Result<Option<RawEntity>, AnnotationError> {
    let fields = line.split('\t').collect::<Vec<_>>();
    let [entity_id, type_and_offsets, text] = fields.as_slice() else {
        return Err(AnnotationError::MalformedEntity {
            line_number,
            line: line.to_string(),
        });
    };

    // Discontinuous spans ("10 20;25 30") split into more than three parts.
    let Some([entity_type, start, end]) = split_exact::<3>(type_and_offsets) else {
        return Ok(None);
    };
    let start_offset = parse_offset(start, line_number)?;
    let end_offset = parse_offset(end, line_number)?;

    Ok(Some(RawEntity {
        entity_id: entity_id.to_string(),
        entity_type: entity_type.to_string(),
        start_offset,
        end_offset,
        text: text.to_string(),
    }))
}

fn parse_offset(value: &str, line_number: usize) -> Result<usize, AnnotationError> {
    value
        .parse::<usize>()
        .map_err(|_| AnnotationError::InvalidOffset {
            line_number,
            value: value.to_string(),
        })
}

fn parse_relation_line(line: &str) -> Option<RawRelation> {
    let fields = line.split('\t').collect::<Vec<_>>();
    let [relation_id, type_and_edges] = fields.as_slice() else {
        return None;
    };

    let [relation_type, source_ref, target_ref] = split_exact::<3>(type_and_edges)?;

    Some(RawRelation {
        relation_id: relation_id.to_string(),
        relation_type: relation_type.to_string(),
        source_ref: source_ref.to_string(),
        target_ref: target_ref.to_string(),
    })
}

fn split_exact<const N: usize>(value: &str) -> Option<[&str; N]> {
    value.split(' ').collect::<Vec<_>>().try_into().ok()
}
