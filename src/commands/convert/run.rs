use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::align::{AlignOptions, align_document};
use super::corpus::{discover_doc_keys, load_document};
use super::output::JsonLinesWriter;
use crate::cli::Cli;
use crate::model::{
    ConversionCounts, ConversionOptions, ConversionPaths, ConversionRunManifest, SourceHashEntry,
};
use crate::util::{
    ensure_directory, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

#[derive(Debug)]
pub struct ConversionReport {
    pub counts: ConversionCounts,
    pub source_hashes: Vec<SourceHashEntry>,
}

pub fn run(args: Cli) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("convert-{}", utc_compact_string(started_ts));

    info!(run_id = %run_id, token = args.token.as_str(), "starting conversion");

    let report = convert(&args)?;

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_manifest(&args, run_id, started_at, report);
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote conversion manifest");
    }

    Ok(())
}

pub fn convert(args: &Cli) -> Result<ConversionReport> {
    ensure_directory(&args.output_dir)?;

    let doc_keys = discover_doc_keys(&args.input_dir)?;
    info!(
        doc_count = doc_keys.len(),
        token = args.token.as_str(),
        "discovered documents"
    );

    let output_path = args.output_path();
    let mut writer = if args.dry_run {
        info!("dry-run: no output will be written");
        None
    } else {
        info!(path = %output_path.display(), "writing output");
        Some(JsonLinesWriter::create(&output_path)?)
    };

    let options = AlignOptions {
        max_sentence_tokens: args.max_sentence_tokens,
        out_of_range: args.out_of_range,
    };

    let mut counts = ConversionCounts::default();
    let mut source_hashes = Vec::with_capacity(doc_keys.len());

    for doc_key in &doc_keys {
        let source = load_document(&args.input_dir, doc_key)?;
        let (document, mut stats) = align_document(
            &source.doc_key,
            &source.text,
            &source.annotations.entities,
            &source.annotations.relations,
            options,
        );

        stats.malformed_entity_lines = source.annotations.malformed_entity_lines;

        debug!(
            doc_key = %source.doc_key,
            tokens = stats.token_count,
            truncated = stats.truncated,
            entities = stats.entities_parsed,
            aligned = stats.entities_aligned,
            unaligned = stats.entities_unaligned,
            out_of_range = stats.entities_out_of_range,
            relations = stats.relations_emitted,
            unresolved = stats.relations_unresolved,
            "aligned document"
        );
        if stats.entities_out_of_range > 0 {
            warn!(
                doc_key = %source.doc_key,
                count = stats.entities_out_of_range,
                policy = args.out_of_range.as_str(),
                "entities beyond the truncated sentence"
            );
        }

        if let Some(writer) = writer.as_mut() {
            writer.write_record(&document)?;
        }

        if args.manifest_path.is_some() {
            source_hashes.push(SourceHashEntry {
                doc_key: source.doc_key.clone(),
                text_sha256: sha256_file(&source.text_path)?,
                annotation_sha256: sha256_file(&source.annotation_path)?,
            });
        }

        counts += &stats;
    }

    if let Some(writer) = writer {
        let written = writer.finish()?;
        info!(path = %output_path.display(), records = written, "output complete");
    }

    info!(
        documents = counts.document_count,
        truncated = counts.truncated_document_count,
        entities = counts.entities_parsed,
        aligned = counts.entities_aligned,
        unaligned = counts.entities_unaligned,
        out_of_range = counts.entities_out_of_range,
        malformed_entity_lines = counts.malformed_entity_lines,
        relations = counts.relations_parsed,
        emitted = counts.relations_emitted,
        unresolved = counts.relations_unresolved,
        "conversion completed"
    );

    Ok(ConversionReport {
        counts,
        source_hashes,
    })
}

fn build_manifest(
    args: &Cli,
    run_id: String,
    started_at: String,
    report: ConversionReport,
) -> ConversionRunManifest {
    ConversionRunManifest {
        manifest_version: 1,
        run_id,
        token: args.token.as_str().to_string(),
        started_at,
        finished_at: now_utc_string(),
        command: render_command(args),
        paths: ConversionPaths {
            input_dir: args.input_dir.display().to_string(),
            output_dir: args.output_dir.display().to_string(),
            output_path: (!args.dry_run).then(|| args.output_path().display().to_string()),
            log_path: args.log_path().display().to_string(),
        },
        options: ConversionOptions {
            max_sentence_tokens: args.max_sentence_tokens,
            out_of_range: args.out_of_range.as_str().to_string(),
            dry_run: args.dry_run,
        },
        counts: report.counts,
        source_hashes: report.source_hashes,
    }
}

fn render_command(args: &Cli) -> String {
    let mut command = vec![
        "bb19prep".to_string(),
        "--token".to_string(),
        args.token.as_str().to_string(),
        "--input_dir".to_string(),
        args.input_dir.display().to_string(),
        "--output_dir".to_string(),
        args.output_dir.display().to_string(),
        "--max-sentence-tokens".to_string(),
        args.max_sentence_tokens.to_string(),
        "--out-of-range".to_string(),
        args.out_of_range.as_str().to_string(),
    ];

    if args.dry_run {
        command.push("--dry-run".to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
