//! CLI command implementations
//!
//! Each command is a thin wrapper over the library: load a snapshot, run
//! the engine, write or print the result.

use std::path::Path;

use crate::config::EngineConfig;
use crate::joiner::Joiner;
use crate::observability::{Logger, Severity};
use crate::parser::{Key, Parser, ParserError};
use crate::record::{model_key, record_id, record_source, record_url, ApiUrl};
use crate::store::{load_snapshot, write_snapshot, RecordStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Dispatch a parsed command line
pub fn run_command(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Join {
            snapshot,
            out,
            config,
        } => join(&snapshot, &out, config.as_deref()),
        Command::Show {
            snapshot,
            app,
            model,
        } => show(&snapshot, app.as_deref(), model.as_deref()),
        Command::Verify { snapshot } => verify(&snapshot),
    }
}

/// Load a root snapshot, assemble the joined tree, write it back out
pub fn join(snapshot: &Path, out: &Path, config: Option<&Path>) -> CliResult<()> {
    let config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let (root, meta) = load_snapshot(snapshot)?;
    Logger::info(
        "snapshot_loaded",
        &[
            ("source", &meta.source),
            ("records", &meta.record_count.to_string()),
        ],
    );

    for (path, key, count) in retired_key_hits(&root, &config)? {
        Logger::log(
            Severity::Warn,
            "deprecated_key",
            &[
                ("path", path.as_str()),
                ("key", key.as_str()),
                ("records", &count.to_string()),
            ],
        );
    }

    let tree = Joiner::assemble(&root);
    let written = write_snapshot(&tree, out, &meta.source)?;
    Logger::info(
        "snapshot_written",
        &[
            ("path", &out.display().to_string()),
            ("records", &written.record_count.to_string()),
        ],
    );
    Ok(())
}

/// Schema-skew check over a freshly loaded store: per deprecated-key
/// rule, count the records still carrying a key their bucket retired at
/// the configured API version. Returns `(app/model, key, count)` per
/// rule that hit.
fn retired_key_hits(
    store: &RecordStore,
    config: &EngineConfig,
) -> CliResult<Vec<(String, String, usize)>> {
    let table = config.deprecated_keys()?;
    let mut hits = Vec::new();
    for rule in table.entries() {
        let Some(bucket) = store.get(&rule.app, &rule.model) else {
            continue;
        };
        let mut count = 0;
        for record in bucket.values() {
            if record.get(&rule.key).is_none() {
                continue;
            }
            let mut parser = Parser::new(Some(record), false).with_deprecated(table.clone());
            if let Some(version) = &config.api_version {
                parser = parser.with_api_version(version.clone());
            }
            // Version errors fire even in lenient mode; anything else
            // means the rule does not apply at this version
            if matches!(
                parser.any(&[Key::from(rule.key.as_str())]),
                Err(ParserError::Version { .. })
            ) {
                count += 1;
            }
        }
        if count > 0 {
            hits.push((format!("{}/{}", rule.app, rule.model), rule.key.clone(), count));
        }
    }
    Ok(hits)
}

/// Print a bucket summary, or the contents of one (app, model) bucket
pub fn show(snapshot: &Path, app: Option<&str>, model: Option<&str>) -> CliResult<()> {
    let (store, meta) = load_snapshot(snapshot)?;

    if let (Some(app), Some(model)) = (app, model) {
        let Some(bucket) = store.get(app, model) else {
            return Err(CliError::UnknownBucket(format!("{}/{}", app, model)));
        };
        for record in bucket.values() {
            println!("{}", record);
        }
        return Ok(());
    }

    println!(
        "snapshot: {} ({} records, written {})",
        meta.source, meta.record_count, meta.created_at
    );
    for app in store.apps() {
        for model in store.models(app) {
            let count = store.get(app, model).map_or(0, |bucket| bucket.len());
            println!("  {}/{}: {}", app, model, count);
        }
    }
    Ok(())
}

/// Verify a snapshot: the checksum (enforced by the loader) plus the
/// bucket invariant that every record's embedded id matches its key and
/// its url, when present, parses back to its own bucket
pub fn verify(snapshot: &Path) -> CliResult<()> {
    let (store, meta) = load_snapshot(snapshot)?;

    let mut checked: u64 = 0;
    for app in store.apps() {
        for model in store.models(app) {
            let Some(bucket) = store.get(app, model) else {
                continue;
            };
            for (id, record) in bucket {
                if record_id(record) != Some(*id) {
                    return Err(CliError::Verify(format!(
                        "{}/{}/{}: embedded id disagrees with bucket key ({})",
                        app,
                        model,
                        id,
                        record_source(record)
                    )));
                }
                if let Some(url) = record_url(record) {
                    match ApiUrl::parse(url) {
                        Ok(parsed)
                            if parsed.app == app
                                && model_key(&parsed.model) == model
                                && parsed.id == Some(*id) => {}
                        _ => {
                            return Err(CliError::Verify(format!(
                                "{}/{}/{}: url '{}' does not match bucket placement",
                                app, model, id, url
                            )));
                        }
                    }
                }
                checked += 1;
            }
        }
    }

    if checked != meta.record_count {
        return Err(CliError::Verify(format!(
            "metadata claims {} records, store holds {}",
            meta.record_count, checked
        )));
    }
    println!("ok: {} records verified", checked);
    Ok(())
}
