//! Glue between line sources, the orchestrator and output rendering.
//!
//! The `analyze_*` functions drive a [`SessionOrchestrator`] over a line
//! source; the `render_*` functions turn a result into output text. Both are
//! testable with in-memory readers.

use crate::config::ParserOptions;
use crate::model::error::InputError;
use crate::model::{SessionResult, SessionSnapshot};
use crate::source::{InputSource, LineReader};
use crate::state::SessionOrchestrator;
use std::fmt::Write as _;
use std::io::BufRead;
use tracing::info;

/// Analyze every line of a fallible line iterator.
///
/// An I/O error stops the analysis; the open round is discarded since the
/// remaining input is unknown.
///
/// # Errors
///
/// Returns the first `InputError` produced by `lines`.
pub fn analyze_line_results<I>(lines: I, options: ParserOptions) -> Result<SessionResult, InputError>
where
    I: IntoIterator<Item = Result<String, InputError>>,
{
    let mut orchestrator = SessionOrchestrator::new(options);
    for line in lines {
        match line {
            Ok(line) => orchestrator.feed_line(&line),
            Err(err) => {
                orchestrator.abort();
                return Err(err);
            }
        }
    }
    Ok(orchestrator.finish())
}

/// Analyze a buffered reader (lossy UTF-8, `\r\n` tolerated).
///
/// # Errors
///
/// Returns `InputError::Io` if reading fails.
pub fn analyze_reader<R: BufRead>(
    reader: R,
    options: ParserOptions,
) -> Result<SessionResult, InputError> {
    analyze_line_results(LineReader::new(reader), options)
}

/// Analyze a file or stdin source.
///
/// # Errors
///
/// Returns `InputError::Io` if reading fails.
pub fn analyze_source(
    source: InputSource,
    options: ParserOptions,
) -> Result<SessionResult, InputError> {
    info!(source = %source.describe(), ignore_bots = options.ignore_bots, "analyzing log");
    analyze_line_results(source, options)
}

// ===== Rendering =====

/// JSON snapshot of a result, pretty-printed unless `compact`.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization fails.
pub fn render_json(result: &SessionResult, compact: bool) -> Result<String, serde_json::Error> {
    let snapshot = SessionSnapshot::from(result);
    if compact {
        serde_json::to_string(&snapshot)
    } else {
        serde_json::to_string_pretty(&snapshot)
    }
}

/// Short plain-text overview of a result.
pub fn render_summary(result: &SessionResult) -> String {
    let meta = &result.metadata;
    let summary = &result.summary;
    let dealt = summary.damage.dealt();
    let received = summary.damage.received();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lines: {} total, {} relevant",
        meta.total_lines, meta.relevant_lines
    );
    if let Some(api) = meta.api_version {
        let _ = writeln!(out, "API version: {}", api);
    }
    let _ = writeln!(
        out,
        "Games: {} ({} won, {} lost)",
        result.rounds.len(),
        summary.wins,
        summary.losses
    );
    let _ = writeln!(out, "Kills: {}  Deaths: {}", summary.kills, summary.deaths);
    let _ = writeln!(
        out,
        "Damage dealt: {:.2} in {} hits  received: {:.2} in {} hits",
        dealt.amount, dealt.count, received.amount, received.count
    );
    let _ = writeln!(out, "Players met: {}", result.players.len());

    for round in &result.rounds {
        let outcome = if round.is_win() {
            "win"
        } else if round.is_loss() {
            "loss"
        } else {
            "-"
        };
        let _ = writeln!(
            out,
            "  {} {} {} {} kills:{} opponents:{}{}",
            round.id(),
            round.mode(),
            round.region(),
            outcome,
            round.kills(),
            round.opponents().len(),
            if round.force_finished() { " (unfinished)" } else { "" }
        );
    }

    if !meta.warnings.is_empty() {
        let _ = writeln!(out, "Warnings: {}", meta.warnings.len());
        for record in meta.warnings.records() {
            let _ = writeln!(
                out,
                "  [{}] {} (x{})",
                record.category.as_str(),
                record.message,
                record.occurrences
            );
        }
    }
    out
}
