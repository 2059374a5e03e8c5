//! Culling log parser - Entry Point

use clap::Parser;
use culling_log_parser::model::AppError;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Culling log parser - round and damage statistics from game client logs
#[derive(Parser, Debug)]
#[command(name = "culling-log-parser")]
#[command(version)]
#[command(about = "Analyze The Culling client logs into round and damage statistics")]
pub struct Args {
    /// Path to the client log file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Drop damage dealt to or received from bots
    #[arg(long)]
    pub ignore_bots: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path of the diagnostic log file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print a short plain-text overview instead of JSON
    #[arg(short, long)]
    pub summary: bool,

    /// Print JSON on a single line
    #[arg(long, conflicts_with = "summary")]
    pub compact: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file =
            culling_log_parser::config::load_config_with_precedence(args.config.clone())?;
        let merged = culling_log_parser::config::merge_config(config_file);
        let with_env = culling_log_parser::config::apply_env_overrides(merged);

        // Flags only override when explicitly set
        let ignore_bots_override = args.ignore_bots.then_some(true);
        culling_log_parser::config::apply_cli_overrides(
            with_env,
            ignore_bots_override,
            args.log_file.clone(),
        )
    };

    culling_log_parser::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    let input_source = culling_log_parser::source::detect_input_source(args.file.clone())?;
    let result =
        culling_log_parser::integration::analyze_source(input_source, config.parser_options())?;

    let output = if args.summary {
        culling_log_parser::integration::render_summary(&result)
    } else {
        let mut json = culling_log_parser::integration::render_json(&result, args.compact)?;
        json.push('\n');
        json
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
