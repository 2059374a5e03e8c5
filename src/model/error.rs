//! Error and warning types.
//!
//! # Hierarchy
//!
//! - [`AppError`] - top-level failure of the binary (input, config, logging, output)
//!   - [`InputError`] - log file/stdin could not be opened or read
//! - [`LogWarning`] - non-fatal findings while analysing a log
//!
//! Nothing inside the analysis core returns an error. Malformed, truncated or
//! oddly ordered input produces [`LogWarning`]s that are collected in the
//! session metadata, and processing continues with the next line.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
///
/// All shell-side failures convert into this via `From`, so `main` can use `?`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Log input could not be opened or read.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Config file could not be read or parsed.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Diagnostic log could not be set up.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    /// Result could not be serialized.
    #[error("Failed to serialize result: {0}")]
    Output(#[from] serde_json::Error),

    /// Writing to stdout failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered when opening or reading log input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The log file path given on the command line does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use culling_log_parser::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound { path: PathBuf::from("/tmp/missing.log") };
    /// assert!(err.to_string().contains("/tmp/missing.log"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was attempted.
        path: PathBuf,
    },

    /// No file was given and stdin is an interactive terminal.
    #[error("No input source: provide a file path or pipe data to stdin")]
    NoInput,

    /// Any other I/O failure while opening or reading input.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ===== Warnings =====

/// Broad class of a [`LogWarning`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// Recognised module, payload of the wrong shape. The line is skipped.
    Structural,
    /// Well-formed value outside a closed set. A safe default is substituted.
    UnknownEnumeration,
    /// Odd but well-formed combination. Recorded only.
    PolicyAnomaly,
    /// Client API version findings.
    Version,
    /// Round lifecycle signals that were ignored.
    Lifecycle,
}

impl WarningCategory {
    /// Kebab-case name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::UnknownEnumeration => "unknown-enumeration",
            Self::PolicyAnomaly => "policy-anomaly",
            Self::Version => "version",
            Self::Lifecycle => "lifecycle",
        }
    }
}

/// A non-fatal finding while analysing a log.
///
/// The `Display` text doubles as the de-duplication key in the session's
/// warning log, so it carries the offending value but never a line number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogWarning {
    /// Damage payload of the wrong shape.
    #[error("Malformed damage line: {payload}")]
    MalformedDamage {
        /// Text after the module prefix.
        payload: String,
    },

    /// Server welcome missing the game-mode or map part.
    #[error("Server welcome did not match the expected format: {payload}")]
    MalformedWelcome {
        /// Text after the module prefix.
        payload: String,
    },

    /// `LogInit` API version that is not a number.
    #[error("Unparseable API version '{raw}'")]
    InvalidApiVersion {
        /// Version text as logged.
        raw: String,
    },

    /// Welcome named a mode with no mapping.
    #[error("Unknown game mode '{key}'")]
    UnknownGameMode {
        /// Blueprint key that had no mapping.
        key: String,
    },

    /// Region host fragment not recognised.
    #[error("Unknown region '{raw}'")]
    UnknownRegion {
        /// Host fragment as logged.
        raw: String,
    },

    /// RankScoring verb outside win/loss/kill/death.
    #[error("Unknown RankScoring value '{verb}'")]
    UnknownRankVerb {
        /// Verb as logged.
        verb: String,
    },

    /// Block percentage outside 25/50/100.
    #[error("Abnormal block value {percent}%")]
    AbnormalBlock {
        /// Logged percentage.
        percent: u32,
    },

    /// Backstab flag on a blocked hit.
    #[error("Backstab on a blocked hit")]
    BackstabWhileBlocked,

    /// Block on a hit beyond the AFK threshold.
    #[error("AFK-range hit was blocked")]
    AfkRangeWhileBlocked,

    /// API version with no known log layout.
    #[error("API version {version} has not been tested")]
    UntestedApiVersion {
        /// Version as logged.
        version: u32,
    },

    /// Clients older than 93315 miss kill and death lines.
    #[error("API version {version} does not reliably log kills and deaths")]
    UnreliableKillTracking {
        /// Version as logged.
        version: u32,
    },

    /// A later `LogInit` announced a different version.
    #[error("API version changed from {first} to {seen} within one log")]
    ApiVersionMismatch {
        /// Version kept for the session.
        first: u32,
        /// Later version that differed.
        seen: u32,
    },

    /// Score event while the mode is unknown or a bot game.
    #[error("Ignored RankScoring {kind} outside a recognized game mode ({mode})")]
    ScoreOutsideKnownMode {
        /// RankScoring verb.
        kind: String,
        /// Mode of the current round.
        mode: String,
    },

    /// Game start while a round was already open.
    #[error("Game start signalled while a round was already in progress")]
    GameStartDuringRound,
}

impl LogWarning {
    /// Class this warning belongs to.
    pub fn category(&self) -> WarningCategory {
        match self {
            Self::MalformedDamage { .. }
            | Self::MalformedWelcome { .. }
            | Self::InvalidApiVersion { .. } => WarningCategory::Structural,
            Self::UnknownGameMode { .. }
            | Self::UnknownRegion { .. }
            | Self::UnknownRankVerb { .. }
            | Self::AbnormalBlock { .. } => WarningCategory::UnknownEnumeration,
            Self::BackstabWhileBlocked | Self::AfkRangeWhileBlocked => {
                WarningCategory::PolicyAnomaly
            }
            Self::UntestedApiVersion { .. }
            | Self::UnreliableKillTracking { .. }
            | Self::ApiVersionMismatch { .. } => WarningCategory::Version,
            Self::ScoreOutsideKnownMode { .. } | Self::GameStartDuringRound => {
                WarningCategory::Lifecycle
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn input_error_file_not_found_display() {
        let err = InputError::FileNotFound {
            path: PathBuf::from("/tmp/missing.log"),
        };
        let msg = err.to_string();
        assert!(msg.contains("File not found"));
        assert!(msg.contains("/tmp/missing.log"));
    }

    #[test]
    fn input_error_no_input_display() {
        let msg = InputError::NoInput.to_string();
        assert!(msg.contains("No input source"));
        assert!(msg.contains("file path or pipe data to stdin"));
    }

    #[test]
    fn input_error_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let input_err: InputError = io_err.into();
        let msg = input_err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn app_error_from_input_error() {
        let app_err: AppError = InputError::NoInput.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("No input source"));
    }

    #[test]
    fn app_error_nested_io_through_input_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let input_err: InputError = io_err.into();
        let app_err: AppError = input_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Failed to read input"));
        assert!(msg.contains("IO error"));
    }

    #[test]
    fn abnormal_block_message_carries_percent() {
        let warning = LogWarning::AbnormalBlock { percent: 37 };
        assert_eq!(warning.to_string(), "Abnormal block value 37%");
        assert_eq!(warning.category(), WarningCategory::UnknownEnumeration);
    }

    #[test]
    fn policy_anomalies_are_categorised() {
        assert_eq!(
            LogWarning::BackstabWhileBlocked.category(),
            WarningCategory::PolicyAnomaly
        );
        assert_eq!(
            LogWarning::AfkRangeWhileBlocked.category(),
            WarningCategory::PolicyAnomaly
        );
    }

    #[test]
    fn structural_mismatch_is_categorised() {
        let warning = LogWarning::MalformedDamage {
            payload: "You hit nobody".to_string(),
        };
        assert_eq!(warning.category(), WarningCategory::Structural);
        assert!(warning.to_string().contains("You hit nobody"));
    }

    #[test]
    fn version_warnings_are_categorised() {
        let warning = LogWarning::ApiVersionMismatch {
            first: 93315,
            seen: 95121,
        };
        assert_eq!(warning.category(), WarningCategory::Version);
        assert!(warning.to_string().contains("93315"));
        assert!(warning.to_string().contains("95121"));
    }
}
