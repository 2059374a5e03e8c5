//! Culling log parser
//!
//! Analyzes client logs of The Culling: per-round damage, wins and losses,
//! opponents met across rounds, and anomalies found along the way.
//!
//! Pure core: `model`, `parser`, `state`. Impure shell: `source`, `config`,
//! `logging` and the binary.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod source;
pub mod state;

// Source-to-result glue used by the binary
pub mod integration;

pub use config::ParserOptions;
pub use integration::{analyze_reader, analyze_source};
pub use state::{analyze_lines, analyze_str, SessionOrchestrator};

#[cfg(test)]
mod tests;
