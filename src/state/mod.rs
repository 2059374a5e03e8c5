//! Analysis state machines (pure apart from tracing).
//!
//! The round lifecycle and the session orchestrator that drives it. Both
//! consume already-extracted events and are testable without I/O.

pub mod round;
pub mod session;

// Re-export for convenience
pub use round::{transition, RoundAccumulator, RoundEffect, RoundState};
pub use session::{
    analyze_lines, analyze_str, SessionOrchestrator, MIN_RELIABLE_KILL_API_VERSION,
    TESTED_API_VERSIONS,
};
