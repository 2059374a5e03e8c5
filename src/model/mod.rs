//! Domain model types (pure).
//!
//! Events, damage aggregation, rounds and session results. No I/O here.

pub mod damage;
pub mod error;
pub mod event;
pub mod round;
pub mod session;
pub mod snapshot;

// Re-export for convenience
pub use damage::{DamageStat, DamageSummary, DealtReceived};
pub use error::{AppError, InputError, LogWarning, WarningCategory};
pub use event::{
    DamageCategory, DamageInstance, DamageSide, Event, GameMode, GameType, RankKind, Region,
    VersionInfo,
};
pub use round::{AttributedDamage, Round, RoundId};
pub use session::{
    GlobalSummary, PlayerRecord, SessionMetadata, SessionResult, WarningLog, WarningRecord,
};
pub use snapshot::SessionSnapshot;
