pub mod attempt;
pub mod corpus;
pub mod crack_log;
pub mod engine;
pub mod export;
pub mod interrupt;
pub mod io;
pub mod mode;
pub mod pending;
pub mod pot;
pub mod report;
pub mod stats;
pub mod tool;

pub mod prelude {
    pub use crate::crack_log::{CrackLog, LogEntry};
    pub use crate::engine::{Engine, ModeOutcome, RunSummary};
    pub use crate::mode::Mode;
    pub use crate::tool::{CrackTool, Hashcat};
}
