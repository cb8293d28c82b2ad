pub mod parser;
pub mod reader;
pub mod selector;

use serde::Serialize;

pub use reader::{read_window, LogReadError};
pub use selector::select_window;

// ─── Configuration ───────────────────────────────────────────────

/// Tail mode never looks further back than this many lines.
pub const TAIL_LINES: usize = 10_000;

/// Look-back horizon applied in tail mode.
pub const LOOK_BACK_MINUTES: i64 = 5;

// ─── Public types ────────────────────────────────────────────────

/// Which slice of the access log one refresh looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Last `TAIL_LINES` lines, only records inside the look-back horizon.
    Tail,
    /// The whole file, every parseable record regardless of age.
    FullFile,
}

impl WindowMode {
    pub fn from_full_log_flag(full_log: bool) -> Self {
        if full_log {
            Self::FullFile
        } else {
            Self::Tail
        }
    }

    /// Whether the selector applies the look-back cutoff.
    pub fn is_time_bounded(self) -> bool {
        matches!(self, Self::Tail)
    }
}
