//! Priority words to TickTick priority levels and back.

use crate::error::{Error, Result};

/// Priority levels as the TickTick Open API encodes them.
pub const PRIORITY_NONE: i32 = 0;
pub const PRIORITY_LOW: i32 = 1;
pub const PRIORITY_MEDIUM: i32 = 3;
pub const PRIORITY_HIGH: i32 = 5;

/// Parse a priority word (`none`, `low`, `medium`/`med`, `high`) or its numeric level.
///
/// Matching is exact: no case folding and no trimming.
pub fn parse_priority(word: &str) -> Result<i32> {
    match word {
        "none" | "0" => Ok(PRIORITY_NONE),
        "low" | "1" => Ok(PRIORITY_LOW),
        "medium" | "med" | "3" => Ok(PRIORITY_MEDIUM),
        "high" | "5" => Ok(PRIORITY_HIGH),
        _ => Err(Error::InvalidPriority(word.to_string())),
    }
}

/// Canonical word for a priority level; unknown levels render as `unknown(<n>)`.
pub fn priority_label(level: i32) -> String {
    match level {
        PRIORITY_NONE => "none".to_string(),
        PRIORITY_LOW => "low".to_string(),
        PRIORITY_MEDIUM => "medium".to_string(),
        PRIORITY_HIGH => "high".to_string(),
        other => format!("unknown({})", other),
    }
}
