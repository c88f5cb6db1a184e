//! Pipeline limits and output switches.

use serde::{Deserialize, Serialize};

/// Default bound on assembly nesting during expansion and bounds walks.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 20;
/// Default bound on `&INCL` nesting.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;
/// Default bound on the length of one logical record.
pub const DEFAULT_MAX_RECORD_LENGTH: usize = 10_000;

/// Settings shared by every pass.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```toml
/// max_recursion_depth = 12
/// banners = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_recursion_depth: usize,
    pub max_include_depth: usize,
    pub max_record_length: usize,
    /// Write `MAJOR GROUP` / `MINOR GROUP` banners ahead of each expansion.
    pub banners: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_record_length: DEFAULT_MAX_RECORD_LENGTH,
            banners: true,
        }
    }
}
