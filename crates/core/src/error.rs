//! Error and diagnostic types.
//!
//! [`AidError`] aborts a whole operation (the file cannot be read, a record
//! is malformed, the output stream failed). [`Diagnostic`] is the non-fatal
//! kind: it stops one recursive branch and the rest of the run proceeds.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A failure that stops the current operation.
#[derive(Debug, thiserror::Error)]
pub enum AidError {
    /// The file could not be opened or read.
    #[error("the file {} could not be opened: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A logical record grew beyond the configured length limit.
    #[error("{file}:{line}: record exceeds {limit} characters")]
    RecordTooLong {
        file: String,
        line: u32,
        limit: usize,
    },

    /// A `&` record reached end of input without its `/` terminator.
    #[error("{file}:{line}: record is never terminated by '/'")]
    UnterminatedRecord { file: String, line: u32 },

    /// Writing the expanded text failed.
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// A non-fatal problem confined to one branch of the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A reference names an assembly that was never declared.
    UndefinedAssembly { id: String },
    /// A reference chain revisits an assembly that is already active.
    /// The last element is the id that closed the loop.
    CircularReference { chain: Vec<String> },
    /// Nesting went deeper than the configured maximum.
    RecursionLimit { limit: usize, id: String },
    /// An `&INCL` target could not be read during the scan.
    UnreadableInclude { path: String, message: String },
}

impl Diagnostic {
    /// Multi-line warning block in the style written to the output stream.
    pub fn render(&self) -> String {
        match self {
            Diagnostic::UndefinedAssembly { id } => format!(
                " **** warning ****\n      The blockage assembly, {}, is not defined\n",
                id
            ),
            Diagnostic::CircularReference { chain } => format!(
                " **** warning ****\n      Block definitions with Id's:\n {}\n are defined circularly.  Their expansion is halted\n **** warning ****",
                chain.join(", ")
            ),
            Diagnostic::RecursionLimit { limit, .. } => format!(
                " *** Fatal error:  recursion level must be less than {}",
                limit
            ),
            Diagnostic::UnreadableInclude { path, .. } => {
                format!("The file: {} could not be opened", path)
            }
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UndefinedAssembly { id } => {
                write!(f, "assembly '{}' is not defined", id)
            }
            Diagnostic::CircularReference { chain } => {
                write!(f, "circular assembly reference: {}", chain.join(" \u{2192} "))
            }
            Diagnostic::RecursionLimit { limit, id } => write!(
                f,
                "recursion depth limit {} reached while expanding '{}'",
                limit, id
            ),
            Diagnostic::UnreadableInclude { path, message } => {
                write!(f, "cannot read included file '{}': {}", path, message)
            }
        }
    }
}
