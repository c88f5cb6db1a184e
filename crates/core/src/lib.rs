//! blockaid-core: assembly expansion for FDS input files.
//!
//! `&BGRP ... &EGRP` blocks declare named assemblies of `&OBST`, `&HOLE` and
//! `&VENT` boxes and of nested `&GRP` references. Every top-level `&GRP`
//! record in the input is replaced by the flattened, translated and rotated
//! geometry of the assembly it names.
//!
//! # Pipeline
//!
//! 1. [`pass1_scan`] builds the [`Catalog`] from the root file and its includes.
//! 2. [`pass2_order`] orders assemblies so referenced ones come first.
//! 3. [`pass3_bounds`] computes each assembly's bounding box.
//! 4. [`pass4_expand`] expands one `&GRP` instantiation.
//! 5. [`pass5_emit`] rescans the root and writes the expanded text.
//!
//! [`process_file()`] runs all five; [`build_catalog()`] stops after Pass 3.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod geometry;
pub mod pass1_scan;
pub mod pass2_order;
pub mod pass3_bounds;
pub mod pass4_expand;
pub mod pass5_emit;
pub mod process;
pub mod reader;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use catalog::{Assembly, AssemblySummary, Catalog, Member, MemberKind, ReferenceSpec};
pub use config::Config;
pub use error::{AidError, Diagnostic};
pub use geometry::{Frame, XBox};
pub use process::Report;
pub use source::{FileSystemProvider, InMemoryProvider, SourceProvider};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use pass1_scan::{scan_catalog, scan_catalog_with_provider};
pub use pass2_order::dependency_order;
pub use pass3_bounds::compute_bounds;
pub use pass4_expand::Expander;
pub use pass5_emit::emit;
pub use process::{build_catalog, process_file, process_file_with};
