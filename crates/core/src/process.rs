//! The "process file" operation: all five passes over one root file.
//!
//! Passes 1-3 build and annotate the catalog; Pass 5 rescans the root and
//! writes the expanded text, calling the Pass 4 expander for each top-level
//! `&GRP` record.

use crate::catalog::{AssemblySummary, Catalog};
use crate::config::Config;
use crate::error::{AidError, Diagnostic};
use crate::pass1_scan;
use crate::pass2_order;
use crate::pass3_bounds;
use crate::pass5_emit;
use crate::source::{FileSystemProvider, SourceProvider};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// What a completed run produced besides the expanded text.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub assemblies: Vec<AssemblySummary>,
    /// Scan, bounds and expansion diagnostics, in that order.
    pub diagnostics: Vec<Diagnostic>,
    /// Ids of assemblies that were declared but never instantiated.
    pub unused: Vec<String>,
}

impl Report {
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Passes 1-3: scan `root`, order the catalog and compute every bounding box.
pub fn build_catalog(
    root: &Path,
    provider: &dyn SourceProvider,
    config: &Config,
) -> Result<(Catalog, Vec<Diagnostic>), AidError> {
    let (mut catalog, mut diagnostics) =
        pass1_scan::scan_catalog_with_provider(root, provider, config)?;
    let order = pass2_order::dependency_order(&catalog);
    diagnostics.extend(pass3_bounds::compute_bounds(&mut catalog, &order, config));
    Ok((catalog, diagnostics))
}

/// Expand `root` from the filesystem with default settings.
pub fn process_file(root: &Path, out: &mut dyn Write) -> Result<Report, AidError> {
    process_file_with(root, &FileSystemProvider, &Config::default(), out)
}

/// Expand `root` and write the flattened text to `out`.
pub fn process_file_with(
    root: &Path,
    provider: &dyn SourceProvider,
    config: &Config,
    out: &mut dyn Write,
) -> Result<Report, AidError> {
    let (mut catalog, mut diagnostics) = build_catalog(root, provider, config)?;
    let outcome = pass5_emit::emit(root, provider, &mut catalog, config, out)?;
    out.flush()?;
    diagnostics.extend(outcome.diagnostics);

    let report = Report {
        assemblies: catalog.summaries(),
        diagnostics,
        unused: catalog.unused(),
    };
    tracing::debug!(
        assemblies = report.assemblies.len(),
        diagnostics = report.diagnostics.len(),
        unused = report.unused.len(),
        "processed {}",
        root.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryProvider;

    fn run(src: &str) -> (String, Report) {
        let provider = InMemoryProvider::from_pairs([("/case.fds", src)]);
        let config = Config {
            banners: false,
            ..Config::default()
        };
        let mut out = Vec::new();
        let report = process_file_with(Path::new("/case.fds"), &provider, &config, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), report)
    }

    #[test]
    fn group_definitions_are_replaced_by_instances() {
        let (text, report) = run(
            "&HEAD CHID='case' /\n\
             &BGRP ID='desk' ORIG=0,0,0 /\n\
             &OBST XB=0,1,0,1,0,1 /\n\
             &EGRP /\n\
             &GRP GRP_ID='desk' XYZ=5,0,0 /\n\
             &TAIL /\n",
        );
        assert_eq!(
            text,
            "&HEAD CHID='case' /\n&OBST XB=5.0,6.0,0.0,1.0,0.0,1.0 /\n&TAIL /\n"
        );
        assert!(report.diagnostics.is_empty());
        assert!(report.unused.is_empty());
        assert!(report.assemblies[0].in_use);
    }

    #[test]
    fn unused_assemblies_are_listed() {
        let (_, report) = run("&BGRP ID='spare' /\n&OBST XB=0,1,0,1,0,1 /\n&EGRP /\n");
        assert_eq!(report.unused, vec!["spare".to_string()]);
    }

    #[test]
    fn report_serializes_diagnostics_by_kind() {
        let (_, report) = run("&GRP GRP_ID='ghost' /\n");
        let json = report.to_json_value();
        assert_eq!(json["diagnostics"][0]["kind"], "undefined_assembly");
        assert_eq!(json["diagnostics"][0]["id"], "ghost");
    }

    #[test]
    fn missing_root_fails() {
        let provider = InMemoryProvider::new(std::collections::HashMap::new());
        let mut out = Vec::new();
        let err = process_file_with(
            Path::new("/absent.fds"),
            &provider,
            &Config::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, AidError::Unreadable { .. }));
        assert!(out.is_empty());
    }
}
