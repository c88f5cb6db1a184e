//! Pass 1: scan the input (and its `&INCL` files) into a [`Catalog`].
//!
//! Only the group structure is interpreted here. Records outside
//! `&BGRP`/`&EGRP` are ignored until Pass 5 rescans the root file.

use crate::catalog::{
    Assembly, Catalog, Member, Provenance, GROUP_BEGIN_TAG, GROUP_END_TAG, INCLUDE_TAG,
};
use crate::config::Config;
use crate::error::{AidError, Diagnostic};
use crate::fields;
use crate::reader::{self, has_tag};
use crate::source::{FileSystemProvider, SourceProvider};
use nalgebra::Point3;
use std::path::Path;

/// Scan `root` with the filesystem provider.
pub fn scan_catalog(root: &Path, config: &Config) -> Result<(Catalog, Vec<Diagnostic>), AidError> {
    scan_catalog_with_provider(root, &FileSystemProvider, config)
}

/// Scan `root` and everything it includes, returning the frozen catalog and
/// any diagnostics for includes that could not be read.
///
/// Failing to read `root` itself is an error; an unreadable include is
/// reported and skipped.
pub fn scan_catalog_with_provider(
    root: &Path,
    provider: &dyn SourceProvider,
    config: &Config,
) -> Result<(Catalog, Vec<Diagnostic>), AidError> {
    let mut catalog = Catalog::new();
    let mut diagnostics = Vec::new();
    let mut scan = Scan {
        provider,
        config,
        catalog: &mut catalog,
        diagnostics: &mut diagnostics,
    };
    scan.file(root, 0)?;
    catalog.freeze();
    tracing::debug!(assemblies = catalog.len(), "pass 1 complete");
    Ok((catalog, diagnostics))
}

struct Scan<'a> {
    provider: &'a dyn SourceProvider,
    config: &'a Config,
    catalog: &'a mut Catalog,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl Scan<'_> {
    fn file(&mut self, path: &Path, depth: usize) -> Result<(), AidError> {
        let src = self
            .provider
            .read_source(path)
            .map_err(|source| AidError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let file = path.to_string_lossy().to_string();
        let records = reader::read_records(&src, &file, self.config.max_record_length)?;
        tracing::debug!(file = %file, depth, records = records.len(), "scanning");

        let base = path.parent().unwrap_or(Path::new("."));
        // Index of the assembly currently open in this file.
        let mut open: Option<usize> = None;

        for rec in records {
            let prov = Provenance {
                file: file.clone(),
                line: rec.line,
            };
            if has_tag(&rec.text, GROUP_BEGIN_TAG) {
                open = Some(self.catalog.push(begin_assembly(&rec.text, prov)));
                continue;
            }
            if has_tag(&rec.text, GROUP_END_TAG) {
                open = None;
                continue;
            }
            if has_tag(&rec.text, INCLUDE_TAG) {
                self.include(&rec.text, base, depth, &prov)?;
                continue;
            }
            if let Some(idx) = open {
                if let Some(assembly) = self.catalog.get_mut(idx) {
                    assembly.push_member(Member::classify(rec.text, prov));
                }
            }
        }
        Ok(())
    }

    fn include(
        &mut self,
        text: &str,
        base: &Path,
        depth: usize,
        prov: &Provenance,
    ) -> Result<(), AidError> {
        let Some(name) = fields::key_text(text, "FILE") else {
            tracing::warn!(file = %prov.file, line = prov.line, "&INCL without FILE is ignored");
            return Ok(());
        };
        if depth >= self.config.max_include_depth {
            tracing::warn!(
                file = %prov.file,
                line = prov.line,
                include = %name,
                limit = self.config.max_include_depth,
                "include depth limit reached; not following"
            );
            return Ok(());
        }
        let target = self.provider.resolve_include(base, &name);
        match self.file(&target, depth + 1) {
            Err(AidError::Unreadable { path, source }) => {
                let diag = Diagnostic::UnreadableInclude {
                    path: path.to_string_lossy().to_string(),
                    message: source.to_string(),
                };
                tracing::warn!(file = %prov.file, line = prov.line, "{}", diag);
                self.diagnostics.push(diag);
                Ok(())
            }
            other => other,
        }
    }
}

fn begin_assembly(text: &str, prov: Provenance) -> Assembly {
    let id = fields::key_text(text, "ID")
        .or_else(|| fields::key_text(text, "GRP_ID"))
        .unwrap_or_else(|| {
            tracing::warn!(file = %prov.file, line = prov.line, "&BGRP without an id");
            String::new()
        });
    let origin = fields::key_array::<3>(text, "ORIG").map(|(o, _)| Point3::from(o));
    Assembly::new(id, origin, prov)
}
