//! Pass 5: rescan the root file and write the expanded text.
//!
//! Records between `&BGRP` and `&EGRP` are dropped (Pass 1 already holds
//! them), each top-level `&GRP` is replaced by its expansion, and every
//! other record is copied through unchanged.

use crate::catalog::{Catalog, GROUP_BEGIN_TAG, GROUP_END_TAG, REFERENCE_TAG};
use crate::config::Config;
use crate::error::AidError;
use crate::pass4_expand::{ExpandOutcome, Expander};
use crate::reader::{self, has_tag};
use crate::source::SourceProvider;
use std::io::Write;
use std::path::Path;

pub fn emit(
    path: &Path,
    provider: &dyn SourceProvider,
    catalog: &mut Catalog,
    config: &Config,
    out: &mut dyn Write,
) -> Result<ExpandOutcome, AidError> {
    let src = provider
        .read_source(path)
        .map_err(|source| AidError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
    let file = path.to_string_lossy();
    let records = reader::read_records(&src, &file, config.max_record_length)?;

    let mut expander = Expander::new(catalog, config, out);
    let mut in_group = false;
    let mut expanded = 0usize;
    for rec in &records {
        if has_tag(&rec.text, GROUP_BEGIN_TAG) {
            in_group = true;
        } else if has_tag(&rec.text, GROUP_END_TAG) {
            in_group = false;
        } else if in_group {
            continue;
        } else if has_tag(&rec.text, REFERENCE_TAG) {
            expander.expand_line(&rec.text)?;
            expanded += 1;
        } else {
            expander.passthrough(&rec.text)?;
        }
    }
    let outcome = expander.finish();
    tracing::debug!(
        file = %file,
        instantiations = expanded,
        assemblies_used = outcome.used.len(),
        "pass 5 complete"
    );

    catalog.mark_in_use(outcome.used.iter().copied());
    Ok(outcome)
}
