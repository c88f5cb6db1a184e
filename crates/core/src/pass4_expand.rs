//! Pass 4: expand one `&GRP` instantiation into flat geometry records.
//!
//! Nested references recurse with one [`Frame`] pushed per level. A geometry
//! record found at depth `d` is carried through frames `d..=0`, innermost
//! first, and written back with its own text around the new `XB`.

use crate::catalog::{Catalog, MemberKind, ReferenceSpec};
use crate::config::Config;
use crate::error::{AidError, Diagnostic};
use crate::geometry::{compose, Frame};
use std::collections::BTreeSet;
use std::io::Write;

/// Deepest banner indentation, in two-space steps.
const MAX_INDENT: usize = 4;

pub struct Expander<'a> {
    catalog: &'a Catalog,
    config: &'a Config,
    out: &'a mut dyn Write,
    frames: Vec<Frame>,
    chain: Vec<usize>,
    used: BTreeSet<usize>,
    diagnostics: Vec<Diagnostic>,
}

/// What an expander leaves behind once its output is written.
#[derive(Debug, Default)]
pub struct ExpandOutcome {
    /// Catalog indices of every assembly instantiated at least once.
    pub used: BTreeSet<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a Config, out: &'a mut dyn Write) -> Self {
        Expander {
            catalog,
            config,
            out,
            frames: Vec::new(),
            chain: Vec::new(),
            used: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Expand a top-level `&GRP` record.
    pub fn expand_line(&mut self, line: &str) -> Result<(), AidError> {
        self.expand(&ReferenceSpec::parse(line), 0)
    }

    /// Copy a record to the output unchanged.
    pub fn passthrough(&mut self, line: &str) -> Result<(), AidError> {
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    pub fn finish(self) -> ExpandOutcome {
        ExpandOutcome {
            used: self.used,
            diagnostics: self.diagnostics,
        }
    }

    fn expand(&mut self, spec: &ReferenceSpec, depth: usize) -> Result<(), AidError> {
        let catalog = self.catalog;
        if depth >= self.config.max_recursion_depth {
            return self.report(Diagnostic::RecursionLimit {
                limit: self.config.max_recursion_depth,
                id: spec.target_label().to_string(),
            });
        }
        let Some(idx) = catalog.resolve(spec) else {
            return self.report(Diagnostic::UndefinedAssembly {
                id: spec.target_label().to_string(),
            });
        };
        let Some(assembly) = catalog.get(idx) else {
            return Ok(());
        };
        if self.chain.contains(&idx) {
            let mut chain: Vec<String> = self
                .chain
                .iter()
                .filter_map(|&i| catalog.get(i).map(|a| a.id.clone()))
                .collect();
            chain.push(assembly.id.clone());
            return self.report(Diagnostic::CircularReference { chain });
        }

        self.used.insert(idx);
        if self.config.banners {
            self.banner(&assembly.id, spec, depth)?;
        }

        // Frames deeper than this level belong to calls that have returned.
        self.frames.truncate(depth);
        self.frames.push(Frame {
            offset: spec.offset,
            rotate: spec.rotate,
            origin: assembly.origin,
            pivot: assembly.bounds_size(),
        });
        self.chain.push(idx);

        let mut result = Ok(());
        for member in &assembly.members {
            result = match &member.kind {
                MemberKind::Geometry { xbox, .. } => {
                    let placed = compose(&self.frames, xbox);
                    writeln!(self.out, "{}", member.with_box(&placed)).map_err(AidError::from)
                }
                MemberKind::Reference(nested) => self.expand(nested, depth + 1),
                MemberKind::Other => Ok(()),
            };
            if result.is_err() {
                break;
            }
        }

        self.chain.pop();
        self.frames.truncate(depth);
        result
    }

    fn banner(&mut self, id: &str, spec: &ReferenceSpec, depth: usize) -> Result<(), AidError> {
        let (label, indent) = if depth == 0 {
            ("MAJOR GROUP", String::new())
        } else {
            ("MINOR GROUP", "  ".repeat(depth.min(MAX_INDENT)))
        };
        writeln!(
            self.out,
            "\n{} {}: {} offset={:.6},{:.6},{:.6} rotate={:.6}",
            indent, label, id, spec.offset.x, spec.offset.y, spec.offset.z, spec.rotate
        )?;
        Ok(())
    }

    /// Write a diagnostic into the output stream and keep it for the report.
    fn report(&mut self, diag: Diagnostic) -> Result<(), AidError> {
        tracing::warn!("{}", diag);
        writeln!(self.out, "{}", diag.render())?;
        self.diagnostics.push(diag);
        Ok(())
    }
}
