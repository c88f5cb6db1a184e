//! Pass 3: bounding boxes.
//!
//! Each assembly's box is the union of its geometry and of every nested
//! assembly's geometry carried through the nested instantiation frames, in
//! the assembly's own declared coordinates. Assemblies are processed in
//! dependency order so a nested assembly's size is known before it is used
//! as a rotation pivot.

use crate::catalog::{Catalog, MemberKind};
use crate::config::Config;
use crate::error::Diagnostic;
use crate::geometry::{compose, Frame, XBox};

/// Compute and store the bounds of every assembly in `order`.
pub fn compute_bounds(catalog: &mut Catalog, order: &[usize], config: &Config) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for &idx in order {
        let mut walk = BoundsWalk {
            catalog,
            max_depth: config.max_recursion_depth,
            frames: Vec::new(),
            chain: vec![idx],
            acc: None,
            diagnostics: &mut diagnostics,
        };
        walk.visit(idx, 0);
        let bounds = walk.acc;
        catalog.set_bounds(idx, bounds);

        if let Some(a) = catalog.get(idx) {
            match bounds {
                Some(b) => tracing::info!(
                    assembly = %a.id,
                    "bounds=({},{}), ({},{}), ({},{})",
                    b.min.x, b.max.x, b.min.y, b.max.y, b.min.z, b.max.z
                ),
                None => tracing::info!(assembly = %a.id, "no geometry"),
            }
        }
    }
    diagnostics
}

struct BoundsWalk<'a> {
    catalog: &'a Catalog,
    max_depth: usize,
    /// Frames for nesting levels 1..=depth; the root level is identity.
    frames: Vec<Frame>,
    /// Catalog indices of the assemblies active on the current path.
    chain: Vec<usize>,
    acc: Option<XBox>,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl BoundsWalk<'_> {
    fn visit(&mut self, idx: usize, depth: usize) {
        let catalog = self.catalog;
        let Some(assembly) = catalog.get(idx) else {
            return;
        };
        if depth >= self.max_depth {
            self.report(Diagnostic::RecursionLimit {
                limit: self.max_depth,
                id: assembly.id.clone(),
            });
            return;
        }
        for member in &assembly.members {
            match &member.kind {
                MemberKind::Geometry { xbox, .. } => {
                    let placed = compose(&self.frames, xbox);
                    self.acc = Some(match self.acc {
                        Some(acc) => acc.union(&placed),
                        None => placed,
                    });
                }
                MemberKind::Reference(spec) => {
                    let Some(target) = catalog.resolve(spec) else {
                        self.report(Diagnostic::UndefinedAssembly {
                            id: spec.target_label().to_string(),
                        });
                        continue;
                    };
                    if self.chain.contains(&target) {
                        let mut chain: Vec<String> = self
                            .chain
                            .iter()
                            .filter_map(|&i| catalog.get(i).map(|a| a.id.clone()))
                            .collect();
                        chain.push(spec.target_label().to_string());
                        self.report(Diagnostic::CircularReference { chain });
                        continue;
                    }
                    let Some(nested) = catalog.get(target) else {
                        continue;
                    };
                    self.frames.push(Frame {
                        offset: spec.offset,
                        rotate: spec.rotate,
                        origin: nested.origin,
                        pivot: nested.bounds_size(),
                    });
                    self.chain.push(target);
                    self.visit(target, depth + 1);
                    self.chain.pop();
                    self.frames.pop();
                }
                MemberKind::Other => {}
            }
        }
    }

    fn report(&mut self, diag: Diagnostic) {
        tracing::warn!("{}", diag);
        self.diagnostics.push(diag);
    }
}
