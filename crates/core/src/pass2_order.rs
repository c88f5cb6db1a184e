//! Pass 2: order assemblies so every referenced assembly precedes the
//! assemblies that reference it.
//!
//! Depth-first post-order over the reference graph, starting from each
//! assembly in declaration order. Edges that close a cycle are skipped, so
//! a cyclic catalog still yields a complete ordering; the cycle itself is
//! reported later by the passes that walk it.

use crate::catalog::Catalog;

/// Catalog indices in dependency order. Each index appears exactly once.
pub fn dependency_order(catalog: &Catalog) -> Vec<usize> {
    let mut visited = vec![false; catalog.len()];
    let mut in_path = vec![false; catalog.len()];
    let mut order = Vec::with_capacity(catalog.len());
    for idx in 0..catalog.len() {
        if !visited[idx] {
            visit(catalog, idx, &mut visited, &mut in_path, &mut order);
        }
    }
    tracing::debug!(
        order = ?order
            .iter()
            .filter_map(|&i| catalog.get(i).map(|a| a.id.as_str()))
            .collect::<Vec<_>>(),
        "dependency order"
    );
    order
}

fn visit(
    catalog: &Catalog,
    idx: usize,
    visited: &mut [bool],
    in_path: &mut [bool],
    order: &mut Vec<usize>,
) {
    in_path[idx] = true;
    if let Some(assembly) = catalog.get(idx) {
        for spec in assembly.references() {
            let Some(dep) = catalog.resolve(spec) else {
                continue;
            };
            if in_path[dep] || visited[dep] {
                continue;
            }
            visit(catalog, dep, visited, in_path, order);
        }
    }
    in_path[idx] = false;
    visited[idx] = true;
    order.push(idx);
}
