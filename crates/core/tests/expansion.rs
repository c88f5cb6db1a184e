//! End-to-end expansion through the in-memory source provider.

use approx::assert_relative_eq;
use blockaid_core::{
    build_catalog, dependency_order, process_file_with, scan_catalog_with_provider, Config,
    Diagnostic, InMemoryProvider, Report,
};
use std::path::Path;

const ROOT: &str = "/case/room.fds";

fn quiet() -> Config {
    Config {
        banners: false,
        ..Config::default()
    }
}

fn expand(files: &[(&str, &str)], config: &Config) -> (String, Report) {
    let provider = InMemoryProvider::from_pairs(files.iter().copied());
    let mut out = Vec::new();
    let report = process_file_with(Path::new(files[0].0), &provider, config, &mut out)
        .unwrap_or_else(|e| panic!("expansion failed: {}", e));
    (String::from_utf8(out).unwrap(), report)
}

fn obst_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|l| l.starts_with("&OBST")).collect()
}

const DESK: &str = "&BGRP ID='desk' ORIG=0,0,0 /\n\
                    &OBST XB=0,1.5,0,0.75,0.7,0.75 SURF_ID='WOOD' /\n\
                    &OBST XB=0,0.1,0,0.1,0,0.7 /\n\
                    &EGRP /\n";

#[test]
fn identity_reference_reproduces_geometry() {
    let src = format!("{}&GRP GRP_ID='desk' /\n", DESK);
    let (text, report) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(
        obst_lines(&text),
        vec![
            "&OBST XB=0.0,1.5,0.0,0.75,0.7,0.75 SURF_ID='WOOD' /",
            "&OBST XB=0.0,0.1,0.0,0.1,0.0,0.7 /",
        ]
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn translation_moves_only_x() {
    let src = format!("{}&GRP GRP_ID='desk' XYZ=5,0,0 /\n", DESK);
    let (text, _) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(
        obst_lines(&text),
        vec![
            "&OBST XB=5.0,6.5,0.0,0.75,0.7,0.75 SURF_ID='WOOD' /",
            "&OBST XB=5.0,5.1,0.0,0.1,0.0,0.7 /",
        ]
    );
}

#[test]
fn flat_assembly_bounds_are_the_box_extremes() {
    let provider = InMemoryProvider::from_pairs([(ROOT, DESK)]);
    let (catalog, diags) = build_catalog(Path::new(ROOT), &provider, &Config::default()).unwrap();
    assert!(diags.is_empty());
    let desk = catalog.by_id("desk").unwrap();
    assert_eq!(
        desk.bounds.unwrap().to_xb(),
        [0.0, 1.5, 0.0, 0.75, 0.0, 0.75]
    );
}

#[test]
fn oblique_rotation_bounds() {
    let src = "&BGRP ID='room' ORIG=0,0,0 /\n\
               &GRP GRP_ID='bench' ROTATE=45 /\n\
               &EGRP /\n\
               &BGRP ID='bench' ORIG=0,0,0 /\n\
               &OBST XB=0,2,0,1,0,0.5 /\n\
               &EGRP /\n";
    let provider = InMemoryProvider::from_pairs([(ROOT, src)]);
    let (catalog, _) = build_catalog(Path::new(ROOT), &provider, &Config::default()).unwrap();
    let b = catalog.by_id("room").unwrap().bounds.unwrap();
    let diag = 1.5 * std::f64::consts::SQRT_2;
    assert_relative_eq!(b.min.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(b.min.y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(b.max.x, diag, epsilon = 1e-12);
    assert_relative_eq!(b.max.y, diag, epsilon = 1e-12);
    assert_relative_eq!(b.max.z, 0.5);
}

#[test]
fn cycles_terminate_with_a_diagnostic() {
    let src = "&BGRP ID='A' /\n\
               &OBST XB=0,1,0,1,0,1 /\n\
               &GRP GRP_ID='B' XYZ=1,0,0 /\n\
               &EGRP /\n\
               &BGRP ID='B' /\n\
               &GRP GRP_ID='A' XYZ=1,0,0 /\n\
               &EGRP /\n\
               &GRP GRP_ID='A' /\n";
    let (text, report) = expand(&[(ROOT, src)], &quiet());
    assert!(text.contains("are defined circularly"));
    assert_eq!(obst_lines(&text).len(), 1);
    assert!(report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::CircularReference { .. })));
    assert!(!report
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::RecursionLimit { .. })));
}

#[test]
fn missing_reference_leaves_other_lines_alone() {
    let src = format!(
        "&HEAD CHID='room' /\n{}&GRP GRP_ID='sofa' XYZ=1,1,0 /\n&GRP GRP_ID='desk' /\n&TAIL /\n",
        DESK
    );
    let (text, report) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(text.matches("is not defined").count(), 1);
    assert_eq!(obst_lines(&text).len(), 2);
    assert!(text.starts_with("&HEAD CHID='room' /\n"));
    assert!(text.ends_with("&TAIL /\n"));
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::UndefinedAssembly {
            id: "sofa".to_string()
        }]
    );
}

#[test]
fn referenced_assembly_is_ordered_first() {
    let src = "&BGRP ID='A' /\n&GRP GRP_ID='B' /\n&EGRP /\n\
               &BGRP ID='C' /\n&EGRP /\n\
               &BGRP ID='B' /\n&OBST XB=0,1,0,1,0,1 /\n&EGRP /\n";
    let provider = InMemoryProvider::from_pairs([(ROOT, src)]);
    let (catalog, _) =
        scan_catalog_with_provider(Path::new(ROOT), &provider, &Config::default()).unwrap();
    let order = dependency_order(&catalog);
    let pos = |id: &str| {
        let idx = catalog.find(id).unwrap();
        order.iter().position(|&i| i == idx).unwrap()
    };
    assert!(pos("B") < pos("A"));
    assert_eq!(order.len(), 3);
}

#[test]
fn include_chain_stops_at_the_depth_bound() {
    let files: Vec<(String, String)> = (0..12)
        .map(|i| {
            (
                format!("/inc/f{}.fds", i),
                format!(
                    "&BGRP ID='A{}' /\n&EGRP /\n&INCL FILE='f{}.fds' /\n",
                    i,
                    i + 1
                ),
            )
        })
        .collect();
    let provider =
        InMemoryProvider::from_pairs(files.iter().map(|(p, s)| (p.as_str(), s.as_str())));
    let (catalog, diags) =
        scan_catalog_with_provider(Path::new("/inc/f0.fds"), &provider, &Config::default())
            .unwrap();
    assert!(diags.is_empty());
    assert_eq!(catalog.len(), 11);
    assert!(catalog.by_id("A10").is_some());
    assert!(catalog.by_id("A11").is_none());
}

#[test]
fn nested_groups_print_banners() {
    let src = "&BGRP ID='room' ORIG=0,0,0 /\n\
               &GRP GRP_ID='desk' XYZ=2,0,0 /\n\
               &EGRP /\n\
               &BGRP ID='desk' ORIG=0,0,0 /\n\
               &OBST XB=0,1,0,1,0,1 /\n\
               &EGRP /\n\
               &GRP GRP_ID='room' XYZ=10,0,0 /\n";
    let (text, report) = expand(&[(ROOT, src)], &Config::default());
    assert!(text.contains(" MAJOR GROUP: room "));
    assert!(text.contains("   MINOR GROUP: desk "));
    assert_eq!(obst_lines(&text), vec!["&OBST XB=12.0,13.0,0.0,1.0,0.0,1.0 /"]);
    assert!(report.unused.is_empty());
}

const BENCH: &str = "&BGRP ID='bench' ORIG=0,0,0 /\n\
                     &OBST XB=0,2,0,1,0,1 /\n\
                     &EGRP /\n";

#[test]
fn quarter_turn_then_offset() {
    let src = format!("{}&GRP GRP_ID='bench' XYZ=10,0,0 ROTATE=90 /\n", BENCH);
    let (text, report) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(obst_lines(&text), vec!["&OBST XB=10.0,11.0,0.0,2.0,0.0,1.0 /"]);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn rotated_parent_carries_rotated_child() {
    // room: a 3x1 table along x with the bench turned upright beside it
    let src = format!(
        "{}&BGRP ID='room' ORIG=0,0,0 /\n\
         &OBST XB=0,3,0,1,0,1 /\n\
         &GRP GRP_ID='bench' XYZ=0,1,0 ROTATE=90 /\n\
         &EGRP /\n\
         &GRP GRP_ID='room' XYZ=10,0,0 ROTATE=90 /\n",
        BENCH
    );
    let (text, report) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(
        obst_lines(&text),
        vec![
            "&OBST XB=12.0,13.0,0.0,3.0,0.0,1.0 /",
            "&OBST XB=10.0,12.0,0.0,1.0,0.0,1.0 /",
        ]
    );
    assert!(report.diagnostics.is_empty());
    let room = report.assemblies.iter().find(|a| a.id == "room").unwrap();
    assert_eq!(room.bounds_max, Some([3.0, 3.0, 1.0]));
}

#[test]
fn short_offset_still_translates() {
    let src = format!("{}&GRP GRP_ID='bench' XYZ=5,0 /\n", BENCH);
    let (text, _) = expand(&[(ROOT, src.as_str())], &quiet());
    assert_eq!(obst_lines(&text), vec!["&OBST XB=5.0,7.0,0.0,1.0,0.0,1.0 /"]);
}
