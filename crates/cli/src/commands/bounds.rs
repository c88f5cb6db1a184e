use std::path::Path;
use std::process;

use blockaid_core::{AssemblySummary, Config, Diagnostic, FileSystemProvider};
use serde::Serialize;

use crate::OutputFormat;

#[derive(Serialize)]
struct BoundsReport {
    assemblies: Vec<AssemblySummary>,
    diagnostics: Vec<Diagnostic>,
}

pub(crate) fn cmd_bounds(file: &Path, config: &Config, output: OutputFormat, quiet: bool) {
    let (catalog, diagnostics) =
        match blockaid_core::build_catalog(file, &FileSystemProvider, config) {
            Ok(built) => built,
            Err(e) => {
                crate::report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        };

    let report = BoundsReport {
        assemblies: catalog.summaries(),
        diagnostics,
    };

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for a in &report.assemblies {
                println!("{}", format_summary(a));
            }
            if !quiet {
                for d in &report.diagnostics {
                    eprintln!("warning: {}", d);
                }
            }
        }
    }
}

fn format_summary(a: &AssemblySummary) -> String {
    let bounds = match (a.bounds_min, a.bounds_max) {
        (Some(lo), Some(hi)) => format!(
            "XB={},{},{},{},{},{}",
            lo[0], hi[0], lo[1], hi[1], lo[2], hi[2]
        ),
        _ => "no geometry".to_string(),
    };
    let mut line = format!(
        "{} ({}:{}) origin={},{},{} {} size={},{},{}",
        a.id,
        a.file,
        a.line,
        a.origin[0],
        a.origin[1],
        a.origin[2],
        bounds,
        a.size[0],
        a.size[1],
        a.size[2]
    );
    if let Some(hi) = a.extent_max {
        line.push_str(&format!(" solids_max={},{},{}", hi[0], hi[1], hi[2]));
    }
    if !a.references.is_empty() {
        line.push_str(&format!(" refs=[{}]", a.references.join(", ")));
    }
    line
}
