use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process;

use blockaid_core::{Config, FileSystemProvider};

use crate::OutputFormat;

pub(crate) fn cmd_expand(
    file: &Path,
    out: Option<&Path>,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) {
    let mut sink: Box<dyn Write> = match out {
        Some(path) => match File::create(path) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => {
                let msg = format!("could not create '{}': {}", path.display(), e);
                crate::report_error(&msg, output, quiet);
                process::exit(1);
            }
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let report =
        match blockaid_core::process_file_with(file, &FileSystemProvider, config, sink.as_mut()) {
            Ok(report) => report,
            Err(e) => {
                crate::report_error(&e.to_string(), output, quiet);
                process::exit(1);
            }
        };
    drop(sink);

    match output {
        OutputFormat::Json => {
            let pretty = serde_json::to_string_pretty(&report.to_json_value())
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            eprintln!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet && !report.unused.is_empty() {
                eprintln!("unused assemblies: {}", report.unused.join(", "));
            }
        }
    }
}
