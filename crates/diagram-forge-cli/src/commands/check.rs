use diagram_forge_core::IntegrityIssue;
use diagram_forge_dsl::ParseDiagnostic;

use crate::cli::CheckArgs;
use crate::commands::{discover_diagram_files, parse_file, ParsedFile};
use crate::config::CliConfig;
use crate::diagnostic::{dsl_error_to_diagnostic, render_diagnostics};
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `check` command: parse every file and report what was skipped.
///
/// Without `--strict` only fatal errors fail the run. With it, recovered
/// syntax errors and integrity issues fail it too.
pub fn run(args: CheckArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let paths = config.input_paths(&args.paths);
    let files = discover_diagram_files(&paths, &config.cli.extension)?;
    let options = config.parse_options();

    let mut failed = 0usize;
    let mut total_tables = 0usize;
    let mut total_warnings = 0usize;
    let mut total_issues = 0usize;
    let mut results: Vec<serde_json::Value> = Vec::new();

    for file in &files {
        let filename = file.display().to_string();

        let parsed = match parse_file(file, &options) {
            Ok(parsed) => parsed,
            Err(CliError::Parse {
                error, source_text, ..
            }) => {
                failed += 1;
                match output.mode {
                    OutputMode::Human => {
                        let report = miette::Report::new(dsl_error_to_diagnostic(
                            &error,
                            &source_text,
                            &filename,
                        ));
                        eprintln!("{report:?}");
                    }
                    OutputMode::Json => results.push(serde_json::json!({
                        "file": filename,
                        "fatal": error.to_string(),
                    })),
                    OutputMode::Plain => eprintln!("{filename}\terror\t{error}"),
                }
                continue;
            }
            Err(other) => return Err(other),
        };

        let issues = parsed.output.diagram.integrity_issues();
        let warnings = &parsed.output.warnings;
        total_tables += parsed.output.diagram.tables.len();
        total_warnings += warnings.len();
        total_issues += issues.len();

        let file_failed = args.strict && (!warnings.is_empty() || !issues.is_empty());
        if file_failed {
            failed += 1;
        }

        match output.mode {
            OutputMode::Human => report_human(&parsed, &issues, output),
            OutputMode::Json => results.push(file_json(&parsed, &issues)?),
            OutputMode::Plain => {
                for warning in warnings {
                    let position = warning.position();
                    eprintln!(
                        "{filename}\twarning\t{}:{}\t{}",
                        position.line,
                        position.column,
                        warning_message(warning)
                    );
                }
                for issue in &issues {
                    eprintln!("{filename}\tintegrity\t{issue}");
                }
            }
        }
    }

    match output.mode {
        OutputMode::Human => {
            let summary = format!(
                "{total_tables} tables in {} files, {total_warnings} warnings, {total_issues} integrity issues",
                files.len()
            );
            let clean = failed == 0 && total_warnings == 0 && total_issues == 0;
            output.summary(&summary, clean);
        }
        OutputMode::Json => {
            output.print_json(&serde_json::json!({
                "files": files.len(),
                "failed": failed,
                "tables": total_tables,
                "warnings": total_warnings,
                "integrity_issues": total_issues,
                "results": results,
            }));
        }
        OutputMode::Plain => {
            println!(
                "{}\t{failed}\t{total_warnings}\t{total_issues}",
                files.len()
            );
        }
    }

    if failed > 0 {
        Err(CliError::CheckFailed {
            failed,
            total: files.len(),
        })
    } else {
        Ok(())
    }
}

fn report_human(parsed: &ParsedFile, issues: &[IntegrityIssue], output: &OutputContext) {
    let filename = parsed.path.display().to_string();
    let diagram = &parsed.output.diagram;

    if !output.quiet {
        for report in render_diagnostics(&parsed.output.warnings, &parsed.source, &filename) {
            eprintln!("{report:?}");
        }
    }
    for issue in issues {
        output.file_warning(&parsed.path, issue);
    }
    output.file_progress(
        &parsed.path,
        format_args!(
            "{} tables, {} references, {} areas",
            diagram.tables.len(),
            diagram.references.len(),
            diagram.areas.len()
        ),
    );
}

fn file_json(
    parsed: &ParsedFile,
    issues: &[IntegrityIssue],
) -> Result<serde_json::Value, CliError> {
    let diagram = &parsed.output.diagram;
    let warnings: Vec<serde_json::Value> = parsed
        .output
        .warnings
        .iter()
        .map(|w| {
            let position = w.position();
            serde_json::json!({
                "line": position.line,
                "column": position.column,
                "message": warning_message(w),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "file": parsed.path.display().to_string(),
        "tables": diagram.tables.len(),
        "references": diagram.references.len(),
        "areas": diagram.areas.len(),
        "warnings": warnings,
        "integrity_issues": serde_json::to_value(issues)?,
    }))
}

/// The diagnostic text without its `line L, column C: ` prefix.
fn warning_message(warning: &ParseDiagnostic) -> String {
    let text = warning.to_string();
    let prefix = format!("{}: ", warning.position());
    match text.strip_prefix(&prefix) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
