use std::path::PathBuf;

use crate::cli::FmtArgs;
use crate::commands::{discover_diagram_files, parse_file};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::{OutputContext, OutputMode};

/// Run the `fmt` command: rewrite each file in canonical form.
///
/// Prints to stdout by default. Files that needed error recovery are left
/// alone, since their canonical form would drop the skipped constructs.
pub fn run(args: FmtArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let paths = config.input_paths(&args.paths);
    let files = discover_diagram_files(&paths, &config.cli.extension)?;
    let options = config.parse_options();

    let mut unformatted: Vec<PathBuf> = Vec::new();
    let mut skipped = 0usize;
    let mut rewritten = 0usize;

    for file in &files {
        let parsed = parse_file(file, &options)?;

        if !parsed.output.warnings.is_empty() {
            skipped += 1;
            output.file_warning(
                file,
                format_args!(
                    "skipped, {} syntax errors (run 'diagram-forge check')",
                    parsed.output.warnings.len()
                ),
            );
            continue;
        }

        let formatted = diagram_forge_dsl::serialize(&parsed.output.diagram);
        let changed = formatted != parsed.source;

        if args.check {
            if changed {
                if output.mode == OutputMode::Plain {
                    println!("{}", file.display());
                } else {
                    output.file_progress(file, "needs formatting");
                }
                unformatted.push(file.clone());
            }
        } else if args.write {
            if changed {
                std::fs::write(file, &formatted).map_err(|e| CliError::Io {
                    path: file.clone(),
                    source: e,
                })?;
                rewritten += 1;
                output.file_progress(file, "formatted");
            }
        } else {
            print!("{formatted}");
        }
    }

    if args.check && !unformatted.is_empty() {
        return Err(CliError::Unformatted { files: unformatted });
    }

    if args.write {
        output.summary(
            &format!("{rewritten} of {} files reformatted", files.len()),
            true,
        );
    }

    if skipped > 0 {
        return Err(CliError::CheckFailed {
            failed: skipped,
            total: files.len(),
        });
    }
    Ok(())
}
