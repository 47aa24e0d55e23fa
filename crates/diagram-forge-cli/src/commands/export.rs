use crate::cli::ExportArgs;
use crate::commands::parse_file;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::output::OutputContext;

/// Run the `export` command: write the lowered diagram as pretty JSON.
pub fn run(args: ExportArgs, config: &CliConfig, output: &OutputContext) -> Result<(), CliError> {
    let parsed = parse_file(&args.file, &config.parse_options())?;
    for warning in &parsed.output.warnings {
        output.file_warning(&args.file, warning);
    }

    let json = serde_json::to_string_pretty(&parsed.output.diagram)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n")).map_err(|e| CliError::Io {
                path: path.clone(),
                source: e,
            })?;
            output.summary(
                &format!("exported {} to {}", args.file.display(), path.display()),
                true,
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
