pub mod check;
pub mod completions;
pub mod export;
pub mod fmt;

use std::path::{Path, PathBuf};

use diagram_forge_dsl::{ParseOptions, ParseOutput};

use crate::error::CliError;

/// A parsed file together with its source text.
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: String,
    pub output: ParseOutput,
}

/// Discover diagram files from a list of paths.
///
/// Paths can be files (used directly) or directories (searched recursively
/// for files matching `**/*.{extension}`).
pub fn discover_diagram_files(
    paths: &[PathBuf],
    extension: &str,
) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let pattern = path.join(format!("**/*.{extension}"));
            let entries = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| CliError::Other(e.to_string()))?;
            for entry in entries {
                let entry = entry.map_err(|e| CliError::Other(e.to_string()))?;
                files.push(entry);
            }
        } else {
            return Err(CliError::NoDiagramFiles { path: path.clone() });
        }
    }

    if files.is_empty() {
        let display_path = paths
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("diagrams/"));
        return Err(CliError::NoDiagramFiles { path: display_path });
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered diagram files");
    Ok(files)
}

pub fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read and parse one file. A fatal parse error becomes `CliError::Parse`.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<ParsedFile, CliError> {
    let source = read_source(path)?;
    match diagram_forge_dsl::parse(&source, options) {
        Ok(output) => {
            tracing::info!(
                file = %path.display(),
                tables = output.diagram.tables.len(),
                warnings = output.warnings.len(),
                "parsed diagram"
            );
            Ok(ParsedFile {
                path: path.to_path_buf(),
                source,
                output,
            })
        }
        Err(error) => Err(CliError::Parse {
            error,
            source_text: source,
            file: path.to_path_buf(),
        }),
    }
}
