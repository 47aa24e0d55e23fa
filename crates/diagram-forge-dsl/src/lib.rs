//! # diagram-forge-dsl
//!
//! Parser and serializer for diagram markup, a small language describing
//! database tables, their relationships, and the areas that group them.
//!
//! This crate provides:
//! - A lexer that tokenizes markup, keeping line comments
//! - A recursive descent parser that recovers from errors and reports them
//!   as diagnostics instead of failing
//! - Lowering from the syntax tree to the [`Diagram`] domain model
//! - A serializer that writes a `Diagram` back as canonical markup
//!
//! # Example
//!
//! ```
//! use diagram_forge_dsl::{parse, serialize, ParseOptions};
//!
//! let source = r#"
//! Table users {
//!     id serial [pk]
//!     name varchar(100)
//! }
//!
//! Table orders {
//!     id serial [pk]
//!     user_id integer
//! }
//!
//! Ref: orders.user_id > users.id
//! "#;
//!
//! let output = parse(source, &ParseOptions::default()).expect("parse failed");
//! assert!(output.warnings.is_empty());
//! assert_eq!(output.diagram.tables.len(), 2);
//!
//! let orders = output.diagram.table("orders").unwrap();
//! assert!(orders.column("user_id").unwrap().fk);
//!
//! let text = serialize(&output.diagram);
//! assert!(text.contains("Ref: orders.user_id > users.id"));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod printer;
pub mod token;

use diagram_forge_core::types::Diagram;

pub use error::{DslError, ParseDiagnostic, Position, Span};
pub use lexer::{tokenize, SpannedToken};
pub use lower::{lower, normalize_type, LowerOptions};
pub use parser::{parse_tokens, ParsedProgram};
pub use printer::serialize;

/// Default upper bound on document size: 4 MiB.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 4 * 1024 * 1024;

/// Options for [`parse`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub lower: LowerOptions,
    /// Documents larger than this are rejected before tokenizing.
    pub max_input_bytes: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            lower: LowerOptions::default(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// A lowered diagram plus the problems the parser recovered from.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub diagram: Diagram,
    pub warnings: Vec<ParseDiagnostic>,
}

/// Parses markup into a [`Diagram`].
///
/// Syntax errors inside a construct do not fail the call: the construct is
/// dropped, a warning is recorded, and parsing resumes at the next
/// top-level keyword.
///
/// # Errors
///
/// Returns [`DslError`] if the input exceeds `options.max_input_bytes` or
/// contains an unterminated string, a character that starts no token, or a
/// malformed color literal.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParseOutput, DslError> {
    if source.len() > options.max_input_bytes {
        return Err(DslError::InputTooLarge {
            size: source.len(),
            limit: options.max_input_bytes,
        });
    }

    let tokens = tokenize(source)?;
    let ParsedProgram {
        program,
        diagnostics,
    } = parse_tokens(&tokens);
    let diagram = lower(&program, &options.lower);

    Ok(ParseOutput {
        diagram,
        warnings: diagnostics,
    })
}
