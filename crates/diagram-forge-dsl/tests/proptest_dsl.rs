use proptest::prelude::*;
use diagram_forge_dsl::token::Token;
use diagram_forge_dsl::{parse, serialize, tokenize, LowerOptions, ParseOptions};

const KEYWORDS: &[&str] = &[
    "project",
    "table",
    "area",
    "ref",
    "note",
    "indexes",
    "commoncolumns",
    "common_columns",
    "pk",
    "fk",
    "unique",
    "not",
    "null",
    "increment",
    "default",
];

/// Strategy for generating valid bare identifiers.
fn ident() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
        .prop_filter("not a keyword", |s| !KEYWORDS.contains(&s.as_str()))
}

/// Strategy for generating a column type, sometimes with parameters.
fn column_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("int".to_string()),
        Just("integer".to_string()),
        Just("bigint".to_string()),
        Just("text".to_string()),
        Just("bool".to_string()),
        Just("timestamp".to_string()),
        (1u32..255).prop_map(|n| format!("varchar({n})")),
        (1u32..20, 0u32..5).prop_map(|(p, s)| format!("numeric({p}, {s})")),
    ]
}

/// Strategy for generating an optional column settings list.
fn column_settings() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![
            Just(None),
            Just(Some("'draft'".to_string())),
            Just(Some("`now()`".to_string())),
            (-100i32..100).prop_map(|n| Some(n.to_string())),
        ],
    )
        .prop_map(|(pk, unique, not_null, default)| {
            let mut entries = Vec::new();
            if pk {
                entries.push("pk".to_string());
            }
            if unique {
                entries.push("unique".to_string());
            }
            if not_null {
                entries.push("not null".to_string());
            }
            if let Some(default) = default {
                entries.push(format!("default: {default}"));
            }
            if entries.is_empty() {
                String::new()
            } else {
                format!(" [{}]", entries.join(", "))
            }
        })
}

/// Strategy for generating a table with distinct column names.
fn table() -> impl Strategy<Value = (String, Vec<String>, String)> {
    (
        ident(),
        prop::collection::btree_set(ident(), 1..6),
        prop::collection::vec((column_type(), column_settings()), 6),
    )
        .prop_map(|(name, columns, shapes)| {
            let columns: Vec<String> = columns.into_iter().collect();
            let body = columns
                .iter()
                .zip(shapes)
                .map(|(c, (ty, settings))| format!("  {c} {ty}{settings}\n"))
                .collect::<String>();
            let source = format!("Table {name} {{\n{body}}}\n");
            (name, columns, source)
        })
}

fn fixed_options() -> ParseOptions {
    ParseOptions {
        lower: LowerOptions {
            diagram_id: Some(diagram_forge_core::types::DiagramId::from_string(
                "diagram_fixed",
            )),
            timestamp: Some(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH),
            ..LowerOptions::default()
        },
        ..ParseOptions::default()
    }
}

proptest! {
    /// The tokenizer returns either an error or a well-formed token stream,
    /// whatever the input.
    #[test]
    fn tokenizer_never_panics(source in "\\PC{0,200}") {
        if let Ok(tokens) = tokenize(&source) {
            prop_assert_eq!(tokens.last().map(|t| t.token), Some(Token::Eof));
            let mut last = 0;
            for t in &tokens {
                prop_assert!(t.span.start.offset >= last);
                prop_assert!(t.span.end.offset <= source.len());
                last = t.span.start.offset;
            }
        }
    }

    /// Parsing arbitrary text never panics; it fails or recovers.
    #[test]
    fn parser_never_panics(source in "(Table|Ref|Area|\\{|\\}|\\[|\\]|:|,|\\.|>|<|-|[a-z]{1,4}|'x'| |\n){0,40}") {
        let _ = parse(&source, &ParseOptions::default());
    }

    /// A generated valid table parses cleanly with every column present.
    #[test]
    fn valid_table_always_parses((name, columns, source) in table()) {
        let output = parse(&source, &ParseOptions::default());
        prop_assert!(output.is_ok(), "Failed to parse: {}", source);
        let output = output.unwrap();
        prop_assert!(output.warnings.is_empty(), "{:?}\n{}", output.warnings, source);
        prop_assert_eq!(output.diagram.tables.len(), 1);
        let table = &output.diagram.tables[0];
        prop_assert_eq!(&table.name, &name);
        let parsed: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        let expected: Vec<&str> = columns.iter().map(String::as_str).collect();
        prop_assert_eq!(parsed, expected);
    }

    /// Serializing a parsed table and serializing its re-parse agree.
    #[test]
    fn serialization_is_idempotent((_, _, source) in table()) {
        let options = fixed_options();
        let first = parse(&source, &options).unwrap().diagram;
        let printed = serialize(&first);
        let second = parse(&printed, &options);
        prop_assert!(second.is_ok(), "Failed to re-parse:\n{}", printed);
        let second = second.unwrap();
        prop_assert!(second.warnings.is_empty(), "{:?}\n{}", second.warnings, printed);
        prop_assert_eq!(serialize(&second.diagram), printed);
    }

    /// Every column on the source side of a reference is flagged as a
    /// foreign key.
    #[test]
    fn referencing_columns_are_foreign_keys(
        a in ident(),
        b in ident(),
        col in ident(),
        op in prop_oneof![Just(">"), Just("<"), Just("-"), Just("<>"), Just("~")],
    ) {
        prop_assume!(a != b);
        let source = format!(
            "Table {a} {{ {col} int }}\nTable {b} {{ id int }}\nRef: {a}.{col} {op} {b}.id\n"
        );
        let output = parse(&source, &ParseOptions::default()).unwrap();
        prop_assert!(output.warnings.is_empty());
        let from = output.diagram.table(&a).unwrap();
        prop_assert!(from.column(&col).unwrap().fk);
        let to = output.diagram.table(&b).unwrap();
        prop_assert!(!to.column("id").unwrap().fk);
    }
}
