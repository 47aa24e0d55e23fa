//! # diagram-forge-core
//!
//! Domain model for database diagrams: tables, columns, indexes,
//! references between columns, and the areas that group tables.
//!
//! Values in this crate are produced by lowering a parsed diagram
//! document (see `diagram-forge-dsl`) and are consumed by anything that
//! renders, stores, or re-serializes diagrams. Every type is
//! serde-serializable.

pub mod error;
pub mod integrity;
pub mod types;

pub use error::ModelError;
pub use integrity::IntegrityIssue;
