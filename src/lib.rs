//! dtsx-inspect - inventory reporter for legacy SSIS/DTSX package definitions
//!
//! This library parses a package-definition XML file produced by the legacy
//! ETL design tool and extracts a human-readable inventory of its structural
//! elements: connections, variables, tasks, and task-to-task precedence
//! constraints. Two historical serialization variants of the same schema are
//! supported (the older "Property"-element style and the newer
//! attribute-based style) and normalized into one in-memory representation.
//!
//! # Core Concepts
//!
//! - **Extraction**: a single pass over the parsed document tree producing a
//!   normalized [`model::PackageReport`] record set
//! - **Dual-schema resolution**: per field, the legacy `Property` child is
//!   consulted first, then the modern namespaced attribute; the first
//!   non-empty value wins
//! - **Reporting**: the record set is rendered as a sectioned textual report
//!   with truncation rules for long fields
//!
//! # Project Structure
//!
//! - [`extract`]: document traversal and field normalization
//! - [`model`]: the immutable record types produced per run
//! - [`report`]: console report rendering
//! - [`cli`]: command-line argument surface

pub mod cli;
pub mod extract;
pub mod model;
pub mod report;

/// Crate version, sourced from Cargo metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
