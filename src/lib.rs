//! audit-resolver — de-obfuscates pipe-delimited audit logs.
//!
//! Obfuscated audit logs carry opaque identifiers (UUIDs and type-tagged
//! record references) in their `KEY=value` fields. This crate resolves them
//! into human-readable names by looking each one up in the primary Postgres
//! database and reconstructing every row as `KEY='resolved value'|`.
//!
//! Two pieces compose into a pipeline:
//!
//! - [`gateway::LookupStore`] — the read-only relational boundary: ten named
//!   single-id queries, failures reported and degraded to absence.
//! - [`resolver::RowResolver`] — the field resolution engine: a keyed
//!   dispatch table deciding per field between a foreign-key lookup, a bare
//!   pass-through, and a polymorphic class-tag resolution against a record
//!   id remembered earlier in the same row.
//!
//! [`pipeline::resolve_log_file`] drives the two over an input file.

pub mod config;
pub mod error;
pub mod gateway;
pub mod pipeline;
pub mod resolver;

pub use config::ResolverConfig;
pub use error::{ResolveError, Result};
pub use gateway::{LookupQuery, LookupStore, PgLookupStore};
pub use pipeline::{resolve_log_file, RunStats};
pub use resolver::RowResolver;
