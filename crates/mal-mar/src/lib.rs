//! Reader and writer for the `.mar` archive format.
//!
//! A `.mar` file is a zip archive carrying a compiled MAL language
//! specification: a `langspec.json` document validated against an embedded
//! JSON schema, per-asset icons under `icons/`, and optional LICENSE and
//! NOTICE texts. Reading produces a fully resolved
//! [`Lang`](mal_langspec::Lang); writing emits deterministic bytes.

mod error;
mod reader;
mod schema;
mod writer;
mod zip;

pub use error::MarError;
pub use reader::MarReader;
pub use schema::LANGSPEC_SCHEMA;
pub use writer::MarWriter;
