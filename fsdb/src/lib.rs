//! Runtime support for data-access layers generated by `fsdb-codegen`.
//!
//! Generated collection and record types are thin handles over directory
//! locations; the actual filesystem work lives here so the generated code
//! stays small and depends on this crate only.

pub mod document;
pub mod error;
pub mod listing;

pub use document::Document;
pub use error::{FsdbError, Result};

// Generated code reaches these through `::fsdb::` so that consumers need no
// direct dependency on them.
pub use chrono;
pub use serde;
pub use serde_json;
