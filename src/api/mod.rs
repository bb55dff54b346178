//! Purpose: Define the public Rust API boundary for jsonbatch.
//! Exports: Loader, options, report, failure, observer, and error types.
//! Role: Additive-only surface used by the CLI and by embedders.
//! Invariants: Types here are re-exports; behavior lives in `core`.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::batch::{BatchLoader, BatchReport, ErrorPolicy, LoadOptions};
pub use crate::core::document::{
    DEFAULT_MAX_FILE_BYTES, FailureKind, LoadFailure, LoadedDocument, read_document,
};
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::listing::{Entry, EntryFilter, EntryOrder, Listing, list_entries, resolve};
pub use crate::core::observe::{
    FileStatus, Observer, RecordingObserver, TimingMark, TracingObserver,
};
pub use crate::json::parse::ParseFailureCategory;
