//! Purpose: Internal JSON decoding boundary for loaded files.
//! Exports: `parse` module with decode helpers and failure categorisation.
//! Role: Single seam for parser details so the loader avoids ad hoc decode logic.
//! Invariants: File contents are decoded only through this module.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub(crate) mod parse;
