//! Purpose: Shared library crate used by the `jsonbatch` CLI and tests.
//! Exports: `api` (loader, options, reports, observers, errors), `core`, `notice`.
//! Role: Library backing the binary; `api` is the intended embedding surface.
//! Invariants: Loading is sequential and never writes to the input directory.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
mod json;
pub mod notice;
