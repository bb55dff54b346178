// Core modules implementing directory listing, document decoding, the batch engine, and errors.
pub mod batch;
pub mod document;
pub mod error;
pub mod listing;
pub mod observe;
