//! Purpose: Load every candidate file of a directory into an ordered document list.
//! Exports: `ErrorPolicy`, `LoadOptions`, `BatchReport`, `BatchLoader`.
//! Role: The batch engine; sequential list -> read -> parse -> collect with timing marks.
//! Invariants: Files are processed one at a time in listing order; results keep that order.
//! Invariants: Under `Skip`, loaded + failed == entries_total for every returned report.
//! Invariants: Directory failures are fatal and happen before any file mark is emitted.
use std::path::Path;
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::core::document::{self, LoadFailure, LoadedDocument};
use crate::core::error::Error;
use crate::core::listing::{self, EntryFilter, EntryOrder};
use crate::core::observe::{FileStatus, Observer};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ErrorPolicy {
    /// Abort the batch on the first failing file.
    Stop,
    /// Record the failure and continue with the next file.
    #[default]
    Skip,
}

#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub filter: EntryFilter,
    pub order: EntryOrder,
    pub errors: ErrorPolicy,
    pub max_file_bytes: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            filter: EntryFilter::default(),
            order: EntryOrder::default(),
            errors: ErrorPolicy::default(),
            max_file_bytes: document::DEFAULT_MAX_FILE_BYTES,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    pub documents: Vec<LoadedDocument>,
    pub failures: Vec<LoadFailure>,
    pub entries_total: usize,
    pub skipped_entries: usize,
    pub list_elapsed: Duration,
    pub elapsed: Duration,
}

impl BatchReport {
    /// The result collection: parsed values in processing order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.documents.iter().map(|doc| &doc.value)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.documents.into_iter().map(|doc| doc.value).collect()
    }

    pub fn loaded(&self) -> usize {
        self.documents.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub struct BatchLoader<O> {
    options: LoadOptions,
    observer: O,
}

impl BatchLoader<()> {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            observer: (),
        }
    }
}

impl<O: Observer> BatchLoader<O> {
    pub fn with_observer(options: LoadOptions, observer: O) -> Self {
        Self { options, observer }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Read and decode one file, bracketed by file start/end marks.
    pub fn load_one(&mut self, index: usize, path: &Path) -> Result<LoadedDocument, LoadFailure> {
        self.observer.file_started(index, path);
        let started = Instant::now();
        let result = document::read_document(path, self.options.max_file_bytes);
        let elapsed = started.elapsed();

        match result {
            Ok((value, bytes)) => {
                self.observer
                    .file_finished(index, path, elapsed, bytes, FileStatus::Loaded);
                Ok(LoadedDocument {
                    index,
                    path: path.to_path_buf(),
                    bytes,
                    elapsed,
                    value,
                })
            }
            Err(mut failure) => {
                self.observer
                    .file_finished(index, path, elapsed, 0, FileStatus::Failed);
                failure.index = index;
                Err(failure)
            }
        }
    }

    /// Load every candidate file of `dir`.
    ///
    /// `on_failure` sees each skipped file as soon as it fails, before the
    /// next file is read. Under `ErrorPolicy::Stop` the first failure is
    /// returned as an error and no report is produced.
    pub fn load_all_with<F>(&mut self, dir: &Path, mut on_failure: F) -> Result<BatchReport, Error>
    where
        F: FnMut(&LoadFailure),
    {
        let list_started = Instant::now();
        let listing = listing::list_entries(dir, &self.options.filter, self.options.order)?;
        let list_elapsed = list_started.elapsed();
        self.observer
            .listed(dir, listing.entries.len(), list_elapsed);

        let mut report = BatchReport {
            entries_total: listing.entries.len(),
            skipped_entries: listing.skipped,
            list_elapsed,
            ..BatchReport::default()
        };

        self.observer.batch_started(dir, report.entries_total);
        let started = Instant::now();
        for (index, entry) in listing.entries.iter().enumerate() {
            match self.load_one(index, &entry.path) {
                Ok(document) => report.documents.push(document),
                Err(failure) => match self.options.errors {
                    ErrorPolicy::Stop => return Err(failure.into_error()),
                    ErrorPolicy::Skip => {
                        on_failure(&failure);
                        report.failures.push(failure);
                    }
                },
            }
        }
        report.elapsed = started.elapsed();
        self.observer
            .batch_finished(dir, report.elapsed, report.loaded(), report.failed());

        Ok(report)
    }

    pub fn load_all(&mut self, dir: &Path) -> Result<BatchReport, Error> {
        self.load_all_with(dir, |_| {})
    }
}
