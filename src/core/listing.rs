//! Purpose: List the candidate files of one input directory.
//! Exports: `EntryFilter`, `EntryOrder`, `Entry`, `Listing`, `list_entries`, `resolve`.
//! Role: Directory access for the batch loader; the only place that calls `read_dir`.
//! Invariants: Only regular files (after following symlinks) are candidates.
//! Invariants: Listing order is filesystem order unless `EntryOrder::Name` is requested.
//! Invariants: Any failure to open or iterate the directory is fatal for the batch.
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryFilter {
    extension: Option<String>,
}

impl EntryFilter {
    /// Accept regular files whose extension matches, ignoring ASCII case.
    pub fn extension(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        let extension = extension.trim_start_matches('.').to_string();
        Self {
            extension: Some(extension),
        }
    }

    pub fn any_file() -> Self {
        Self { extension: None }
    }

    pub fn accepts_name(&self, name: &OsStr) -> bool {
        let Some(wanted) = &self.extension else {
            return true;
        };
        Path::new(name)
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    }
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::extension("json")
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum EntryOrder {
    #[default]
    Listing,
    Name,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub name: OsString,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct Listing {
    pub entries: Vec<Entry>,
    /// Entries present in the directory but excluded by type or filter.
    pub skipped: usize,
}

pub fn resolve(dir: &Path, name: &OsStr) -> PathBuf {
    dir.join(name)
}

pub fn list_entries(dir: &Path, filter: &EntryFilter, order: EntryOrder) -> Result<Listing, Error> {
    let read_dir = fs::read_dir(dir).map_err(|err| directory_error(dir, err))?;

    let mut listing = Listing::default();
    for entry in read_dir {
        let entry = entry.map_err(|err| directory_error(dir, err))?;
        let name = entry.file_name();
        if !is_candidate_file(&entry) || !filter.accepts_name(&name) {
            listing.skipped += 1;
            continue;
        }
        let path = resolve(dir, &name);
        listing.entries.push(Entry { name, path });
    }

    if order == EntryOrder::Name {
        listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(listing)
}

// Entries whose type cannot be determined stay candidates so the read records why.
fn is_candidate_file(entry: &fs::DirEntry) -> bool {
    match entry.file_type() {
        Ok(file_type) if file_type.is_file() => true,
        Ok(file_type) if file_type.is_symlink() => match fs::metadata(entry.path()) {
            Ok(meta) => meta.is_file(),
            Err(_) => true,
        },
        Ok(_) => false,
        Err(_) => true,
    }
}

fn directory_error(dir: &Path, err: std::io::Error) -> Error {
    let kind = ErrorKind::from_io(&err);
    let error = Error::new(kind)
        .with_message("failed to read directory")
        .with_path(dir);
    let error = match kind {
        ErrorKind::NotFound => error.with_hint("Check the directory path (or JSONBATCH_DIR)."),
        ErrorKind::Usage => error.with_hint("The input path must be a directory, not a file."),
        _ => error,
    };
    error.with_source(err)
}
