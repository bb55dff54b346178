//! Purpose: Timing-mark seam between the batch loader and whoever observes it.
//! Exports: `Observer`, `FileStatus`, `TimingMark`, `TracingObserver`, `RecordingObserver`.
//! Role: Keeps instrumentation out of the load algorithm; the CLI logs, tests record.
//! Invariants: Every `file_started` is followed by exactly one `file_finished` for the same index.
//! Invariants: `batch_started`/`batch_finished` bracket the file marks of a completed batch.
//! Invariants: `TracingObserver` logs every mark at info or above; failed files log at warn.
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FileStatus {
    Loaded,
    Failed,
}

/// Receives timing marks from `BatchLoader`. All methods default to no-ops.
pub trait Observer {
    fn listed(&mut self, _dir: &Path, _entries: usize, _elapsed: Duration) {}

    fn batch_started(&mut self, _dir: &Path, _entries: usize) {}

    fn file_started(&mut self, _index: usize, _path: &Path) {}

    fn file_finished(
        &mut self,
        _index: usize,
        _path: &Path,
        _elapsed: Duration,
        _bytes: u64,
        _status: FileStatus,
    ) {
    }

    fn batch_finished(&mut self, _dir: &Path, _elapsed: Duration, _loaded: usize, _failed: usize) {
    }
}

impl Observer for () {}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn listed(&mut self, dir: &Path, entries: usize, elapsed: Duration) {
        (**self).listed(dir, entries, elapsed);
    }

    fn batch_started(&mut self, dir: &Path, entries: usize) {
        (**self).batch_started(dir, entries);
    }

    fn file_started(&mut self, index: usize, path: &Path) {
        (**self).file_started(index, path);
    }

    fn file_finished(
        &mut self,
        index: usize,
        path: &Path,
        elapsed: Duration,
        bytes: u64,
        status: FileStatus,
    ) {
        (**self).file_finished(index, path, elapsed, bytes, status);
    }

    fn batch_finished(&mut self, dir: &Path, elapsed: Duration, loaded: usize, failed: usize) {
        (**self).batch_finished(dir, elapsed, loaded, failed);
    }
}

/// Emits each mark as a `tracing` event.
#[derive(Clone, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn listed(&mut self, dir: &Path, entries: usize, elapsed: Duration) {
        tracing::info!(dir = %dir.display(), entries, "listed directory in {elapsed:.2?}");
    }

    fn batch_started(&mut self, dir: &Path, entries: usize) {
        tracing::info!(dir = %dir.display(), entries, "batch start");
    }

    fn file_started(&mut self, index: usize, path: &Path) {
        tracing::info!(index, path = %path.display(), "file start");
    }

    fn file_finished(
        &mut self,
        index: usize,
        path: &Path,
        elapsed: Duration,
        bytes: u64,
        status: FileStatus,
    ) {
        match status {
            FileStatus::Loaded => tracing::info!(
                index,
                path = %path.display(),
                bytes,
                "    - {}: {elapsed:.2?}",
                path.display()
            ),
            FileStatus::Failed => tracing::warn!(
                index,
                path = %path.display(),
                bytes,
                "    - {}: failed after {elapsed:.2?}",
                path.display()
            ),
        }
    }

    fn batch_finished(&mut self, dir: &Path, elapsed: Duration, loaded: usize, failed: usize) {
        tracing::info!(dir = %dir.display(), loaded, failed, "batch end: {elapsed:.2?}");
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TimingMark {
    Listed {
        entries: usize,
    },
    BatchStart {
        entries: usize,
    },
    FileStart {
        index: usize,
        path: PathBuf,
    },
    FileEnd {
        index: usize,
        path: PathBuf,
        elapsed: Duration,
        status: FileStatus,
    },
    BatchEnd {
        elapsed: Duration,
        loaded: usize,
        failed: usize,
    },
}

/// Keeps every mark in order; used by tests and embedders that report timings themselves.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub marks: Vec<TimingMark>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_starts(&self) -> usize {
        self.marks
            .iter()
            .filter(|mark| matches!(mark, TimingMark::FileStart { .. }))
            .count()
    }

    pub fn file_ends(&self) -> usize {
        self.marks
            .iter()
            .filter(|mark| matches!(mark, TimingMark::FileEnd { .. }))
            .count()
    }

    pub fn batch_marks(&self) -> usize {
        self.marks
            .iter()
            .filter(|mark| {
                matches!(
                    mark,
                    TimingMark::BatchStart { .. } | TimingMark::BatchEnd { .. }
                )
            })
            .count()
    }
}

impl Observer for RecordingObserver {
    fn listed(&mut self, _dir: &Path, entries: usize, _elapsed: Duration) {
        self.marks.push(TimingMark::Listed { entries });
    }

    fn batch_started(&mut self, _dir: &Path, entries: usize) {
        self.marks.push(TimingMark::BatchStart { entries });
    }

    fn file_started(&mut self, index: usize, path: &Path) {
        self.marks.push(TimingMark::FileStart {
            index,
            path: path.to_path_buf(),
        });
    }

    fn file_finished(
        &mut self,
        index: usize,
        path: &Path,
        elapsed: Duration,
        _bytes: u64,
        status: FileStatus,
    ) {
        self.marks.push(TimingMark::FileEnd {
            index,
            path: path.to_path_buf(),
            elapsed,
            status,
        });
    }

    fn batch_finished(&mut self, _dir: &Path, elapsed: Duration, loaded: usize, failed: usize) {
        self.marks.push(TimingMark::BatchEnd {
            elapsed,
            loaded,
            failed,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{FileStatus, Observer, RecordingObserver, TimingMark, TracingObserver};
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tracing_observer_logs_file_marks_at_info() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut observer = TracingObserver;
            let path = Path::new("/data/a.json");
            observer.batch_started(Path::new("/data"), 1);
            observer.file_started(0, path);
            observer.file_finished(0, path, Duration::from_millis(2), 7, FileStatus::Loaded);
            observer.batch_finished(Path::new("/data"), Duration::from_millis(3), 1, 0);
        });

        let logged = String::from_utf8(buf.0.lock().unwrap().clone()).expect("utf8");
        let start = logged.find("file start").expect("file start logged");
        let end = logged.find("/data/a.json:").expect("file end logged");
        assert!(start < end);
        assert!(logged.contains("INFO"));
        assert!(logged.contains("batch end"));
    }

    #[test]
    fn recording_observer_keeps_order() {
        let mut observer = RecordingObserver::new();
        let path = Path::new("/tmp/a.json");
        observer.batch_started(Path::new("/tmp"), 1);
        observer.file_started(0, path);
        observer.file_finished(0, path, Duration::from_millis(2), 7, FileStatus::Loaded);
        observer.batch_finished(Path::new("/tmp"), Duration::from_millis(3), 1, 0);

        assert_eq!(observer.file_starts(), 1);
        assert_eq!(observer.file_ends(), 1);
        assert_eq!(observer.batch_marks(), 2);
        assert!(matches!(
            observer.marks.first(),
            Some(TimingMark::BatchStart { entries: 1 })
        ));
        assert!(matches!(
            observer.marks.last(),
            Some(TimingMark::BatchEnd {
                loaded: 1,
                failed: 0,
                ..
            })
        ));
    }

    #[test]
    fn mutable_reference_forwards_marks() {
        fn drive<O: Observer>(mut observer: O) {
            observer.file_started(4, Path::new("x.json"));
        }

        let mut observer = RecordingObserver::new();
        drive(&mut observer);
        assert_eq!(observer.file_starts(), 1);
    }
}
