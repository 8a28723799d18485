//! Dataset Writer
//!
//! Append-only sparse training file shared between threads.
//! Whole lines are written under one lock, so rows from concurrent
//! callers never interleave. A failed write or flush poisons the writer:
//! later appends are refused instead of being glued to a partial line.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::Mutex;

use super::sparse::SparseExporter;
use crate::logic::error::{FeatureError, FeatureResult};
use crate::logic::features::{FeatureVector, LayoutInfo};

/// Dataset file extension
const DATASET_EXT: &str = "svm";

/// Name suffixes tried when a timestamped file already exists
const MAX_NAME_ATTEMPTS: usize = 1000;

pub struct DatasetWriter {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    exporter: SparseExporter,
    rows: AtomicU64,
    poisoned: AtomicBool,
}

impl DatasetWriter {
    /// Create (or truncate) the dataset file at `path`
    pub fn create(path: impl Into<PathBuf>, exporter: SparseExporter) -> FeatureResult<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self::from_file(path, file, exporter))
    }

    /// Create a new timestamped dataset file inside `base_dir`.
    ///
    /// Never reuses an existing file: a name taken within the same second
    /// gets a `-1`, `-2`, ... suffix.
    pub fn in_dir(base_dir: &Path, exporter: SparseExporter) -> FeatureResult<Self> {
        fs::create_dir_all(base_dir)?;

        // timestamp format: YYYY-MM-DD-HHMMSS
        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S").to_string();

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let filename = if attempt == 0 {
                format!("nodesel-{}.{}", stamp, DATASET_EXT)
            } else {
                format!("nodesel-{}-{}.{}", stamp, attempt, DATASET_EXT)
            };
            let path = base_dir.join(filename);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok(Self::from_file(path, file, exporter)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free dataset file name for {} in {:?}", stamp, base_dir),
        )
        .into())
    }

    fn from_file(path: PathBuf, file: File, exporter: SparseExporter) -> Self {
        log::info!("Opened dataset file: {:?}", path);
        Self {
            writer: Mutex::new(BufWriter::new(file)),
            path,
            exporter,
            rows: AtomicU64::new(0),
            poisoned: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exporter(&self) -> &SparseExporter {
        &self.exporter
    }

    /// Sidecar manifest path: `<dataset file>.layout.json`
    pub fn layout_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".layout.json");
        PathBuf::from(name)
    }

    /// Write the layout manifest next to the dataset file
    pub fn write_layout(&self, info: &LayoutInfo) -> FeatureResult<PathBuf> {
        let path = self.layout_path();
        fs::write(&path, serde_json::to_string_pretty(info)?)?;
        Ok(path)
    }

    pub fn append_single(&self, vector: &FeatureVector, label: i32) -> FeatureResult<()> {
        let line = self.exporter.format_single(vector, label)?;
        self.append_line(&line)
    }

    pub fn append_diff(
        &self,
        a: &FeatureVector,
        b: &FeatureVector,
        label: i32,
        negate: bool,
    ) -> FeatureResult<()> {
        let line = self.exporter.format_diff(a, b, label, negate)?;
        self.append_line(&line)
    }

    fn append_line(&self, line: &str) -> FeatureResult<()> {
        let mut writer = self.writer.lock();
        self.check_poisoned()?;

        if let Err(e) = writer.write_all(line.as_bytes()) {
            return Err(self.poison(e));
        }
        self.rows.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn flush(&self) -> FeatureResult<()> {
        let mut writer = self.writer.lock();
        self.check_poisoned()?;

        writer.flush().map_err(|e| self.poison(e))
    }

    /// True after a failed write or flush
    pub fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    fn check_poisoned(&self) -> FeatureResult<()> {
        if self.is_poisoned() {
            return Err(FeatureError::WriterPoisoned {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn poison(&self, err: io::Error) -> FeatureError {
        self.poisoned.store(true, Ordering::Release);
        log::error!("Write to dataset file {:?} failed, writer poisoned: {}", self.path, err);
        FeatureError::Io(err)
    }

    /// Rows appended since creation
    pub fn rows_written(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }
}

impl Drop for DatasetWriter {
    fn drop(&mut self) {
        if self.is_poisoned() {
            return;
        }
        if let Err(e) = self.writer.get_mut().flush() {
            log::error!("Failed to flush dataset file {:?}: {}", self.path, e);
        } else {
            log::info!("Closed dataset file {:?} ({} rows)", self.path, self.rows_written());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::solver::BoundType;
    use tempfile::tempdir;

    fn computed(value: f64) -> FeatureVector {
        let mut vector = FeatureVector::new(2);
        vector.set_max_depth(100);
        vector.mark_computed(1, BoundType::Upper);
        vector.values_mut().fill(value);
        vector
    }

    #[test]
    fn test_in_dir_creates_timestamped_file() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("nested");
        let writer = DatasetWriter::in_dir(&base, SparseExporter::default()).unwrap();

        assert!(writer.path().exists());
        let name = writer.path().file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("nodesel-"));
        assert!(name.ends_with(".svm"));
    }

    #[test]
    fn test_in_dir_same_second_keeps_first_file() {
        let dir = tempdir().unwrap();
        let first = DatasetWriter::in_dir(dir.path(), SparseExporter::new(1)).unwrap();
        first.append_single(&computed(1.0), 1).unwrap();
        first.flush().unwrap();

        let second = DatasetWriter::in_dir(dir.path(), SparseExporter::new(1)).unwrap();
        assert_ne!(first.path(), second.path());
        assert_eq!(fs::read_to_string(first.path()).unwrap(), "1 1:1.0 2:1.0\n");

        // taken names get a numeric suffix
        let stamp_name = first.path().file_stem().unwrap().to_str().unwrap().to_string();
        let second_name = second.path().file_stem().unwrap().to_str().unwrap().to_string();
        if second_name.starts_with(&stamp_name) {
            assert_eq!(second_name, format!("{}-1", stamp_name));
        }
    }

    #[test]
    fn test_append_and_flush() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::create(dir.path().join("rows.svm"), SparseExporter::new(1)).unwrap();

        writer.append_single(&computed(1.0), 1).unwrap();
        writer.append_diff(&computed(3.0), &computed(1.0), 1, true).unwrap();
        writer.flush().unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content, "1 1:1.0 2:1.0\n-1 1:-2.0 2:-2.0\n");
        assert_eq!(writer.rows_written(), 2);
    }

    #[test]
    fn test_rejected_row_writes_nothing() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::create(dir.path().join("rows.svm"), SparseExporter::default()).unwrap();

        assert!(writer.append_single(&FeatureVector::new(2), 1).is_err());
        writer.flush().unwrap();

        assert_eq!(writer.rows_written(), 0);
        assert!(fs::read_to_string(writer.path()).unwrap().is_empty());
    }

    #[test]
    fn test_layout_sidecar() {
        let dir = tempdir().unwrap();
        let writer = DatasetWriter::create(dir.path().join("rows.svm"), SparseExporter::default()).unwrap();

        let path = writer.write_layout(&LayoutInfo::current(13, 100)).unwrap();
        assert!(path.ends_with("rows.svm.layout.json"));

        let info: LayoutInfo = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(info.validate().is_ok());
        assert_eq!(info.max_depth, 100);
    }

    /// A failed write refuses every later row
    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_write_poisons_writer() {
        let full = Path::new("/dev/full");
        if !full.exists() {
            return;
        }
        let writer = DatasetWriter::create(full, SparseExporter::default()).unwrap();

        // larger than the BufWriter buffer, so it reaches the device directly
        let mut wide = FeatureVector::new(4000);
        wide.set_max_depth(100);
        wide.mark_computed(1, BoundType::Upper);
        wide.values_mut().fill(1.0);

        assert!(matches!(writer.append_single(&wide, 1), Err(FeatureError::Io(_))));
        assert!(writer.is_poisoned());

        let err = writer.append_single(&computed(1.0), 1).unwrap_err();
        assert!(matches!(err, FeatureError::WriterPoisoned { .. }));
        assert!(matches!(writer.flush(), Err(FeatureError::WriterPoisoned { .. })));
        assert_eq!(writer.rows_written(), 0);
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.svm");
        {
            let writer = DatasetWriter::create(&path, SparseExporter::new(0)).unwrap();
            writer.append_single(&computed(2.0), 1).unwrap();
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "1 1:2 2:2\n");
    }
}
