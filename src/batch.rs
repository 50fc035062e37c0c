//! Batch conversion with all-or-nothing deletion of the originals.
//!
//! Every file is attempted even when earlier ones fail. Originals are only
//! removed when the whole batch converted cleanly and the caller did not ask
//! to keep them; a single failure keeps every source file on disk.

use crate::conversion::Converter;
use crate::error::{Error, Result};
use crate::mapping::FieldMapping;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What happened to each file of a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Sources that converted, in processing order.
    pub succeeded: Vec<PathBuf>,
    /// Sources that failed, with the reason.
    pub failed: Vec<(PathBuf, Error)>,
    /// Sources removed after a clean batch.
    pub deleted: Vec<PathBuf>,
    /// Sources that could not be removed.
    pub delete_failures: Vec<(PathBuf, Error)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives a [`Converter`] over a list of exports.
pub struct BatchConverter<C> {
    converter: C,
    keep_originals: bool,
}

impl<C: Converter> BatchConverter<C> {
    pub fn new(converter: C, keep_originals: bool) -> Self {
        Self {
            converter,
            keep_originals,
        }
    }

    /// Convert `files`, writing progress lines to `out`.
    ///
    /// Returns an error only when a file name carries no account number; that
    /// is checked for every file before anything is converted. Conversion and
    /// deletion failures are collected in the report instead, and a failing
    /// `out` is logged and ignored.
    pub fn run<W: Write>(&self, files: &[PathBuf], out: &mut W) -> Result<BatchReport> {
        let mappings = files
            .iter()
            .map(|file| FieldMapping::for_file(file))
            .collect::<Result<Vec<_>>>()?;

        let mut report = BatchReport::default();

        for (source, mapping) in files.iter().zip(&mappings) {
            let destination = output_path(source);

            progress(
                out,
                format_args!(
                    "Converting {} to {}...",
                    display_name(source),
                    display_name(&destination)
                ),
            );

            match self.converter.convert(source, &destination, mapping) {
                Ok(()) => {
                    tracing::info!("Converted {}", source.display());
                    progress(out, format_args!("  Success!"));
                    report.succeeded.push(source.clone());
                }
                Err(e) => {
                    tracing::error!("Failed to convert {}: {}", source.display(), e);
                    progress(
                        out,
                        format_args!("  Error converting {}: {}", source.display(), e),
                    );
                    report.failed.push((source.clone(), e));
                }
            }
        }

        if !report.failed.is_empty() {
            progress(
                out,
                format_args!(
                    "\n{} files failed to convert. Not deleting any CSV files.",
                    report.failed.len()
                ),
            );
            return Ok(report);
        }

        progress(
            out,
            format_args!("\nAll {} files converted successfully.", report.succeeded.len()),
        );

        if self.keep_originals {
            tracing::debug!("Keeping original CSV files");
            return Ok(report);
        }

        progress(out, format_args!("Deleting original CSV files..."));
        for source in &report.succeeded {
            match fs::remove_file(source) {
                Ok(()) => {
                    progress(out, format_args!("  Deleted {}", display_name(source)));
                    report.deleted.push(source.clone());
                }
                Err(e) => {
                    tracing::warn!("Could not delete {}: {}", source.display(), e);
                    progress(
                        out,
                        format_args!("  Error deleting {}: {}", source.display(), e),
                    );
                    report.delete_failures.push((source.clone(), e.into()));
                }
            }
        }

        Ok(report)
    }
}

/// Sibling of `source` with the `.ofx` extension.
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("ofx")
}

// Progress output is best-effort; a closed stdout must not stop the batch.
fn progress<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = out.write_fmt(line).and_then(|()| out.write_all(b"\n")) {
        tracing::warn!("Could not write progress: {}", e);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::OfxConverter;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const HEADER: &str = "Transfer date,Description,Amount,Balance\n";

    fn write_csv(dir: &Path, name: &str, rows: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("{}{}", HEADER, rows)).unwrap();
        path
    }

    /// Records calls and fails for sources whose name contains "fail".
    #[derive(Default)]
    struct RecordingConverter {
        calls: RefCell<Vec<(PathBuf, PathBuf, String)>>,
    }

    impl Converter for RecordingConverter {
        fn convert(&self, source: &Path, destination: &Path, mapping: &FieldMapping) -> Result<()> {
            self.calls.borrow_mut().push((
                source.to_path_buf(),
                destination.to_path_buf(),
                mapping.account.clone(),
            ));
            if display_name(source).contains("fail") {
                return Err(Error::MissingField("Amount".into()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/tmp/123 Details(2).csv")),
            PathBuf::from("/tmp/123 Details(2).ofx")
        );
    }

    #[test]
    fn test_end_to_end_deletes_original() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(
            dir.path(),
            "987654321 Details.csv",
            "2024-01-15,Coffee Shop,-4.50,100.00\n",
        );

        let batch = BatchConverter::new(OfxConverter::default(), false);
        let mut out = Vec::new();
        let report = batch.run(&[source.clone()], &mut out).unwrap();

        let ofx = fs::read_to_string(dir.path().join("987654321 Details.ofx")).unwrap();
        assert!(ofx.contains("987654321"));
        assert!(ofx.contains("Coffee Shop"));
        assert!(ofx.contains("4.50"));
        assert!(!source.exists());
        assert_eq!(report.deleted, vec![source]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Converting 987654321 Details.csv to 987654321 Details.ofx..."));
        assert!(text.contains("All 1 files converted successfully."));
        assert!(text.contains("  Deleted 987654321 Details.csv"));
    }

    #[test]
    fn test_one_failure_keeps_every_original() {
        let dir = TempDir::new().unwrap();
        let good = write_csv(
            dir.path(),
            "111 Details.csv",
            "2024-01-15,Coffee Shop,-4.50,100.00\n",
        );
        let bad = write_csv(dir.path(), "222 Details.csv", "2024-01-15,Coffee Shop,oops,100.00\n");

        let batch = BatchConverter::new(OfxConverter::default(), false);
        let mut out = Vec::new();
        let report = batch.run(&[good.clone(), bad.clone()], &mut out).unwrap();

        assert_eq!(report.succeeded, vec![good.clone()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, bad);
        assert!(report.deleted.is_empty());
        assert!(!report.all_succeeded());

        assert!(good.exists());
        assert!(bad.exists());
        assert!(dir.path().join("111 Details.ofx").exists());
        assert!(!dir.path().join("222 Details.ofx").exists());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("1 files failed to convert. Not deleting any CSV files."));
    }

    #[test]
    fn test_keep_originals() {
        let dir = TempDir::new().unwrap();
        let first = write_csv(dir.path(), "111 Details.csv", "2024-01-15,Coffee,-4.50,100.00\n");
        let second = write_csv(dir.path(), "222 Details(1).csv", "2024-01-16,Rent,-900.00,50.00\n");

        let batch = BatchConverter::new(OfxConverter::default(), true);
        let report = batch.run(&[first.clone(), second.clone()], &mut Vec::new()).unwrap();

        assert!(report.all_succeeded());
        assert!(report.deleted.is_empty());
        assert!(first.exists());
        assert!(second.exists());
        assert!(dir.path().join("111 Details.ofx").exists());
        assert!(dir.path().join("222 Details(1).ofx").exists());
    }

    #[test]
    fn test_continues_after_failure() {
        let converter = RecordingConverter::default();
        let files = vec![
            PathBuf::from("/nowhere/1 Details fail.csv"),
            PathBuf::from("/nowhere/2 Details.csv"),
        ];

        let batch = BatchConverter::new(converter, false);
        let report = batch.run(&files, &mut Vec::new()).unwrap();

        let calls = batch.converter.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, PathBuf::from("/nowhere/1 Details fail.ofx"));
        assert_eq!(calls[1].2, "2");
        assert_eq!(report.succeeded, vec![files[1].clone()]);
        assert!(report.deleted.is_empty());
    }

    #[test]
    fn test_invalid_account_aborts_before_converting() {
        let converter = RecordingConverter::default();
        let files = vec![
            PathBuf::from("/nowhere/1 Details.csv"),
            PathBuf::from("/nowhere/abc Details.csv"),
        ];

        let batch = BatchConverter::new(converter, false);
        let result = batch.run(&files, &mut Vec::new());

        assert!(matches!(result, Err(Error::InvalidAccountNumber { .. })));
        assert!(batch.converter.calls.borrow().is_empty());
    }

    #[test]
    fn test_delete_failure_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let present = write_csv(dir.path(), "111 Details.csv", "2024-01-15,Coffee,-4.50,100.00\n");
        // Never created on disk, so removing it fails
        let missing = dir.path().join("222 Details.csv");

        let batch = BatchConverter::new(RecordingConverter::default(), false);
        let mut out = Vec::new();
        let report = batch.run(&[missing.clone(), present.clone()], &mut out).unwrap();

        assert_eq!(report.delete_failures.len(), 1);
        assert_eq!(report.delete_failures[0].0, missing);
        assert_eq!(report.deleted, vec![present.clone()]);
        assert!(!present.exists());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error deleting"));
    }

    /// Rejects every write, like stdout after the reading end of a pipe closed.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_output_does_not_stop_batch() {
        let dir = TempDir::new().unwrap();
        let first = write_csv(dir.path(), "111 Details.csv", "2024-01-15,Coffee,-4.50,100.00\n");
        let second = write_csv(dir.path(), "222 Details.csv", "2024-01-16,Rent,-900.00,50.00\n");

        let batch = BatchConverter::new(OfxConverter::default(), false);
        let report = batch.run(&[first.clone(), second.clone()], &mut ClosedPipe).unwrap();

        assert_eq!(report.succeeded, vec![first.clone(), second.clone()]);
        assert_eq!(report.deleted, vec![first.clone(), second.clone()]);
        assert!(dir.path().join("111 Details.ofx").exists());
        assert!(dir.path().join("222 Details.ofx").exists());
        assert!(!first.exists());
        assert!(!second.exists());
    }

    #[test]
    fn test_empty_batch() {
        let batch = BatchConverter::new(RecordingConverter::default(), false);
        let report = batch.run(&[], &mut Vec::new()).unwrap();

        assert!(report.succeeded.is_empty());
        assert!(report.all_succeeded());
    }
}
