//! Conversion of a single export file.
//!
//! The batch driver only sees the [`Converter`] trait: a source path, a
//! destination path and the [`FieldMapping`] for the source go in, and a plain
//! `Result` comes out.

use crate::csv_format::CsvStatement;
use crate::error::Result;
use crate::mapping::FieldMapping;
use crate::ofx_format::OfxStatement;
use crate::OfxVersion;
use std::fs::{self, File};
use std::path::Path;

/// Converts one source file into one destination file.
pub trait Converter {
    fn convert(&self, source: &Path, destination: &Path, mapping: &FieldMapping) -> Result<()>;
}

/// CSV to OFX converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfxConverter {
    pub version: OfxVersion,
}

impl OfxConverter {
    pub fn new(version: OfxVersion) -> Self {
        Self { version }
    }
}

impl Converter for OfxConverter {
    /// The destination is only created once the whole document has been
    /// rendered, so a failed conversion leaves nothing behind.
    fn convert(&self, source: &Path, destination: &Path, mapping: &FieldMapping) -> Result<()> {
        let mut input = File::open(source)?;
        let csv = CsvStatement::from_read(&mut input, mapping)?;

        let ofx = OfxStatement {
            statement: csv.statement,
        };
        let mut buffer = Vec::new();
        ofx.write_to(&mut buffer, self.version)?;

        fs::write(destination, buffer)?;

        tracing::debug!(
            "Wrote {} transactions to {}",
            ofx.statement.transactions.len(),
            destination.display()
        );
        Ok(())
    }
}
