//! EQ Bank statement converter library.
//!
//! Finds transaction exports downloaded from EQ Bank, converts each one to
//! OFX and optionally removes the originals once every file converted.
//!
//! # Export files
//!
//! EQ Bank names its exports after the account number, e.g.
//! `123456789 Details.csv` or `123456789 Details(2).csv` when the browser had
//! to de-duplicate the name. The account number in the file name is the only
//! place the account appears, so a [`mapping::FieldMapping`] is built per file.
//!
//! # Examples
//!
//! ## Converting everything in a directory
//!
//! ```no_run
//! use std::path::Path;
//! use eqconvert::batch::BatchConverter;
//! use eqconvert::conversion::OfxConverter;
//! use eqconvert::locator::find_csv_files;
//!
//! let files = find_csv_files(Path::new("/home/me/Downloads"))?;
//! let batch = BatchConverter::new(OfxConverter::default(), true);
//! let report = batch.run(&files, &mut std::io::stdout())?;
//! println!("{} converted", report.succeeded.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod batch;
pub mod conversion;
pub mod csv_format;
pub mod error;
pub mod locator;
pub mod mapping;
pub mod ofx_format;
pub mod types;

use std::str::FromStr;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{Statement, Transaction, TransactionType};

/// Supported OFX versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OfxVersion {
    /// OFX 1.0.2, SGML header
    #[default]
    V102,
    /// OFX 2.2.0, XML header
    V220,
}

impl FromStr for OfxVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "102" | "1.0.2" | "1" | "sgml" => Ok(OfxVersion::V102),
            "220" | "2.2.0" | "2" | "xml" => Ok(OfxVersion::V220),
            _ => Err(Error::InvalidOfxVersion(s.to_string())),
        }
    }
}
