//! Field mapping for EQ Bank transaction exports.
//!
//! A [`FieldMapping`] is built once per export file, since the account number
//! comes from the file name. Everything else in it is fixed to the layout EQ
//! Bank uses:
//!
//! ```text
//! Transfer date,Description,Amount,Balance
//! 2024-01-15,Coffee Shop,-4.50,100.00
//! ```

use crate::error::{Error, Result};
use crate::types::{TransactionRecord, TransactionType};
use std::path::Path;

pub const DATE_COLUMN: &str = "Transfer date";
pub const PAYEE_COLUMN: &str = "Description";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const BALANCE_COLUMN: &str = "Balance";

/// Describes how one export row becomes one OFX transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub has_header: bool,
    pub bank: &'static str,
    pub currency: &'static str,
    pub delimiter: u8,
    pub account: String,
    pub account_id: String,
    pub date_fmt: &'static str,
}

impl FieldMapping {
    /// Build the mapping for the export at `path`.
    ///
    /// Fails with [`Error::InvalidAccountNumber`] when the file name does not
    /// start with the account number.
    pub fn for_file(path: &Path) -> Result<Self> {
        let account = account_number_from_path(path)?;

        Ok(Self {
            has_header: true,
            bank: "EQ Bank",
            currency: "CAD",
            delimiter: b',',
            account_id: account.clone(),
            account,
            date_fmt: "%Y-%m-%d",
        })
    }

    pub fn date<'a>(&self, record: &TransactionRecord<'a>) -> Option<&'a str> {
        record.get(DATE_COLUMN)
    }

    pub fn payee<'a>(&self, record: &TransactionRecord<'a>) -> Option<&'a str> {
        record.get(PAYEE_COLUMN)
    }

    /// `DEBIT` for negative amounts, `CREDIT` otherwise (including a missing amount).
    pub fn transaction_type(&self, record: &TransactionRecord<'_>) -> TransactionType {
        if record.get(AMOUNT_COLUMN).unwrap_or("").starts_with('-') {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }

    pub fn amount<'a>(&self, record: &TransactionRecord<'a>) -> Option<&'a str> {
        record.get(AMOUNT_COLUMN)
    }

    pub fn balance<'a>(&self, record: &TransactionRecord<'a>) -> Option<&'a str> {
        record.get(BALANCE_COLUMN)
    }
}

/// Account number encoded as the first word of an export's file name.
///
/// `"123456789 Details.csv"` yields `"123456789"`.
pub fn account_number_from_path(path: &Path) -> Result<String> {
    let invalid = || Error::InvalidAccountNumber {
        file: path.to_path_buf(),
    };

    let file_name = path.file_name().and_then(|name| name.to_str()).ok_or_else(invalid)?;
    let token = file_name.split_whitespace().next().ok_or_else(invalid)?;

    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(token.to_string())
}
