//! CSV reader for EQ Bank exports.
//!
//! Rows are read with the delimiter and header settings of a [`FieldMapping`]
//! and turned into a [`Statement`] using its extraction rules.

use crate::error::{Error, Result};
use crate::mapping::{FieldMapping, AMOUNT_COLUMN, DATE_COLUMN, PAYEE_COLUMN};
use crate::types::{LedgerBalance, Statement, Transaction, TransactionRecord};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::io::Read;
use std::str::FromStr;

/// Represents an EQ Bank CSV export.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvStatement {
    /// The underlying statement data.
    pub statement: Statement,
}

impl CsvStatement {
    /// Parse an export from any source implementing `Read`.
    ///
    /// # Arguments
    ///
    /// * `reader` - A mutable reference to a type implementing `Read`
    /// * `mapping` - The field mapping built for this export
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use std::path::Path;
    /// use eqconvert::csv_format::CsvStatement;
    /// use eqconvert::mapping::FieldMapping;
    ///
    /// let path = Path::new("123456789 Details.csv");
    /// let mapping = FieldMapping::for_file(path)?;
    /// let mut file = File::open(path)?;
    /// let statement = CsvStatement::from_read(&mut file, &mapping)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R, mapping: &FieldMapping) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(mapping.delimiter)
            .has_headers(mapping.has_header)
            .flexible(false)
            .from_reader(reader);

        let headers = if mapping.has_header {
            csv_reader.headers()?.clone()
        } else {
            StringRecord::new()
        };

        let mut statement = Statement::new(
            mapping.account.clone(),
            mapping.account_id.clone(),
            mapping.bank.to_string(),
            mapping.currency.to_string(),
        );

        for (ordinal, result) in csv_reader.records().enumerate() {
            let values = result?;
            let record = TransactionRecord::new(&headers, &values);

            // Trailing blank lines in some exports
            if record.is_blank() {
                continue;
            }

            let transaction = Self::map_record(&record, mapping, ordinal)?;
            statement.add_transaction(transaction);
        }

        statement.ledger_balance = statement.most_recent().and_then(|latest| {
            latest.balance.map(|amount| LedgerBalance {
                amount,
                as_of: latest.date,
            })
        });

        tracing::debug!(
            "Read {} transactions for account {}",
            statement.transactions.len(),
            statement.account
        );

        Ok(CsvStatement { statement })
    }

    fn map_record(
        record: &TransactionRecord<'_>,
        mapping: &FieldMapping,
        ordinal: usize,
    ) -> Result<Transaction> {
        let date_str = mapping
            .date(record)
            .ok_or_else(|| Error::MissingField(DATE_COLUMN.to_string()))?;
        let payee = mapping
            .payee(record)
            .ok_or_else(|| Error::MissingField(PAYEE_COLUMN.to_string()))?;
        let amount_str = mapping
            .amount(record)
            .ok_or_else(|| Error::MissingField(AMOUNT_COLUMN.to_string()))?;

        let date = Self::parse_date(date_str, mapping.date_fmt)?;
        let amount = Self::parse_amount(amount_str)?;
        let balance = match mapping.balance(record) {
            Some(value) if !value.trim().is_empty() => Some(Self::parse_amount(value)?),
            _ => None,
        };

        let fit_id = Self::fit_id(mapping, date_str, amount_str, payee, balance, ordinal);

        Ok(Transaction {
            fit_id,
            date,
            payee: payee.to_string(),
            transaction_type: mapping.transaction_type(record),
            amount,
            balance,
        })
    }

    fn parse_date(date_str: &str, format: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(date_str.trim(), format)
            .map_err(|_| Error::InvalidDate(date_str.to_string()))
    }

    fn parse_amount(amount_str: &str) -> Result<Decimal> {
        // Strip currency symbol and thousands separators
        let cleaned = amount_str.trim().replace(['$', ','], "");

        Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(amount_str.to_string()))
    }

    fn fit_id(
        mapping: &FieldMapping,
        date: &str,
        amount: &str,
        payee: &str,
        balance: Option<Decimal>,
        ordinal: usize,
    ) -> String {
        let balance = balance.map(|b| b.to_string()).unwrap_or_default();
        let key = format!(
            "{}|{}|{}|{}|{}|{}",
            mapping.account_id, date, amount, payee, balance, ordinal
        );
        format!("{:x}", md5::compute(key))
    }
}
