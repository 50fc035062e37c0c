//! Common types shared by the mapping, the CSV reader and the OFX writer.

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

/// One row of a bank export, viewed through its header row.
///
/// Column order follows the file; lookups are by header name.
#[derive(Debug, Clone, Copy)]
pub struct TransactionRecord<'a> {
    headers: &'a StringRecord,
    values: &'a StringRecord,
}

impl<'a> TransactionRecord<'a> {
    /// Pair a data row with the header row it belongs to.
    pub fn new(headers: &'a StringRecord, values: &'a StringRecord) -> Self {
        Self { headers, values }
    }

    /// Value of the named column, if the column exists in this row.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self
            .headers
            .iter()
            .position(|header| header.trim_start_matches('\u{feff}').trim() == column)?;
        self.values.get(index)
    }

    /// True when every cell of the row is blank.
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|value| value.trim().is_empty())
    }
}

/// OFX transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Money leaving the account.
    Debit,
    /// Money entering the account.
    Credit,
}

impl TransactionType {
    /// The `TRNTYPE` value written to OFX.
    pub fn as_ofx(&self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
        }
    }
}

/// Represents a single converted transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// Financial institution transaction id.
    pub fit_id: String,

    /// Posting date.
    pub date: NaiveDate,

    /// Payee or description as exported.
    pub payee: String,

    /// Debit or credit.
    pub transaction_type: TransactionType,

    /// Signed amount.
    pub amount: Decimal,

    /// Running balance after this transaction, when the export has one.
    pub balance: Option<Decimal>,
}

/// Closing balance of a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerBalance {
    pub amount: Decimal,
    pub as_of: NaiveDate,
}

/// Account statement built from one export file.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Account number shown to the user.
    pub account: String,

    /// Account id written into `ACCTID`.
    pub account_id: String,

    /// Bank name.
    pub bank: String,

    /// Currency code for the account.
    pub currency: String,

    /// Transactions in file order.
    pub transactions: Vec<Transaction>,

    /// Balance after the most recent transaction.
    pub ledger_balance: Option<LedgerBalance>,
}

impl Statement {
    /// Create an empty statement.
    pub fn new(account: String, account_id: String, bank: String, currency: String) -> Self {
        Self {
            account,
            account_id,
            bank,
            currency,
            transactions: Vec::new(),
            ledger_balance: None,
        }
    }

    /// Add a transaction to the statement.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    /// Earliest and latest posting dates, if there are any transactions.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.transactions.iter().map(|tx| tx.date).min()?;
        let end = self.transactions.iter().map(|tx| tx.date).max()?;
        Some((start, end))
    }

    /// Transaction that carries the newest balance.
    ///
    /// Exports may be newest-first or oldest-first; the direction is taken
    /// from the first and last dates.
    pub fn most_recent(&self) -> Option<&Transaction> {
        let first = self.transactions.first()?;
        let last = self.transactions.last()?;
        if first.date > last.date {
            Some(first)
        } else {
            Some(last)
        }
    }
}
