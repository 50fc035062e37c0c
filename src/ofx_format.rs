//! OFX (Open Financial Exchange) serializer.
//!
//! The body is the same for every version; only the header block differs.
//! Version 1.0.2 uses the SGML header lines, version 2.2.0 an XML declaration
//! followed by the `<?OFX ...?>` processing instruction.

use crate::error::{Error, Result};
use crate::types::{Statement, Transaction};
use crate::OfxVersion;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::io::Write;

/// Represents an OFX bank statement.
#[derive(Debug, Clone, PartialEq)]
pub struct OfxStatement {
    /// The underlying statement data.
    pub statement: Statement,
}

impl OfxStatement {
    /// Write an OFX document to any destination implementing `Write`.
    ///
    /// # Arguments
    ///
    /// * `writer` - A mutable reference to a type implementing `Write`
    /// * `version` - OFX version used for the header block
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use eqconvert::ofx_format::OfxStatement;
    /// use eqconvert::types::Statement;
    /// use eqconvert::OfxVersion;
    ///
    /// let statement = Statement::new("123".into(), "123".into(), "EQ Bank".into(), "CAD".into());
    /// let ofx = OfxStatement { statement };
    /// let mut file = File::create("output.ofx")?;
    /// ofx.write_to(&mut file, OfxVersion::V220)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W, version: OfxVersion) -> Result<()> {
        let server_time = chrono::Local::now().naive_local();
        let body = self.to_xml(server_time)?;

        match version {
            OfxVersion::V102 => {
                writeln!(writer, "OFXHEADER:100")?;
                writeln!(writer, "DATA:OFXSGML")?;
                writeln!(writer, "VERSION:102")?;
                writeln!(writer, "SECURITY:NONE")?;
                writeln!(writer, "ENCODING:UTF-8")?;
                writeln!(writer, "CHARSET:NONE")?;
                writeln!(writer, "COMPRESSION:NONE")?;
                writeln!(writer, "OLDFILEUID:NONE")?;
                writeln!(writer, "NEWFILEUID:NONE")?;
                writeln!(writer)?;
            }
            OfxVersion::V220 => {
                writeln!(
                    writer,
                    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"
                )?;
                writeln!(
                    writer,
                    "<?OFX OFXHEADER=\"200\" VERSION=\"220\" SECURITY=\"NONE\" OLDFILEUID=\"NONE\" NEWFILEUID=\"NONE\"?>"
                )?;
            }
        }

        writeln!(writer, "{}", body)?;
        Ok(())
    }

    fn to_xml(&self, server_time: NaiveDateTime) -> Result<String> {
        let document = self.to_document(server_time);

        let mut xml = String::new();
        let mut serializer = quick_xml::se::Serializer::new(&mut xml);
        serializer.indent(' ', 2);
        document
            .serialize(serializer)
            .map_err(|e| Error::Xml(e.to_string()))?;

        Ok(xml)
    }

    fn to_document(&self, server_time: NaiveDateTime) -> OfxDocument {
        let stmt = &self.statement;
        let today = server_time.date();
        let (start, end) = stmt.date_range().unwrap_or((today, today));

        OfxDocument {
            signon: SignonMessagesXml {
                sonrs: SignonResponseXml {
                    status: StatusXml::ok(),
                    dt_server: server_time.format("%Y%m%d%H%M%S").to_string(),
                    language: "ENG".to_string(),
                    fi: FinancialInstitutionXml {
                        org: stmt.bank.clone(),
                    },
                },
            },
            bank: BankMessagesXml {
                stmt_trn_rs: StatementTransactionResponseXml {
                    trn_uid: "0".to_string(),
                    status: StatusXml::ok(),
                    stmt_rs: StatementResponseXml {
                        cur_def: stmt.currency.clone(),
                        bank_acct_from: BankAccountXml {
                            bank_id: stmt.bank.clone(),
                            acct_id: stmt.account_id.clone(),
                            acct_type: "CHECKING".to_string(),
                        },
                        bank_tran_list: BankTransactionListXml {
                            dt_start: format_date(&start),
                            dt_end: format_date(&end),
                            stmt_trn: stmt.transactions.iter().map(transaction_xml).collect(),
                        },
                        ledger_bal: stmt.ledger_balance.as_ref().map(|bal| LedgerBalanceXml {
                            bal_amt: bal.amount.to_string(),
                            dt_as_of: format_date(&bal.as_of),
                        }),
                    },
                },
            },
        }
    }
}

fn transaction_xml(tx: &Transaction) -> StatementTransactionXml {
    StatementTransactionXml {
        trn_type: tx.transaction_type.as_ofx().to_string(),
        dt_posted: format_date(&tx.date),
        trn_amt: tx.amount.to_string(),
        fit_id: tx.fit_id.clone(),
        name: tx.payee.clone(),
    }
}

fn format_date(date: &NaiveDate) -> String {
    format!("{}000000", date.format("%Y%m%d"))
}

// OFX structure definitions
#[derive(Debug, Serialize)]
#[serde(rename = "OFX")]
struct OfxDocument {
    #[serde(rename = "SIGNONMSGSRSV1")]
    signon: SignonMessagesXml,
    #[serde(rename = "BANKMSGSRSV1")]
    bank: BankMessagesXml,
}

#[derive(Debug, Serialize)]
struct SignonMessagesXml {
    #[serde(rename = "SONRS")]
    sonrs: SignonResponseXml,
}

#[derive(Debug, Serialize)]
struct SignonResponseXml {
    #[serde(rename = "STATUS")]
    status: StatusXml,
    #[serde(rename = "DTSERVER")]
    dt_server: String,
    #[serde(rename = "LANGUAGE")]
    language: String,
    #[serde(rename = "FI")]
    fi: FinancialInstitutionXml,
}

#[derive(Debug, Serialize)]
struct StatusXml {
    #[serde(rename = "CODE")]
    code: String,
    #[serde(rename = "SEVERITY")]
    severity: String,
}

impl StatusXml {
    fn ok() -> Self {
        Self {
            code: "0".to_string(),
            severity: "INFO".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FinancialInstitutionXml {
    #[serde(rename = "ORG")]
    org: String,
}

#[derive(Debug, Serialize)]
struct BankMessagesXml {
    #[serde(rename = "STMTTRNRS")]
    stmt_trn_rs: StatementTransactionResponseXml,
}

#[derive(Debug, Serialize)]
struct StatementTransactionResponseXml {
    #[serde(rename = "TRNUID")]
    trn_uid: String,
    #[serde(rename = "STATUS")]
    status: StatusXml,
    #[serde(rename = "STMTRS")]
    stmt_rs: StatementResponseXml,
}

#[derive(Debug, Serialize)]
struct StatementResponseXml {
    #[serde(rename = "CURDEF")]
    cur_def: String,
    #[serde(rename = "BANKACCTFROM")]
    bank_acct_from: BankAccountXml,
    #[serde(rename = "BANKTRANLIST")]
    bank_tran_list: BankTransactionListXml,
    #[serde(rename = "LEDGERBAL", skip_serializing_if = "Option::is_none")]
    ledger_bal: Option<LedgerBalanceXml>,
}

#[derive(Debug, Serialize)]
struct BankAccountXml {
    #[serde(rename = "BANKID")]
    bank_id: String,
    #[serde(rename = "ACCTID")]
    acct_id: String,
    #[serde(rename = "ACCTTYPE")]
    acct_type: String,
}

#[derive(Debug, Serialize)]
struct BankTransactionListXml {
    #[serde(rename = "DTSTART")]
    dt_start: String,
    #[serde(rename = "DTEND")]
    dt_end: String,
    #[serde(rename = "STMTTRN")]
    stmt_trn: Vec<StatementTransactionXml>,
}

#[derive(Debug, Serialize)]
struct StatementTransactionXml {
    #[serde(rename = "TRNTYPE")]
    trn_type: String,
    #[serde(rename = "DTPOSTED")]
    dt_posted: String,
    #[serde(rename = "TRNAMT")]
    trn_amt: String,
    #[serde(rename = "FITID")]
    fit_id: String,
    #[serde(rename = "NAME")]
    name: String,
}

#[derive(Debug, Serialize)]
struct LedgerBalanceXml {
    #[serde(rename = "BALAMT")]
    bal_amt: String,
    #[serde(rename = "DTASOF")]
    dt_as_of: String,
}
