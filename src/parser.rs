//! Decoder for the XML "transactions" format.
//!
//! A statement arrives as an `<AccountStatement>` document with an `<Info>`
//! header and a `<TransactionList>` of `<Transaction>` nodes. Each node is a
//! list of generic `<column_N id="N" name="…">` elements; the numeric `id`
//! decides which [`Transaction`] attribute the text belongs to.
//!
//! ```
//! let xml = br#"<AccountStatement>
//!   <Info>
//!     <accountId>2501201133</accountId>
//!     <openingBalance>0.00</openingBalance>
//!     <closingBalance>45.97</closingBalance>
//!     <dateStart>2017-01-01+01:00</dateStart>
//!     <dateEnd>2017-05-01+02:00</dateEnd>
//!   </Info>
//!   <TransactionList>
//!     <Transaction>
//!       <column_1 name="Objem" id="1">45.97</column_1>
//!     </Transaction>
//!   </TransactionList>
//! </AccountStatement>"#;
//!
//! let statement = fio_rs::parser::parse_statement_bytes(xml).unwrap();
//! assert_eq!(statement.transactions.len(), 1);
//! assert_eq!(statement.info.closing_balance.to_string(), "45.97");
//! ```

mod column;
#[cfg(test)]
pub(crate) mod fixtures;
mod tree;
mod value;

use std::io::BufRead;

use crate::error::ParseError;
use crate::models::{AccountId, Statement, StatementInfo, Transaction};

use column::FieldCode;
use tree::Element;

/// Root element of a statement document.
const STATEMENT_ROOT: &str = "AccountStatement";

/// Root element of an error document.
const ERROR_ROOT: &str = "response";

/// Error document returned with some 500 responses.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    /// Numeric error code as text.
    pub error_code: String,
    /// Status label.
    pub status: String,
    /// Human-readable message.
    pub message: String,
    /// Additional detail.
    pub detail: String,
}

/// Parses a statement document.
///
/// The whole document is rejected on the first problem; there are no
/// partial results.
///
/// # Errors
///
/// Returns a [`ParseError`] if the XML is malformed, a required header
/// element is missing, a number or date does not parse, or a transaction
/// column carries an unknown field code.
#[inline]
pub fn parse_statement<R: BufRead>(reader: R) -> Result<Statement, ParseError> {
    let root = tree::read_document(reader)?;
    expect_root(&root, STATEMENT_ROOT)?;

    let info = root
        .child("Info")
        .ok_or(ParseError::MissingElement("Info"))
        .and_then(parse_info)?;
    let transactions = root
        .child("TransactionList")
        .map_or_else(
            || Ok(Vec::new()),
            |list| {
                list.children_named("Transaction")
                    .map(parse_transaction)
                    .collect::<Result<Vec<_>, _>>()
            },
        )?;

    tracing::trace!(
        account_id = %info.account_id,
        transactions = transactions.len(),
        "parsed statement"
    );
    Ok(Statement { info, transactions })
}

/// Parses a statement held in memory.
///
/// # Errors
///
/// See [`parse_statement`].
#[inline]
pub fn parse_statement_bytes(bytes: &[u8]) -> Result<Statement, ParseError> {
    parse_statement(bytes)
}

/// Parses an error envelope:
/// `<response><result><errorCode/><status/><message/><detail/></result></response>`.
///
/// Missing leaf elements decode as empty strings.
///
/// # Errors
///
/// Returns a [`ParseError`] if the XML is malformed or has the wrong shape.
#[inline]
pub fn parse_error_envelope<R: BufRead>(reader: R) -> Result<ErrorEnvelope, ParseError> {
    let root = tree::read_document(reader)?;
    expect_root(&root, ERROR_ROOT)?;
    let result = root
        .child("result")
        .ok_or(ParseError::MissingElement("result"))?;
    Ok(ErrorEnvelope {
        error_code: text_or_default(result, "errorCode"),
        status: text_or_default(result, "status"),
        message: text_or_default(result, "message"),
        detail: text_or_default(result, "detail"),
    })
}

/// Checks the root element name.
fn expect_root(root: &Element, expected: &'static str) -> Result<(), ParseError> {
    if root.name == expected {
        Ok(())
    } else {
        Err(ParseError::UnexpectedRoot {
            expected,
            found: root.name.clone(),
        })
    }
}

/// Decodes the `<Info>` header.
fn parse_info(info: &Element) -> Result<StatementInfo, ParseError> {
    Ok(StatementInfo {
        account_id: AccountId::new(value::parse_integer(
            "accountId",
            required_text(info, "accountId")?,
        )?),
        bank_id: text_or_default(info, "bankId"),
        currency: text_or_default(info, "currency"),
        iban: text_or_default(info, "iban"),
        bic: text_or_default(info, "bic"),
        opening_balance: value::parse_decimal(
            "openingBalance",
            required_text(info, "openingBalance")?,
        )?,
        closing_balance: value::parse_decimal(
            "closingBalance",
            required_text(info, "closingBalance")?,
        )?,
        date_start: value::parse_date("dateStart", required_text(info, "dateStart")?)?,
        date_end: value::parse_date("dateEnd", required_text(info, "dateEnd")?)?,
        year_list: optional_integer(info, "yearList")?,
        id_list: optional_integer(info, "idList")?,
        id_from: optional_integer(info, "idFrom")?,
        id_to: optional_integer(info, "idTo")?,
        id_last_download: optional_integer(info, "idLastDownload")?,
    })
}

/// Decodes one `<Transaction>` node column by column.
fn parse_transaction(node: &Element) -> Result<Transaction, ParseError> {
    let mut tx = Transaction::default();
    for column in &node.children {
        let code = column.attribute("id").ok_or_else(|| {
            ParseError::Malformed(format!("column <{}> has no id attribute", column.name))
        })?;
        let field = FieldCode::from_code(code).ok_or_else(|| ParseError::UnknownColumn {
            code: code.to_owned(),
            name: column.attribute("name").unwrap_or(&column.name).to_owned(),
        })?;
        field.apply(&mut tx, &column.name, &column.text)?;
    }
    Ok(tx)
}

/// Text of a required child element.
fn required_text<'doc>(parent: &'doc Element, name: &'static str) -> Result<&'doc str, ParseError> {
    parent
        .child(name)
        .map(|child| child.text.as_str())
        .ok_or(ParseError::MissingElement(name))
}

/// Text of an optional child element, empty when absent.
fn text_or_default(parent: &Element, name: &str) -> String {
    parent
        .child(name)
        .map(|child| child.text.clone())
        .unwrap_or_default()
}

/// Integer child element; absent or blank means zero.
fn optional_integer(parent: &Element, name: &str) -> Result<i64, ParseError> {
    match parent.child(name) {
        Some(child) if !child.text.trim().is_empty() => value::parse_integer(name, &child.text),
        Some(_) | None => Ok(0),
    }
}
