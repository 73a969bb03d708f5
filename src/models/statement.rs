//! Statement header and container.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AccountId, Transaction};

/// Header of one statement or period query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementInfo {
    /// Account number.
    pub account_id: AccountId,
    /// Bank code of the account.
    pub bank_id: String,
    /// Account currency.
    pub currency: String,
    /// Account IBAN.
    pub iban: String,
    /// BIC of the account's bank.
    pub bic: String,
    /// Balance at the start of the period.
    pub opening_balance: Decimal,
    /// Balance at the end of the period.
    pub closing_balance: Decimal,
    /// First day of the period.
    pub date_start: DateTime<FixedOffset>,
    /// Last day of the period.
    pub date_end: DateTime<FixedOffset>,
    /// Statement year, for statements fetched by id.
    pub year_list: i64,
    /// Statement number, for statements fetched by id.
    pub id_list: i64,
    /// First movement id in the response.
    pub id_from: i64,
    /// Last movement id in the response.
    pub id_to: i64,
    /// Server-side "last downloaded" cursor.
    pub id_last_download: i64,
}

/// A parsed statement: header plus movements in server order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Statement header.
    pub info: StatementInfo,
    /// Movements, in the order the server sent them.
    pub transactions: Vec<Transaction>,
}
