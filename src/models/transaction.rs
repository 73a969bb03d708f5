//! Transaction model.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TransactionId;

/// One movement on the account.
///
/// The API only emits a column when it has a value, so every attribute is
/// optional. Symbols are kept as strings: they may carry leading zeros.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Movement id.
    pub id: Option<TransactionId>,
    /// Booking date, local midnight in the offset sent by the server.
    pub date: Option<DateTime<FixedOffset>>,
    /// Signed amount; positive is a credit, negative a debit.
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Counter-account number.
    pub account: Option<String>,
    /// Counter-account name.
    pub account_name: Option<String>,
    /// Counter-account bank code.
    pub bank_code: Option<String>,
    /// Counter-account bank name.
    pub bank_name: Option<String>,
    /// Constant symbol.
    pub constant_symbol: Option<String>,
    /// Variable symbol.
    pub variable_symbol: Option<String>,
    /// Specific symbol.
    pub specific_symbol: Option<String>,
    /// User identification.
    pub user_identification: Option<String>,
    /// Message for the recipient.
    pub recipient_message: Option<String>,
    /// Movement type label (e.g. "Bezhotovostní příjem").
    pub kind: Option<String>,
    /// Payment specification (Upřesnění).
    pub specification: Option<String>,
    /// Comment.
    pub comment: Option<String>,
    /// BIC of the counter-party bank.
    pub bic: Option<String>,
    /// Payment order id.
    pub order_id: Option<String>,
    /// Payer reference.
    pub payer_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_values() {
        let tx = Transaction::default();
        assert!(tx.id.is_none());
        assert!(tx.amount.is_none());
        assert!(tx.comment.is_none());
    }

    #[test]
    fn serializes_amount_without_float_drift() {
        let tx = Transaction {
            amount: Some("45.97".parse().unwrap()),
            constant_symbol: Some("0558".to_owned()),
            ..Transaction::default()
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["amount"], "45.97");
        assert_eq!(json["constantSymbol"], "0558");
    }
}
