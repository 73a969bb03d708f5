//! Field codes of transaction columns.
//!
//! See the bank's API documentation (`API_Bankovnictvi.pdf`) for the
//! meaning of each code.

use crate::error::ParseError;
use crate::models::{Transaction, TransactionId};

use super::value::{parse_date, parse_decimal, parse_integer};

/// The closed set of column codes the API emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldCode {
    /// `0`, Datum.
    Date,
    /// `1`, Objem.
    Amount,
    /// `2`, Protiúčet.
    Account,
    /// `3`, Kód banky.
    BankCode,
    /// `4`, KS.
    ConstantSymbol,
    /// `5`, VS.
    VariableSymbol,
    /// `6`, SS.
    SpecificSymbol,
    /// `7`, Uživatelská identifikace.
    UserIdentification,
    /// `8`, Typ pohybu.
    Kind,
    /// `9`, Provedl. Recognized but not stored.
    Author,
    /// `10`, Název protiúčtu.
    AccountName,
    /// `12`, Název banky.
    BankName,
    /// `14`, Měna.
    Currency,
    /// `16`, Zpráva pro příjemce.
    RecipientMessage,
    /// `17`, ID pokynu.
    OrderId,
    /// `18`, Upřesnění.
    Specification,
    /// `22`, ID pohybu.
    TransactionId,
    /// `25`, Komentář.
    Comment,
    /// `26`, BIC.
    Bic,
    /// `27`, Reference plátce.
    PayerReference,
}

impl FieldCode {
    /// Looks up the `id` attribute of a column.
    pub(crate) fn from_code(code: &str) -> Option<Self> {
        let field = match code {
            "0" => Self::Date,
            "1" => Self::Amount,
            "2" => Self::Account,
            "3" => Self::BankCode,
            "4" => Self::ConstantSymbol,
            "5" => Self::VariableSymbol,
            "6" => Self::SpecificSymbol,
            "7" => Self::UserIdentification,
            "8" => Self::Kind,
            "9" => Self::Author,
            "10" => Self::AccountName,
            "12" => Self::BankName,
            "14" => Self::Currency,
            "16" => Self::RecipientMessage,
            "17" => Self::OrderId,
            "18" => Self::Specification,
            "22" => Self::TransactionId,
            "25" => Self::Comment,
            "26" => Self::Bic,
            "27" => Self::PayerReference,
            _ => return None,
        };
        Some(field)
    }

    /// Stores `value` into the matching attribute of `tx`.
    ///
    /// `element` names the column in error messages.
    pub(crate) fn apply(
        self,
        tx: &mut Transaction,
        element: &str,
        value: &str,
    ) -> Result<(), ParseError> {
        let text = || Some(value.to_owned());
        match self {
            Self::Date => tx.date = Some(parse_date(element, value)?),
            Self::Amount => tx.amount = Some(parse_decimal(element, value)?),
            Self::TransactionId => {
                tx.id = Some(TransactionId::new(parse_integer(element, value)?));
            }
            Self::Account => tx.account = text(),
            Self::BankCode => tx.bank_code = text(),
            Self::ConstantSymbol => tx.constant_symbol = text(),
            Self::VariableSymbol => tx.variable_symbol = text(),
            Self::SpecificSymbol => tx.specific_symbol = text(),
            Self::UserIdentification => tx.user_identification = text(),
            Self::Kind => tx.kind = text(),
            Self::AccountName => tx.account_name = text(),
            Self::BankName => tx.bank_name = text(),
            Self::Currency => tx.currency = text(),
            Self::RecipientMessage => tx.recipient_message = text(),
            Self::OrderId => tx.order_id = text(),
            Self::Specification => tx.specification = text(),
            Self::Comment => tx.comment = text(),
            Self::Bic => tx.bic = text(),
            Self::PayerReference => tx.payer_reference = text(),
            Self::Author => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(FieldCode::from_code("22"), Some(FieldCode::TransactionId));
        assert_eq!(FieldCode::from_code("0"), Some(FieldCode::Date));
        assert_eq!(FieldCode::from_code("9"), Some(FieldCode::Author));
    }

    #[test]
    fn unassigned_codes_are_unknown() {
        for code in ["11", "13", "15", "19", "23", "28", "", "01", "x"] {
            assert_eq!(FieldCode::from_code(code), None, "{code}");
        }
    }

    #[test]
    fn author_is_discarded() {
        let mut tx = Transaction::default();
        FieldCode::Author
            .apply(&mut tx, "column_9", "Novák, Jan")
            .unwrap();
        assert_eq!(tx, Transaction::default());
    }

    #[test]
    fn symbols_keep_leading_zeros() {
        let mut tx = Transaction::default();
        FieldCode::ConstantSymbol
            .apply(&mut tx, "column_4", "0558")
            .unwrap();
        assert_eq!(tx.constant_symbol.as_deref(), Some("0558"));
    }

    #[test]
    fn bad_amount_names_the_column() {
        let mut tx = Transaction::default();
        let err = FieldCode::Amount
            .apply(&mut tx, "column_1", "12,50")
            .unwrap_err();
        assert!(err.to_string().contains("column_1"));
    }
}
