use crate::bank::{CardCharge, Transaction, User, CARD_CHARGE};
use chrono::NaiveDate;

/// Plain transaction dated `YYYY-MM-DD`.
///
/// Panics on a malformed date; only meant for tests.
pub fn tx(id: &str, date: &str, amount_cents: i64) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap_or_else(|e| panic!("bad fixture date {date}: {e}")),
        amount_cents,
        kind: "transfer".to_string(),
        memo: None,
        card_charge: None,
    }
}

/// Card charge made by `user_id`.
pub fn card_tx(id: &str, date: &str, amount_cents: i64, user_id: &str) -> Transaction {
    Transaction {
        kind: CARD_CHARGE.to_string(),
        card_charge: Some(CardCharge {
            user: User {
                id: user_id.to_string(),
                full_name: String::new(),
            },
        }),
        ..tx(id, date, amount_cents)
    }
}

pub fn with_memo(mut transaction: Transaction, memo: &str) -> Transaction {
    transaction.memo = Some(memo.to_string());
    transaction
}
