use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Transaction `type` value for card charges.
pub const CARD_CHARGE: &str = "card_charge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub users: Vec<User>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardCharge {
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    /// Signed; negative is an outflow.
    pub amount_cents: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub card_charge: Option<CardCharge>,
}

impl Transaction {
    pub fn is_outflow(&self) -> bool {
        self.amount_cents < 0
    }

    pub fn is_card_charge(&self) -> bool {
        self.kind == CARD_CHARGE
    }

    /// User behind the embedded card charge record, if any.
    pub fn charged_user_id(&self) -> Option<&str> {
        self.card_charge.as_ref().map(|charge| charge.user.id.as_str())
    }

    pub fn memo(&self) -> &str {
        self.memo.as_deref().unwrap_or_default()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn abs_cents(&self) -> i64 {
        self.amount_cents.abs()
    }
}
