use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentKind {
    Sale,
    Payout,
}

impl PaymentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentKind::Sale => "sale",
            PaymentKind::Payout => "payout",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(PaymentKind::Sale),
            "payout" => Some(PaymentKind::Payout),
            _ => None,
        }
    }
}

impl Display for PaymentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
