//! Presentation helpers — money formatting and the round history view.
//!
//! The engine never formats anything; these helpers are what the HTTP layer
//! (or any other front end) uses to render engine output.

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Participant, ParticipantId, Transaction, TransactionKind, UNKNOWN_NAME};

// ---------------------------------------------------------------------------
// Money
// ---------------------------------------------------------------------------

/// Currency rendering rules. Defaults to Brazilian real style (`R$ 1.234,50`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoneyFormat {
    pub currency_symbol: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "R$".to_string(),
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
        }
    }
}

impl MoneyFormat {
    /// Format an amount with two decimals, e.g. `-R$ 12,00`.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = to_cents(amount);
        let sign = if rounded < Decimal::ZERO { "-" } else { "" };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        format!(
            "{sign}{} {}{}{cents}",
            self.currency_symbol,
            self.group_thousands(whole),
            self.decimal_separator,
        )
    }

    /// Like [`format`](Self::format) but with an explicit `+` on gains.
    pub fn format_signed(&self, amount: Decimal) -> String {
        let text = self.format(amount);
        if to_cents(amount) > Decimal::ZERO {
            format!("+{text}")
        } else {
            text
        }
    }

    fn group_thousands(&self, whole: &str) -> String {
        let len = whole.len();
        let mut out = String::with_capacity(len + len / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push_str(&self.thousands_separator);
            }
            out.push(ch);
        }
        out
    }
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One rendered line of the transaction history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub from: ParticipantId,
    pub from_name: String,
    pub to: ParticipantId,
    pub to_name: String,
    pub amount: Decimal,
    pub amount_display: String,
    pub kind: TransactionKind,
    pub label: &'static str,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
}

/// Name for a participant id, or the placeholder when it has been removed.
pub fn name_of(participants: &[Participant], id: ParticipantId) -> &str {
    participants
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.name.as_str())
        .unwrap_or(UNKNOWN_NAME)
}

/// `HH:MM` in the host's local time zone.
pub fn clock_time(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

/// Newest-first history of the log, names resolved against the roster.
pub fn history(
    transactions: &[Transaction],
    participants: &[Participant],
    money: &MoneyFormat,
) -> Vec<HistoryEntry> {
    transactions
        .iter()
        .rev()
        .map(|tx| HistoryEntry {
            id: tx.id,
            from: tx.from,
            from_name: name_of(participants, tx.from).to_string(),
            to: tx.to,
            to_name: name_of(participants, tx.to).to_string(),
            amount: tx.amount,
            amount_display: money.format(tx.amount),
            kind: tx.kind,
            label: tx.kind.label(),
            time: clock_time(&tx.timestamp),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
