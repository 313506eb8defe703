//! Round resolver — turns a round's outcomes into directed transactions.
//!
//! Also hosts the profit projector, which applies the same sign rules to an
//! unresolved round so the banker can preview the result before confirming.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use crate::types::{
    Outcome, Outcomes, ParticipantId, Transaction, TransactionKind, Wagers, MAX_STAKE,
};

/// Parse stake text into a positive amount.
///
/// Blank, non-numeric, zero, negative and above-`MAX_STAKE` inputs all yield
/// `None`. A comma is accepted as the decimal separator.
pub fn parse_stake(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    let stake = Decimal::from_str(&cleaned).ok()?;
    (stake > Decimal::ZERO && stake <= MAX_STAKE).then_some(stake)
}

/// Every (player, outcome, stake) triple that takes part in settlement.
///
/// Skips the banker, players without an outcome and players whose stake is
/// missing or invalid.
fn settled_entries<'a>(
    banker: ParticipantId,
    wagers: &'a Wagers,
    outcomes: &'a Outcomes,
) -> impl Iterator<Item = (ParticipantId, Outcome, Decimal)> + 'a {
    outcomes.iter().filter_map(move |(&player, &outcome)| {
        if player == banker {
            return None;
        }
        let raw = wagers.get(&player).map(String::as_str).unwrap_or("");
        match parse_stake(raw) {
            Some(stake) => Some((player, outcome, stake)),
            None => {
                debug!(participant = %player, raw, "Skipping invalid stake");
                None
            }
        }
    })
}

/// Resolve a round into transactions, one per settled player.
///
/// Without a banker nothing is produced. Output follows participant order.
pub fn resolve_round(
    banker: Option<ParticipantId>,
    wagers: &Wagers,
    outcomes: &Outcomes,
    at: DateTime<Utc>,
) -> Vec<Transaction> {
    let Some(banker) = banker else {
        debug!("No banker selected, round not resolved");
        return Vec::new();
    };

    settled_entries(banker, wagers, outcomes)
        .filter_map(|(player, outcome, stake)| {
            let Some(amount) = outcome.payout(stake) else {
                debug!(participant = %player, %stake, "Payout overflowed, skipping");
                return None;
            };
            let kind = TransactionKind::from(outcome);
            Some(match outcome {
                Outcome::BankerWon => Transaction::new(player, banker, amount, kind, at),
                Outcome::PlayerWon | Outcome::PlayerBlackjack => {
                    Transaction::new(banker, player, amount, kind, at)
                }
            })
        })
        .collect()
}

/// Banker's prospective net result for the round in progress.
///
/// Returns zero when no banker is selected.
pub fn project_round_profit(
    banker: Option<ParticipantId>,
    wagers: &Wagers,
    outcomes: &Outcomes,
) -> Decimal {
    let Some(banker) = banker else {
        return Decimal::ZERO;
    };
    settled_entries(banker, wagers, outcomes).fold(
        Decimal::ZERO,
        |total, (player, outcome, stake)| {
            match outcome.banker_delta(stake).and_then(|delta| total.checked_add(delta)) {
                Some(next) => next,
                None => {
                    debug!(participant = %player, %stake, "Projection overflowed, skipping");
                    total
                }
            }
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
