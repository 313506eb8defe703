//! Ledger aggregator — nets the full transaction log into pairwise debts.
//!
//! The summary is recomputed from scratch on every call. Nothing is cached,
//! so undo and roster removal are reflected immediately.

use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::types::{NetDebt, Participant, ParticipantId, Transaction};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Netted view of a transaction log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    /// At most one entry per unordered pair, amount always positive.
    pub debts: Vec<NetDebt>,
    /// Signed standing per roster member: positive is owed, negative owes.
    pub positions: BTreeMap<ParticipantId, Decimal>,
}

impl LedgerSummary {
    /// Net position of a participant (zero if not on the roster).
    pub fn position(&self, id: ParticipantId) -> Decimal {
        self.positions.get(&id).copied().unwrap_or(Decimal::ZERO)
    }

    /// Sum of all positions. Zero for every well-formed summary.
    ///
    /// `None` if a running sum leaves `Decimal`'s range.
    pub fn total(&self) -> Option<Decimal> {
        self.positions
            .values()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
    }

    /// True when nobody owes anybody.
    pub fn is_settled(&self) -> bool {
        self.debts.is_empty()
    }

    /// Debts in which the participant is either side.
    pub fn debts_involving(&self, id: ParticipantId) -> impl Iterator<Item = &NetDebt> {
        self.debts
            .iter()
            .filter(move |d| d.debtor == id || d.creditor == id)
    }

    /// Debt between two participants, whichever direction it runs.
    pub fn debt_between(&self, a: ParticipantId, b: ParticipantId) -> Option<&NetDebt> {
        self.debts.iter().find(|d| {
            (d.debtor == a && d.creditor == b) || (d.debtor == b && d.creditor == a)
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Net the transaction log against the current roster.
///
/// Transactions naming anyone off the roster, or paying themselves, are
/// left out of the totals. So is any transaction or pair whose amount would
/// push a total out of `Decimal`'s range.
pub fn aggregate(transactions: &[Transaction], participants: &[Participant]) -> LedgerSummary {
    let roster: BTreeSet<ParticipantId> = participants.iter().map(|p| p.id).collect();

    // Directed flows: (from, to) -> total amount.
    let mut flows: HashMap<(ParticipantId, ParticipantId), Decimal> = HashMap::new();
    for tx in transactions {
        if tx.from == tx.to {
            debug!(tx = %tx.id, "Ignoring self-transfer");
            continue;
        }
        if !roster.contains(&tx.from) || !roster.contains(&tx.to) {
            debug!(
                tx = %tx.id,
                from = %tx.from,
                to = %tx.to,
                "Ignoring transaction with unknown participant"
            );
            continue;
        }
        let flow = flows.entry((tx.from, tx.to)).or_default();
        match flow.checked_add(tx.amount) {
            Some(sum) => *flow = sum,
            None => debug!(tx = %tx.id, amount = %tx.amount, "Flow overflowed, ignoring"),
        }
    }

    let flow = |from: ParticipantId, to: ParticipantId| {
        flows.get(&(from, to)).copied().unwrap_or(Decimal::ZERO)
    };

    let ids: Vec<ParticipantId> = roster.iter().copied().collect();
    let mut positions: BTreeMap<ParticipantId, Decimal> =
        ids.iter().map(|id| (*id, Decimal::ZERO)).collect();
    let mut debts = Vec::new();

    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let net = flow(a, b) - flow(b, a);
            let (debtor, creditor, amount) = match net.cmp(&Decimal::ZERO) {
                Ordering::Greater => (a, b, net),
                Ordering::Less => (b, a, -net),
                Ordering::Equal => continue,
            };
            let current = |id: ParticipantId| positions.get(&id).copied().unwrap_or(Decimal::ZERO);
            let owes = current(debtor).checked_sub(amount);
            let owed = current(creditor).checked_add(amount);
            let (Some(owes), Some(owed)) = (owes, owed) else {
                debug!(%debtor, %creditor, %amount, "Position overflowed, ignoring pair");
                continue;
            };
            positions.insert(debtor, owes);
            positions.insert(creditor, owed);
            debts.push(NetDebt {
                debtor,
                creditor,
                amount,
            });
        }
    }

    LedgerSummary { debts, positions }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
