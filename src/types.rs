//! Shared types for the banca ledger.
//!
//! These types form the data model used by the resolver, the aggregator,
//! the session and the HTTP layer. Amounts are always `rust_decimal::Decimal`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Payout multiplier applied to the stake when a player hits blackjack.
pub const BLACKJACK_PAYOUT: Decimal = dec!(2.5);

/// Largest stake accepted for a single player in one round.
///
/// Keeps payouts and ledger totals far inside `Decimal`'s range.
pub const MAX_STAKE: Decimal = dec!(1000000000);

/// Name shown for a transaction counterparty that is no longer on the roster.
pub const UNKNOWN_NAME: &str = "???";

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

/// Identity of a participant within one session.
///
/// Ids are handed out monotonically by the session, so ordering by id is
/// the same as ordering by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered player at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Uppercase first character of the name.
    pub avatar: String,
}

impl Participant {
    /// Build a participant from a raw name. Returns `None` for blank names.
    pub fn new(id: ParticipantId, name: &str) -> Option<Self> {
        let name = name.trim();
        let first = name.chars().next()?;
        Some(Self {
            id,
            name: name.to_string(),
            avatar: first.to_uppercase().collect(),
        })
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.name, self.id)
    }
}

// ---------------------------------------------------------------------------
// Round inputs
// ---------------------------------------------------------------------------

/// How a single player's hand ended against the banker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    BankerWon,
    PlayerWon,
    PlayerBlackjack,
}

impl Outcome {
    /// All outcomes, in the order they are offered to the table.
    pub const ALL: &'static [Outcome] = &[
        Outcome::BankerWon,
        Outcome::PlayerWon,
        Outcome::PlayerBlackjack,
    ];

    /// Amount that changes hands for this outcome on the given stake.
    ///
    /// `None` if the payout does not fit in a `Decimal`.
    pub fn payout(&self, stake: Decimal) -> Option<Decimal> {
        match self {
            Outcome::BankerWon | Outcome::PlayerWon => Some(stake),
            Outcome::PlayerBlackjack => stake.checked_mul(BLACKJACK_PAYOUT),
        }
    }

    /// Banker's signed result for this outcome on the given stake.
    pub fn banker_delta(&self, stake: Decimal) -> Option<Decimal> {
        let amount = self.payout(stake)?;
        match self {
            Outcome::BankerWon => Some(amount),
            Outcome::PlayerWon | Outcome::PlayerBlackjack => Some(-amount),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::BankerWon => write!(f, "banker won"),
            Outcome::PlayerWon => write!(f, "player won"),
            Outcome::PlayerBlackjack => write!(f, "blackjack"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "banker_won" | "banker" | "lost" => Ok(Outcome::BankerWon),
            "player_won" | "player" | "won" => Ok(Outcome::PlayerWon),
            "player_blackjack" | "blackjack" | "bj" => Ok(Outcome::PlayerBlackjack),
            _ => Err(anyhow::anyhow!("Unknown outcome: {s}")),
        }
    }
}

/// Stake text per participant, as typed at the table.
pub type Wagers = BTreeMap<ParticipantId, String>;

/// Recorded outcome per non-banker participant. Absent means "sat out".
pub type Outcomes = BTreeMap<ParticipantId, Outcome>;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Why money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    BankerWinsFromPlayer,
    BankerPaysPlayer,
    BankerPaysBlackjack,
}

impl TransactionKind {
    /// Short label used in the round history.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::BankerWinsFromPlayer => "Banker won",
            TransactionKind::BankerPaysPlayer => "Player won",
            TransactionKind::BankerPaysBlackjack => "BJ (x2.5)",
        }
    }
}

impl From<Outcome> for TransactionKind {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::BankerWon => TransactionKind::BankerWinsFromPlayer,
            Outcome::PlayerWon => TransactionKind::BankerPaysPlayer,
            Outcome::PlayerBlackjack => TransactionKind::BankerPaysBlackjack,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An immutable, directed transfer recorded in the session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub from: ParticipantId,
    pub to: ParticipantId,
    /// Always strictly positive.
    pub amount: Decimal,
    /// Display only; never used in computation.
    pub timestamp: DateTime<Utc>,
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(
        from: ParticipantId,
        to: ParticipantId,
        amount: Decimal,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            amount,
            timestamp,
            kind,
        }
    }

    /// Whether this transaction moves money to or from the given participant.
    pub fn involves(&self, id: ParticipantId) -> bool {
        self.from == id || self.to == id
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} -> #{} {} [{}]",
            self.from, self.to, self.amount, self.kind
        )
    }
}

/// One netted obligation between a pair of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDebt {
    pub debtor: ParticipantId,
    pub creditor: ParticipantId,
    /// Always strictly positive.
    pub amount: Decimal,
}

impl fmt::Display for NetDebt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} owes #{} {}", self.debtor, self.creditor, self.amount)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a session command did nothing.
///
/// Every `Err` returned by the session leaves its state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid stake for participant #{participant}: {raw:?}")]
    InvalidStake { participant: ParticipantId, raw: String },

    #[error("No banker selected")]
    NoBankerSelected,

    #[error("Unknown participant: #{0}")]
    UnknownParticipant(ParticipantId),

    #[error("Nothing to undo")]
    EmptyUndo,

    #[error("A round is in progress; confirm it before editing players")]
    RoundInProgress,

    #[error("The banker (#{0}) cannot have an outcome")]
    OutcomeForBanker(ParticipantId),

    #[error("Participant name cannot be empty")]
    EmptyName,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
