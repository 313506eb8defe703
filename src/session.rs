//! Session — the single explicit owner of all table state.
//!
//! Holds the roster, the append-only transaction log and the round in
//! progress (banker, wagers, outcomes). Every command either applies fully
//! or returns a [`LedgerError`] and leaves the session untouched.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::display::{self, HistoryEntry, MoneyFormat};
use crate::engine::{aggregate, parse_stake, project_round_profit, resolve_round, LedgerSummary};
use crate::types::{
    LedgerError, Outcome, Outcomes, Participant, ParticipantId, Transaction, Wagers,
};

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of transaction timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    participants: Vec<Participant>,
    transactions: Vec<Transaction>,
    banker: Option<ParticipantId>,
    base_bet: String,
    wagers: Wagers,
    outcomes: Outcomes,
    next_id: u64,
    clock: Box<dyn Clock>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new("")
    }
}

impl Session {
    /// Empty session whose new players start with `base_bet` as their stake.
    pub fn new(base_bet: impl Into<String>) -> Self {
        Self::with_clock(base_bet, Box::new(SystemClock))
    }

    pub fn with_clock(base_bet: impl Into<String>, clock: Box<dyn Clock>) -> Self {
        Self {
            participants: Vec::new(),
            transactions: Vec::new(),
            banker: None,
            base_bet: base_bet.into(),
            wagers: Wagers::new(),
            outcomes: Outcomes::new(),
            next_id: 1,
            clock,
        }
    }

    pub fn from_config(cfg: &SessionConfig) -> Self {
        Self::new(cfg.base_bet.clone())
    }

    // -- Accessors ----------------------------------------------------------

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Display name, or `???` for ids no longer on the roster.
    pub fn name_of(&self, id: ParticipantId) -> &str {
        display::name_of(&self.participants, id)
    }

    /// The log in append order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn banker(&self) -> Option<ParticipantId> {
        self.banker
    }

    pub fn base_bet(&self) -> &str {
        &self.base_bet
    }

    pub fn wagers(&self) -> &Wagers {
        &self.wagers
    }

    pub fn wager(&self, id: ParticipantId) -> Option<&str> {
        self.wagers.get(&id).map(String::as_str)
    }

    /// Parsed stake for a player, or why it would be skipped at resolution.
    pub fn stake(&self, id: ParticipantId) -> Result<Decimal, LedgerError> {
        self.require(id)?;
        let raw = self.wager(id).unwrap_or_default();
        parse_stake(raw).ok_or_else(|| LedgerError::InvalidStake {
            participant: id,
            raw: raw.to_string(),
        })
    }

    pub fn outcomes(&self) -> &Outcomes {
        &self.outcomes
    }

    pub fn outcome(&self, id: ParticipantId) -> Option<Outcome> {
        self.outcomes.get(&id).copied()
    }

    /// Any outcome recorded for the current round.
    pub fn is_round_in_progress(&self) -> bool {
        !self.outcomes.is_empty()
    }

    /// Banker selected and at least one outcome recorded.
    pub fn is_round_valid(&self) -> bool {
        self.banker.is_some() && self.is_round_in_progress()
    }

    fn require(&self, id: ParticipantId) -> Result<(), LedgerError> {
        match self.participant(id) {
            Some(_) => Ok(()),
            None => Err(LedgerError::UnknownParticipant(id)),
        }
    }

    // -- Roster -------------------------------------------------------------

    /// Register a player. The first player registered becomes banker.
    pub fn add_participant(&mut self, name: &str) -> Result<ParticipantId, LedgerError> {
        if self.is_round_in_progress() {
            return Err(LedgerError::RoundInProgress);
        }
        let id = ParticipantId(self.next_id);
        let participant = Participant::new(id, name).ok_or(LedgerError::EmptyName)?;

        self.next_id += 1;
        self.wagers.insert(id, self.base_bet.clone());
        if self.participants.is_empty() {
            self.banker = Some(id);
        }
        info!(participant = %id, name = %participant.name, "Participant added");
        self.participants.push(participant);
        Ok(id)
    }

    /// Remove a player along with every transaction that mentions them.
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<Participant, LedgerError> {
        if self.is_round_in_progress() {
            return Err(LedgerError::RoundInProgress);
        }
        let index = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(LedgerError::UnknownParticipant(id))?;

        let removed = self.participants.remove(index);
        let before = self.transactions.len();
        self.transactions.retain(|tx| !tx.involves(id));
        self.wagers.remove(&id);
        self.outcomes.remove(&id);
        if self.banker == Some(id) {
            self.banker = None;
        }
        info!(
            participant = %id,
            name = %removed.name,
            transactions_dropped = before - self.transactions.len(),
            "Participant removed"
        );
        Ok(removed)
    }

    // -- Round setup --------------------------------------------------------

    /// Hand the bank to a player. Any outcome they had is dropped.
    pub fn set_banker(&mut self, id: ParticipantId) -> Result<(), LedgerError> {
        self.require(id)?;
        self.banker = Some(id);
        self.outcomes.remove(&id);
        debug!(banker = %id, "Banker selected");
        Ok(())
    }

    pub fn clear_banker(&mut self) {
        self.banker = None;
    }

    /// Change the base bet and apply it to every player's stake.
    pub fn apply_base_bet(&mut self, amount: &str) {
        self.base_bet = amount.to_string();
        for p in &self.participants {
            self.wagers.insert(p.id, self.base_bet.clone());
        }
        debug!(base_bet = %self.base_bet, "Base bet applied to all players");
    }

    /// Edit one player's stake. The text is validated only at resolution.
    pub fn set_wager(&mut self, id: ParticipantId, amount: &str) -> Result<(), LedgerError> {
        self.require(id)?;
        self.wagers.insert(id, amount.to_string());
        Ok(())
    }

    /// Record an outcome, or clear it when the same outcome is set again.
    ///
    /// Returns the player's outcome after the toggle.
    pub fn toggle_outcome(
        &mut self,
        id: ParticipantId,
        outcome: Outcome,
    ) -> Result<Option<Outcome>, LedgerError> {
        self.require(id)?;
        if self.banker == Some(id) {
            return Err(LedgerError::OutcomeForBanker(id));
        }
        if self.outcomes.get(&id) == Some(&outcome) {
            self.outcomes.remove(&id);
            Ok(None)
        } else {
            self.outcomes.insert(id, outcome);
            Ok(Some(outcome))
        }
    }

    /// Banker's result if the round were confirmed now.
    pub fn projected_profit(&self) -> Decimal {
        project_round_profit(self.banker, &self.wagers, &self.outcomes)
    }

    // -- Round commit & undo -----------------------------------------------

    /// Resolve the round, append its transactions and start a fresh round.
    ///
    /// Stakes carry over to the next round; outcomes do not.
    pub fn confirm_round(&mut self) -> Result<Vec<Transaction>, LedgerError> {
        let banker = self.banker.ok_or(LedgerError::NoBankerSelected)?;
        let txs = resolve_round(Some(banker), &self.wagers, &self.outcomes, self.clock.now());

        self.outcomes.clear();
        self.transactions.extend(txs.iter().cloned());
        info!(
            banker = %banker,
            transactions = txs.len(),
            log_len = self.transactions.len(),
            "Round confirmed"
        );
        Ok(txs)
    }

    /// Drop the most recently appended transaction.
    pub fn undo_last(&mut self) -> Result<Transaction, LedgerError> {
        let tx = self.transactions.pop().ok_or(LedgerError::EmptyUndo)?;
        info!(tx = %tx.id, amount = %tx.amount, "Transaction undone");
        Ok(tx)
    }

    // -- Views --------------------------------------------------------------

    /// Net debts and positions recomputed from the full log.
    pub fn summary(&self) -> LedgerSummary {
        aggregate(&self.transactions, &self.participants)
    }

    pub fn history(&self, money: &MoneyFormat) -> Vec<HistoryEntry> {
        display::history(&self.transactions, &self.participants, money)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
