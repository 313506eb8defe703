//! Settlement engine — round resolution and ledger netting.
//!
//! Both halves are pure functions over plain data; the session owns the
//! state and calls into them.

pub mod aggregator;
pub mod resolver;

pub use aggregator::{aggregate, LedgerSummary};
pub use resolver::{parse_stake, project_round_profit, resolve_round};
