//! Multi-round table simulation.
//!
//! Drives a session through many rounds with a rotating bank and checks the
//! ledger stays conserved and consistent with the raw log.

use banca::session::Session;
use banca::types::{LedgerError, Outcome, ParticipantId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn seat(names: &[&str]) -> (Session, Vec<ParticipantId>) {
    let mut session = Session::new("10");
    let ids = names
        .iter()
        .map(|n| session.add_participant(n).expect("valid name"))
        .collect();
    (session, ids)
}

/// Banker's net from the raw log, ignoring netting.
fn raw_net(session: &Session, id: ParticipantId) -> Decimal {
    session
        .transactions()
        .iter()
        .map(|t| {
            if t.to == id {
                t.amount
            } else if t.from == id {
                -t.amount
            } else {
                Decimal::ZERO
            }
        })
        .sum()
}

#[test]
fn test_rotating_bank_stays_conserved() {
    let (mut session, ids) = seat(&["Ana", "Beto", "Caio", "Duda"]);
    session.set_wager(ids[3], "2,5").unwrap();

    for round in 0..24usize {
        let banker = ids[round % ids.len()];
        session.set_banker(banker).unwrap();

        for (seat_no, &player) in ids.iter().enumerate() {
            if player == banker {
                continue;
            }
            let outcome = Outcome::ALL[(round + seat_no) % Outcome::ALL.len()];
            session.toggle_outcome(player, outcome).unwrap();
        }

        let projected = session.projected_profit();
        let before = raw_net(&session, banker);
        session.confirm_round().unwrap();
        assert_eq!(raw_net(&session, banker) - before, projected);

        let summary = session.summary();
        assert_eq!(summary.total(), Some(Decimal::ZERO));
        for &id in &ids {
            assert_eq!(summary.position(id), raw_net(&session, id));
        }
    }

    assert_eq!(session.transactions().len(), 24 * 3);
}

#[test]
fn test_blackjack_round_and_undo() {
    let (mut session, ids) = seat(&["Banca", "Pedro"]);
    let (banker, pedro) = (ids[0], ids[1]);

    session.toggle_outcome(pedro, Outcome::PlayerBlackjack).unwrap();
    let txs = session.confirm_round().unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!((txs[0].from, txs[0].to, txs[0].amount), (banker, pedro, dec!(25)));

    let summary = session.summary();
    assert_eq!(summary.position(banker), dec!(-25));
    assert_eq!(summary.position(pedro), dec!(25));

    session.undo_last().unwrap();
    let summary = session.summary();
    assert!(summary.is_settled());
    assert_eq!(summary.position(pedro), Decimal::ZERO);
    assert_eq!(session.undo_last(), Err(LedgerError::EmptyUndo));
}

#[test]
fn test_debts_cancel_across_rounds() {
    let (mut session, ids) = seat(&["Ana", "Beto"]);
    let (ana, beto) = (ids[0], ids[1]);

    // Beto wins 10 from Ana's bank, then loses 4 back.
    session.toggle_outcome(beto, Outcome::PlayerWon).unwrap();
    session.confirm_round().unwrap();
    session.set_wager(beto, "4").unwrap();
    session.toggle_outcome(beto, Outcome::BankerWon).unwrap();
    session.confirm_round().unwrap();

    let summary = session.summary();
    assert_eq!(summary.debts.len(), 1);
    let debt = &summary.debts[0];
    assert_eq!((debt.debtor, debt.creditor, debt.amount), (ana, beto, dec!(6)));

    // And 6 more back to the bank squares it.
    session.set_wager(beto, "6").unwrap();
    session.toggle_outcome(beto, Outcome::BankerWon).unwrap();
    session.confirm_round().unwrap();
    assert!(session.summary().is_settled());
}

#[test]
fn test_sat_out_players_are_not_settled() {
    let (mut session, ids) = seat(&["Ana", "Beto", "Caio"]);
    session.set_wager(ids[2], "").unwrap();
    session.toggle_outcome(ids[1], Outcome::BankerWon).unwrap();
    session.toggle_outcome(ids[2], Outcome::PlayerWon).unwrap();

    let txs = session.confirm_round().unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(session.summary().position(ids[2]), Decimal::ZERO);
}

#[test]
fn test_removing_banker_wipes_their_history() {
    let (mut session, ids) = seat(&["Ana", "Beto", "Caio"]);
    session.toggle_outcome(ids[1], Outcome::PlayerWon).unwrap();
    session.confirm_round().unwrap();

    session.set_banker(ids[1]).unwrap();
    session.toggle_outcome(ids[2], Outcome::BankerWon).unwrap();
    session.confirm_round().unwrap();
    assert_eq!(session.transactions().len(), 2);

    session.remove_participant(ids[1]).unwrap();
    assert!(session.transactions().is_empty());
    assert_eq!(session.banker(), None);
    assert!(session.summary().is_settled());
}
