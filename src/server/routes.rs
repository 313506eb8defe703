//! Table API route handlers.
//!
//! All endpoints speak JSON. The single session is shared behind
//! `Arc<TableState>`; every command takes the write lock for its duration.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::AppConfig;
use crate::display::{HistoryEntry, MoneyFormat};
use crate::session::Session;
use crate::types::{LedgerError, Outcome, Participant, ParticipantId, Transaction, TransactionKind};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct TableState {
    pub name: String,
    pub session: RwLock<Session>,
    pub money: MoneyFormat,
    pub bet_presets: Vec<Decimal>,
}

impl TableState {
    pub fn new(
        name: impl Into<String>,
        session: Session,
        money: MoneyFormat,
        bet_presets: Vec<Decimal>,
    ) -> Self {
        Self {
            name: name.into(),
            session: RwLock::new(session),
            money,
            bet_presets,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.session.name.clone(),
            Session::from_config(&cfg.session),
            cfg.display.clone(),
            cfg.session.bet_presets.clone(),
        )
    }
}

pub type AppState = Arc<TableState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A refused command, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            LedgerError::UnknownParticipant(_) => StatusCode::NOT_FOUND,
            LedgerError::RoundInProgress | LedgerError::OutcomeForBanker(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::InvalidStake { .. }
            | LedgerError::NoBankerSelected
            | LedgerError::EmptyUndo
            | LedgerError::EmptyName => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!(error = %self.0, status = status.as_u16(), "Command refused");
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NewParticipant {
    pub name: String,
}

/// Stake as typed at the table: either JSON text or a JSON number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn into_text(self) -> String {
        match self {
            AmountInput::Text(s) => s,
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: AmountInput,
}

#[derive(Debug, Deserialize)]
pub struct BankerRequest {
    /// `null` clears the banker.
    pub id: Option<ParticipantId>,
}

#[derive(Debug, Deserialize)]
pub struct OutcomeRequest {
    pub outcome: Outcome,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub id: ParticipantId,
    pub name: String,
    pub avatar: String,
    pub is_banker: bool,
    pub wager: String,
    /// False when the wager would be skipped at resolution.
    pub stake_valid: bool,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub name: String,
    pub players: Vec<PlayerView>,
    pub banker: Option<ParticipantId>,
    pub base_bet: String,
    pub bet_presets: Vec<Decimal>,
    pub round_in_progress: bool,
    pub round_valid: bool,
    pub projected_profit: Decimal,
    pub projected_profit_display: String,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeResponse {
    pub participant: ParticipantId,
    pub outcome: Option<Outcome>,
    pub projected_profit: Decimal,
    pub projected_profit_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: uuid::Uuid,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Decimal,
    pub kind: TransactionKind,
    pub timestamp: String,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            from: tx.from,
            to: tx.to,
            amount: tx.amount,
            kind: tx.kind,
            timestamp: tx.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DebtView {
    pub debtor: ParticipantId,
    pub debtor_name: String,
    pub creditor: ParticipantId,
    pub creditor_name: String,
    pub amount: Decimal,
    pub amount_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub id: ParticipantId,
    pub name: String,
    pub net: Decimal,
    pub net_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub debts: Vec<DebtView>,
    pub positions: Vec<PositionView>,
    /// Raw positions keyed by participant id.
    pub net_positions: BTreeMap<ParticipantId, Decimal>,
}

fn session_view(state: &TableState, session: &Session) -> SessionView {
    let banker = session.banker();
    let players = session
        .participants()
        .iter()
        .map(|p| PlayerView {
            id: p.id,
            name: p.name.clone(),
            avatar: p.avatar.clone(),
            is_banker: banker == Some(p.id),
            wager: session.wager(p.id).unwrap_or_default().to_string(),
            stake_valid: session.stake(p.id).is_ok(),
            outcome: session.outcome(p.id),
        })
        .collect();
    let projected = session.projected_profit();

    SessionView {
        name: state.name.clone(),
        players,
        banker,
        base_bet: session.base_bet().to_string(),
        bet_presets: state.bet_presets.clone(),
        round_in_progress: session.is_round_in_progress(),
        round_valid: session.is_round_valid(),
        projected_profit: projected,
        projected_profit_display: state.money.format_signed(projected),
        transaction_count: session.transactions().len(),
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/session
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.read().await;
    Json(session_view(&state, &session))
}

/// POST /api/participants
pub async fn add_participant(
    State(state): State<AppState>,
    Json(req): Json<NewParticipant>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let mut session = state.session.write().await;
    let id = session.add_participant(&req.name)?;
    let participant = session
        .participant(id)
        .cloned()
        .ok_or(LedgerError::UnknownParticipant(id))?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// DELETE /api/participants/:id
pub async fn remove_participant(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Participant>, ApiError> {
    let mut session = state.session.write().await;
    let removed = session.remove_participant(ParticipantId(id))?;
    Ok(Json(removed))
}

/// PUT /api/banker
pub async fn set_banker(
    State(state): State<AppState>,
    Json(req): Json<BankerRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session.write().await;
    match req.id {
        Some(id) => session.set_banker(id)?,
        None => session.clear_banker(),
    }
    Ok(Json(session_view(&state, &session)))
}

/// PUT /api/base-bet
pub async fn set_base_bet(
    State(state): State<AppState>,
    Json(req): Json<AmountRequest>,
) -> Json<SessionView> {
    let mut session = state.session.write().await;
    session.apply_base_bet(&req.amount.into_text());
    Json(session_view(&state, &session))
}

/// PUT /api/wagers/:id
pub async fn set_wager(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session.write().await;
    session.set_wager(ParticipantId(id), &req.amount.into_text())?;
    Ok(Json(session_view(&state, &session)))
}

/// POST /api/outcomes/:id
pub async fn toggle_outcome(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<OutcomeRequest>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let mut session = state.session.write().await;
    let participant = ParticipantId(id);
    let outcome = session.toggle_outcome(participant, req.outcome)?;
    let projected = session.projected_profit();
    Ok(Json(OutcomeResponse {
        participant,
        outcome,
        projected_profit: projected,
        projected_profit_display: state.money.format_signed(projected),
    }))
}

/// POST /api/rounds
pub async fn confirm_round(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Vec<TransactionView>>), ApiError> {
    let mut session = state.session.write().await;
    let txs = session.confirm_round()?;
    Ok((
        StatusCode::CREATED,
        Json(txs.iter().map(TransactionView::from).collect()),
    ))
}

/// POST /api/undo
pub async fn undo(State(state): State<AppState>) -> Result<Json<TransactionView>, ApiError> {
    let mut session = state.session.write().await;
    let tx = session.undo_last()?;
    Ok(Json(TransactionView::from(&tx)))
}

/// GET /api/ledger
pub async fn get_ledger(State(state): State<AppState>) -> Json<LedgerView> {
    let session = state.session.read().await;
    let summary = session.summary();

    let debts = summary
        .debts
        .iter()
        .map(|d| DebtView {
            debtor: d.debtor,
            debtor_name: session.name_of(d.debtor).to_string(),
            creditor: d.creditor,
            creditor_name: session.name_of(d.creditor).to_string(),
            amount: d.amount,
            amount_display: state.money.format(d.amount),
        })
        .collect();

    let positions = session
        .participants()
        .iter()
        .map(|p| {
            let net = summary.position(p.id);
            PositionView {
                id: p.id,
                name: p.name.clone(),
                net,
                net_display: state.money.format_signed(net),
            }
        })
        .collect();

    Json(LedgerView {
        debts,
        positions,
        net_positions: summary.positions,
    })
}

/// GET /api/history
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let session = state.session.read().await;
    Json(session.history(&state.money))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
