//! End-to-end table flow through the HTTP router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use banca::config::AppConfig;
use banca::server::{build_router, TableState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let cfg = AppConfig::parse("[session]\nname = \"Teste\"\nbase_bet = \"10\"\n").unwrap();
    build_router(Arc::new(TableState::from_config(&cfg)))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(v) => builder.body(Body::from(v.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_full_round_over_http() {
    let app = app();

    let (status, ana) = call(&app, "POST", "/api/participants", Some(json!({"name": "Ana"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, beto) = call(&app, "POST", "/api/participants", Some(json!({"name": "Beto"}))).await;
    let (_, caio) = call(&app, "POST", "/api/participants", Some(json!({"name": "Caio"}))).await;
    let (ana, beto, caio) = (
        ana["id"].as_u64().unwrap(),
        beto["id"].as_u64().unwrap(),
        caio["id"].as_u64().unwrap(),
    );

    let (status, session) = call(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["name"], "Teste");
    assert_eq!(session["banker"], ana);
    assert_eq!(session["players"][1]["wager"], "10");
    assert_eq!(session["players"][1]["stake_valid"], true);

    let uri = format!("/api/wagers/{caio}");
    let (status, _) = call(&app, "PUT", &uri, Some(json!({"amount": 4}))).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/outcomes/{beto}");
    let (_, resp) = call(&app, "POST", &uri, Some(json!({"outcome": "banker_won"}))).await;
    assert_eq!(resp["outcome"], "banker_won");
    let uri = format!("/api/outcomes/{caio}");
    let (_, resp) = call(&app, "POST", &uri, Some(json!({"outcome": "player_blackjack"}))).await;
    assert_eq!(resp["projected_profit_display"], "R$ 0,00");

    // Roster is locked while the round is open.
    let (status, err) =
        call(&app, "POST", "/api/participants", Some(json!({"name": "Duda"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("round"));

    let (status, txs) = call(&app, "POST", "/api/rounds", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(txs.as_array().unwrap().len(), 2);
    assert_eq!(txs[1]["kind"], "banker_pays_blackjack");
    assert_eq!(txs[1]["amount"].as_f64().unwrap(), 10.0);

    let (_, ledger) = call(&app, "GET", "/api/ledger", None).await;
    let debts = ledger["debts"].as_array().unwrap();
    assert_eq!(debts.len(), 2);
    assert_eq!(debts[0]["debtor_name"], "Beto");
    assert_eq!(debts[0]["creditor_name"], "Ana");
    assert_eq!(debts[1]["debtor_name"], "Ana");
    assert_eq!(debts[1]["creditor_name"], "Caio");
    assert_eq!(ledger["positions"][0]["net"].as_f64().unwrap(), 0.0);

    let (_, history) = call(&app, "GET", "/api/history", None).await;
    assert_eq!(history[0]["label"], "BJ (x2.5)");
    assert_eq!(history[0]["to_name"], "Caio");

    let (status, undone) = call(&app, "POST", "/api/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(undone["to"], caio);

    let (_, ledger) = call(&app, "GET", "/api/ledger", None).await;
    assert_eq!(ledger["debts"].as_array().unwrap().len(), 1);
    assert_eq!(ledger["positions"][0]["net_display"], "+R$ 10,00");
}

#[tokio::test]
async fn test_banker_and_base_bet_over_http() {
    let app = app();
    call(&app, "POST", "/api/participants", Some(json!({"name": "Ana"}))).await;
    let (_, beto) = call(&app, "POST", "/api/participants", Some(json!({"name": "Beto"}))).await;
    let beto = beto["id"].as_u64().unwrap();

    let (status, session) = call(&app, "PUT", "/api/banker", Some(json!({"id": beto}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["banker"], beto);

    let uri = format!("/api/outcomes/{beto}");
    let (status, err) = call(&app, "POST", &uri, Some(json!({"outcome": "player_won"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("banker"));

    let (_, session) = call(&app, "PUT", "/api/base-bet", Some(json!({"amount": "2"}))).await;
    assert_eq!(session["base_bet"], "2");
    assert!(session["players"].as_array().unwrap().iter().all(|p| p["wager"] == "2"));

    let (_, session) = call(&app, "PUT", "/api/banker", Some(json!({"id": null}))).await;
    assert_eq!(session["banker"], Value::Null);
    let (status, _) = call(&app, "POST", "/api/rounds", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_remove_participant_over_http() {
    let app = app();
    let (_, ana) = call(&app, "POST", "/api/participants", Some(json!({"name": "Ana"}))).await;
    let ana = ana["id"].as_u64().unwrap();

    let (status, removed) = call(&app, "DELETE", &format!("/api/participants/{ana}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["name"], "Ana");

    let (status, _) = call(&app, "DELETE", &format!("/api/participants/{ana}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_wager_keeps_the_table_usable() {
    let app = app();
    call(&app, "POST", "/api/participants", Some(json!({"name": "Ana"}))).await;
    let (_, beto) = call(&app, "POST", "/api/participants", Some(json!({"name": "Beto"}))).await;
    let beto = beto["id"].as_u64().unwrap();

    let uri = format!("/api/wagers/{beto}");
    let huge = json!({"amount": "79228162514264337593543950335"});
    let (status, _) = call(&app, "PUT", &uri, Some(huge)).await;
    assert_eq!(status, StatusCode::OK);
    let uri = format!("/api/outcomes/{beto}");
    call(&app, "POST", &uri, Some(json!({"outcome": "player_blackjack"}))).await;

    let (status, session) = call(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["players"][1]["stake_valid"], false);
    assert_eq!(session["projected_profit_display"], "R$ 0,00");

    let (status, txs) = call(&app, "POST", "/api/rounds", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(txs.as_array().unwrap().is_empty());

    let (status, ledger) = call(&app, "GET", "/api/ledger", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ledger["debts"].as_array().unwrap().is_empty());
}
