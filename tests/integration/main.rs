//! Integration tests: whole-session replays and the HTTP surface.

mod http_api;
mod simulation;
