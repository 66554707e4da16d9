//! HTTP API server for external control (the mobile client)
//!
//! This module provides a REST API over the session manager:
//! - GET  /storage + POST /storage/select - Storage location
//! - POST /recordings/record/start|stop - Recording control
//! - GET  /recordings, POST /recordings/rename|delete - Catalog
//! - POST /recordings/play, /recordings/play/stop - Playback
//! - POST /evaluation/submit, GET /evaluation/history - Evaluation
//! - GET  /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
