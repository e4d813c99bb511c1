//! Web server adapter.
//!
//! Serves the input form, accepts batch submissions and answers with the
//! JSON report. Evaluation runs on the blocking pool since market-data
//! adapters are synchronous.

mod error;
mod handlers;
mod templates;

pub use error::{WebError, status_from_error};
pub use handlers::DEFAULT_TARGET_PROFIT;
pub use templates::IndexTemplate;

use axum::{Router, routing::get};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::domain::evaluator::ProfitEvaluator;
use crate::domain::ticker::TickerEntry;
use crate::ports::clock_port::ClockPort;
use crate::ports::market_data_port::MarketDataPort;

pub struct AppState {
    pub market_data: Arc<dyn MarketDataPort + Send + Sync>,
    pub evaluator: Arc<ProfitEvaluator>,
    pub clock: Arc<dyn ClockPort + Send + Sync>,
    pub tickers: Arc<Vec<TickerEntry>>,
    pub static_dir: PathBuf,
}

pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/", get(handlers::index).post(handlers::analyze))
        .route("/autocomplete", get(handlers::autocomplete))
        .nest_service("/static", static_files)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
