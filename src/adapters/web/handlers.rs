//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::Html,
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::adapters::upload_adapter::parse_upload;
use crate::domain::batch::{PositionRow, pair_rows, parse_target_profit, run_batch};
use crate::domain::error::ProfitError;
use crate::domain::summary::BatchReport;
use crate::domain::ticker::TickerEntry;

use super::templates::IndexTemplate;
use super::{AppState, WebError};

pub const DEFAULT_TARGET_PROFIT: f64 = 10.0;

const UPLOAD_FIELD: &str = "excel_file";

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, WebError> {
    let template = IndexTemplate {
        default_target: DEFAULT_TARGET_PROFIT,
        autocomplete_enabled: !state.tickers.is_empty(),
    };
    Ok(Html(template.render()?))
}

/// Fields collected from either a multipart or an url-encoded body.
#[derive(Debug, Default)]
struct Submission {
    target_profit: Option<String>,
    tickers: Vec<String>,
    buy_dates: Vec<String>,
    upload: Option<(String, Vec<u8>)>,
}

impl Submission {
    fn push_field(&mut self, name: &str, value: String) {
        match name {
            "target_profit" => self.target_profit = Some(value),
            "tickers" | "tickers[]" => self.tickers.push(value),
            "buy_dates" | "buy_dates[]" => self.buy_dates.push(value),
            _ => {}
        }
    }

    fn into_rows(self) -> Result<Vec<PositionRow>, ProfitError> {
        match self.upload {
            Some((file_name, bytes)) if !file_name.trim().is_empty() => {
                let rows = parse_upload(&file_name, &bytes)?;
                if rows.is_empty() {
                    return Err(ProfitError::malformed(format!(
                        "{} contains no positions",
                        file_name
                    )));
                }
                Ok(rows)
            }
            _ => pair_rows(self.tickers, self.buy_dates),
        }
    }
}

async fn read_submission(request: Request) -> Result<Submission, WebError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let mut submission = Submission::default();

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == UPLOAD_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WebError::bad_request(e.body_text()))?;
                submission.upload = Some((file_name, bytes.to_vec()));
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| WebError::bad_request(e.body_text()))?;
                submission.push_field(&name, value);
            }
        }
    } else {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(request, &())
            .await
            .map_err(|e| WebError::bad_request(e.body_text()))?;
        for (name, value) in pairs {
            submission.push_field(&name, value);
        }
    }

    Ok(submission)
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<BatchReport>, WebError> {
    let mut submission = read_submission(request).await?;
    let target = parse_target_profit(submission.target_profit.take().as_deref().unwrap_or(""))?;
    let rows = submission.into_rows()?;
    let today = state.clock.today();

    info!(rows = rows.len(), target, %today, "analyzing batch");

    let worker_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        run_batch(
            &worker_state.evaluator,
            worker_state.market_data.as_ref(),
            &rows,
            target,
            today,
        )
    })
    .await
    .map_err(|e| WebError::internal(format!("analysis task failed: {}", e)))??;

    debug!(
        realized = report.summary.realized_count,
        unrealized = report.summary.unrealized_count,
        "batch complete"
    );
    Ok(Json(report))
}

pub async fn autocomplete(State(state): State<Arc<AppState>>) -> Json<Vec<TickerEntry>> {
    Json(state.tickers.as_ref().clone())
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}
