use actix_middleware::require_admin;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /internal/random-call/cleanup
///
/// Same sweep the background worker runs, for an external scheduler.
pub async fn cleanup(req: HttpRequest, state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    require_admin(&req, state.admin_token.as_deref())?;
    let report = run_sweep(&state).await?;
    Ok(HttpResponse::Ok().json(report))
}

async fn run_sweep(state: &AppState) -> AppResult<crate::services::SweepReport> {
    let report = state.reaper.sweep().await?;
    tracing::info!(
        sessions_closed = report.sessions_closed,
        stale_queue_entries = report.stale_queue_entries,
        dangling_queue_entries = report.dangling_queue_entries,
        "Cleanup triggered via internal endpoint"
    );
    Ok(report)
}
