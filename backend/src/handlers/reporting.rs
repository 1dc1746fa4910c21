//! Dashboard handlers, with CSV export where a table is exported

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::DateQuery;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{DailySalesSummary, DashboardSummary, ProductPerformance};
use crate::services::reporting::{ReportingService, SnapshotFilter};
use crate::AppState;

#[derive(Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>, // "json" or "csv"
}

fn table_response<T: Serialize>(
    data: Vec<T>,
    format: &FormatQuery,
    filename: &str,
) -> AppResult<Response> {
    if format.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        let disposition = format!("attachment; filename=\"{}\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

/// Products at or below their reorder threshold
pub async fn low_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(format): Query<FormatQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let data = service.low_stock().await?;
    table_response(data, &format, "low_stock.csv")
}

/// Sales totals for one day
pub async fn daily_sales(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<DailySalesSummary>> {
    let service = ReportingService::new(state.db);
    Ok(Json(service.daily_sales(query.date_or_today()).await?))
}

/// Current inventory snapshot
pub async fn inventory_snapshot(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<SnapshotFilter>,
    Query(format): Query<FormatQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let data = service.inventory_snapshot(&filter).await?;
    table_response(data, &format, "inventory.csv")
}

/// Products ranked by units sold over the configured window
pub async fn product_performance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductPerformance>>> {
    let service = ReportingService::new(state.db);
    let window = state.config.reporting.performance_window_days;
    Ok(Json(service.product_performance(window).await?))
}

/// Dashboard rollup
pub async fn dashboard_summary(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<DashboardSummary>> {
    let service = ReportingService::new(state.db);
    let today = chrono::Utc::now().date_naive();
    Ok(Json(service.summary(today).await?))
}
