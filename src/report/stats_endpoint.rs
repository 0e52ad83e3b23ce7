//! The JSON endpoint for the financial report.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    api::{ApiResult, ErrorBody},
    movement::get_report_entries,
    report::{Report, aggregate},
    timezone::{local_today, start_of_year},
};

/// The state needed to build the report.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Bogota".
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Fetch every movement and aggregate it into a [Report].
///
/// The monthly breakdown starts on January 1st of the current year in the
/// local timezone.
pub(crate) fn build_report(state: &ReportState) -> Result<Report, Error> {
    let start = start_of_year(local_today(&state.local_timezone)?);

    let entries = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_report_entries(&connection)?
    };

    Ok(aggregate(&entries, start))
}

/// Total income, total expense, balance and the monthly breakdown for the
/// current year.
#[utoipa::path(
    get,
    path = "/api/reports/stats",
    responses(
        (status = 200, description = "El reporte financiero", body = Report),
        (status = 401, description = "No autenticado", body = ErrorBody),
        (status = 405, description = "Método no permitido", body = ErrorBody),
        (status = 500, description = "Error interno del servidor", body = ErrorBody)
    ),
    tags = ["reports"],
    operation_id = "getReportStats"
)]
pub async fn get_report_stats(State(state): State<ReportState>) -> ApiResult<Json<Report>> {
    Ok(Json(build_report(&state)?))
}
