use axum::{extract::Query, Json};
use shared::{
    api::{
        error::ServerError,
        payloads::StatsQuery,
        response_errors::StatsError,
    },
    model::{DailyLog, Exercise, ExerciseOrder},
    stats::{aggregate, AdherenceStats, DateRange},
};
use tracing::{debug, instrument};

use crate::{db::DatabaseConnection, Authenticated};

#[instrument(skip_all, fields(days = ?query.days, today = ?query.today))]
pub async fn fetch_stats(
    _auth: Authenticated,
    DatabaseConnection(conn): DatabaseConnection,
    Query(query): Query<StatsQuery>,
) -> Result<Json<AdherenceStats>, ServerError<StatsError>> {
    let days = query.days()?;
    let today = query.today()?;
    let range = DateRange::looking_back(today, days)
        .map_err(|e| StatsError::InvalidRange { message: e.to_string() })?;

    let stats = conn
        .interact(move |conn| {
            let exercises = Exercise::fetch_all::<StatsError>(conn, ExerciseOrder::Name)?;
            let logs = DailyLog::fetch_between::<StatsError>(conn, &range.start(), &range.end())?;
            Ok::<_, ServerError<StatsError>>(aggregate(&range, &today, &exercises, &logs))
        })
        .await??;
    debug!(
        streak = stats.current_streak,
        overall = stats.overall_rate,
        "Computed adherence"
    );

    Ok(Json(stats))
}
