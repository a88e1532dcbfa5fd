use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, StatusCode},
};
use common::{Event, EventKind};

pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// `POST /` accepts the game client's pushes.
pub fn router(gsi: Arc<gsi::Gsi>, max_body_bytes: usize) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::post(ingest))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(gsi)
}

#[tracing::instrument(skip_all, fields(bytes = body.len()))]
async fn ingest(
    State(gsi): State<Arc<gsi::Gsi>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, (StatusCode, String)> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err((
            StatusCode::BAD_REQUEST,
            "Content-Type must be application/json".to_owned(),
        ));
    }

    // Blocks on the pipeline lock and runs the event handlers
    let result = tokio::task::spawn_blocking(move || gsi.digest(&body))
        .await
        .map_err(|e| {
            tracing::error!("Digest task failed: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_owned())
        })?;

    match result {
        Ok(digest) => {
            tracing::trace!(skipped = digest.is_skipped(), "Digested push");
            Ok("OK")
        }
        Err(e) => {
            tracing::warn!("Rejecting push: {}", e);
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

/// Subscribes a handler to every event kind that logs the event.
pub fn log_events(gsi: &gsi::Gsi) {
    for kind in EventKind::ALL {
        gsi.subscribe(kind, move |event| match event {
            Event::Data(snapshot) => {
                tracing::debug!(%kind, map = %snapshot.map.name, round = snapshot.map.round, "Event");
            }
            Event::RoundEnd(score) | Event::MatchEnd(score) => {
                tracing::info!(
                    %kind,
                    winner = %score.winner.name,
                    loser = %score.loser.name,
                    "Event {}-{}",
                    score.winner.score,
                    score.loser.score
                );
            }
            Event::Mvp(player) => {
                tracing::info!(%kind, player = %player.name, "Event");
            }
            Event::TimeoutStart(team) => {
                tracing::info!(%kind, team = %team.name, side = %team.side, "Event");
            }
            _ => {
                tracing::info!(%kind, "Event");
            }
        });
    }
}
