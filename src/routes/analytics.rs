/**
 * Analytics Routes
 * Page-view/interaction ingestion and the reporting dashboard
 */
use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::net::SocketAddr;

use super::{client_ip, user_agent, ApiJson, ApiQuery, ApiResponse, AppState, Envelope};
use crate::db::{
    analytics::{
        self, Dashboard, InteractionFilter, PageViewFilter, Window, DEFAULT_WINDOW_DAYS,
    },
    models::{Interaction, NewInteraction, NewPageView, PageView},
    query::non_empty,
};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/pageview", post(track_pageview))
        .route("/analytics/interaction", post(track_interaction))
        .route("/analytics/dashboard", get(dashboard))
        .route("/analytics/pageviews", get(list_pageviews))
        .route("/analytics/interactions", get(list_interactions))
}

fn default_days() -> i64 {
    DEFAULT_WINDOW_DAYS
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

#[derive(Debug, Deserialize)]
pub struct PageViewQuery {
    pub page_url: Option<String>,
    #[serde(default = "default_days")]
    pub days: i64,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionQuery {
    pub event_type: Option<String>,
    pub page_url: Option<String>,
    #[serde(default = "default_days")]
    pub days: i64,
    pub limit: Option<i64>,
}

/// POST /api/analytics/pageview
pub async fn track_pageview(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ApiJson(mut payload): ApiJson<NewPageView>,
) -> AppResult<ApiResponse<()>> {
    if payload.ip_address.is_none() {
        payload.ip_address = Some(client_ip(&headers, addr));
    }
    if payload.user_agent.is_none() {
        payload.user_agent = user_agent(&headers);
    }

    analytics::record_page_view(&state.pool, &payload, Utc::now()).await?;
    Ok(Json(Envelope::message("Page view tracked successfully")))
}

/// POST /api/analytics/interaction
pub async fn track_interaction(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ApiJson(mut payload): ApiJson<NewInteraction>,
) -> AppResult<ApiResponse<()>> {
    if payload.ip_address.is_none() {
        payload.ip_address = Some(client_ip(&headers, addr));
    }

    analytics::record_interaction(&state.pool, &payload, Utc::now()).await?;
    Ok(Json(Envelope::message("Interaction tracked successfully")))
}

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DashboardQuery>,
) -> AppResult<ApiResponse<Dashboard>> {
    let window = Window::trailing(query.days)?;
    Ok(Json(Envelope::data(analytics::dashboard(&state.pool, window).await?)))
}

/// GET /api/analytics/pageviews
pub async fn list_pageviews(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageViewQuery>,
) -> AppResult<ApiResponse<Vec<PageView>>> {
    let filter = PageViewFilter {
        page_url: non_empty(query.page_url.as_deref()).map(str::to_string),
        window: Window::trailing(query.days)?,
        limit: query.limit,
    };
    Ok(Json(Envelope::list(
        analytics::list_page_views(&state.pool, &filter).await?,
    )))
}

/// GET /api/analytics/interactions
pub async fn list_interactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<InteractionQuery>,
) -> AppResult<ApiResponse<Vec<Interaction>>> {
    let filter = InteractionFilter {
        event_type: non_empty(query.event_type.as_deref()).map(str::to_string),
        page_url: non_empty(query.page_url.as_deref()).map(str::to_string),
        window: Window::trailing(query.days)?,
        limit: query.limit,
    };
    Ok(Json(Envelope::list(
        analytics::list_interactions(&state.pool, &filter).await?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{get, json, send, state};
    use axum::{extract::connect_info::MockConnectInfo, http::StatusCode};
    use serde_json::json;

    async fn app() -> Router {
        routes()
            .with_state(state().await)
            .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 10], 5555))))
    }

    #[tokio::test]
    async fn test_track_pageview_attaches_peer_ip() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json("POST", "/analytics/pageview", &json!({ "page_url": "/", "browser": "Firefox" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Page view tracked successfully");

        let (_, body) = send(&app, get("/analytics/pageviews")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["ip_address"], "192.0.2.10");
    }

    #[tokio::test]
    async fn test_track_pageview_requires_url() {
        let app = app().await;
        let (status, body) =
            send(&app, json("POST", "/analytics/pageview", &json!({ "browser": "Edge" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: page_url");
    }

    #[tokio::test]
    async fn test_track_interaction_accepts_metadata() {
        let app = app().await;
        let (status, _) = send(
            &app,
            json(
                "POST",
                "/analytics/interaction",
                &json!({ "event_type": "click", "page_url": "/shop", "metadata": { "id": 7 } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, get("/analytics/interactions?event_type=click")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["extra_data"]["id"], 7);
    }

    #[tokio::test]
    async fn test_dashboard_shape() {
        let app = app().await;
        for url in ["/", "/", "/blog"] {
            send(&app, json("POST", "/analytics/pageview", &json!({ "page_url": url }))).await;
        }

        let (status, body) = send(&app, get("/analytics/dashboard?days=7")).await;
        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["window_days"], 7);
        assert_eq!(data["total_pageviews"], 3);
        assert_eq!(data["unique_visitors"], 1);
        assert_eq!(data["popular_pages"][0], json!({ "url": "/", "views": 2 }));
        assert_eq!(data["daily_views"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_bad_days() {
        let app = app().await;
        let (status, _) = send(&app, get("/analytics/dashboard?days=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = send(&app, get("/analytics/dashboard?days=week")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let (status, body) = send(&app, get("/analytics/dashboard?days=2000000")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid days: must be at most 3660");
    }
}
