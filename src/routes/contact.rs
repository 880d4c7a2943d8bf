/**
 * Contact Routes
 * Contact form submissions and the message inbox
 */
use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;

use super::{
    client_ip, created, user_agent, ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Envelope,
};
use crate::db::{
    messages::{self, MessageFilter},
    models::{Message, MessageStats, MessageStatus, NewMessage, Priority, UpdateMessage},
};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contact/messages", get(list_messages).post(create_message))
        .route("/contact/stats", get(message_stats))
        .route(
            "/contact/messages/{id}",
            get(open_message).put(update_message).delete(delete_message),
        )
}

/// Query parameters for GET /api/contact/messages
#[derive(Debug, Default, Deserialize)]
pub struct MessageListQuery {
    pub status: Option<MessageStatus>,
    pub priority: Option<Priority>,
    pub limit: Option<i64>,
}

/// GET /api/contact/messages
pub async fn list_messages(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<MessageListQuery>,
) -> AppResult<ApiResponse<Vec<Message>>> {
    let filter = MessageFilter {
        status: query.status,
        priority: query.priority,
        limit: query.limit,
    };
    Ok(Json(Envelope::list(messages::list(&state.pool, &filter).await?)))
}

/// GET /api/contact/messages/{id}. Opening a new message marks it read.
pub async fn open_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Message>> {
    Ok(Json(Envelope::data(messages::open(&state.pool, id).await?)))
}

/// POST /api/contact/messages
pub async fn create_message(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    ApiJson(mut payload): ApiJson<NewMessage>,
) -> AppResult<impl IntoResponse> {
    payload.ip_address = Some(client_ip(&headers, addr));
    payload.user_agent = user_agent(&headers);

    let message = messages::create(&state.pool, &payload).await?;
    Ok(created(
        Envelope::data(message).with_message("Message sent successfully"),
    ))
}

/// PUT /api/contact/messages/{id}
pub async fn update_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateMessage>,
) -> AppResult<ApiResponse<Message>> {
    let message = messages::update(&state.pool, id, &payload).await?;
    Ok(Json(
        Envelope::data(message).with_message("Message updated successfully"),
    ))
}

/// DELETE /api/contact/messages/{id}
pub async fn delete_message(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    messages::delete(&state.pool, id).await?;
    Ok(Json(Envelope::message("Message deleted successfully")))
}

/// GET /api/contact/stats
pub async fn message_stats(State(state): State<AppState>) -> AppResult<ApiResponse<MessageStats>> {
    Ok(Json(Envelope::data(messages::stats(&state.pool).await?)))
}
