/**
 * Project Routes
 * CRUD endpoints for portfolio projects
 */
use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::{created, ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Envelope};
use crate::db::{
    models::{NewProject, Project, ProjectStatus, UpdateProject},
    projects::{self, ProjectFilter},
    query::{non_empty, parse_flag},
};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/categories", get(list_categories))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
}

/// Query parameters for GET /api/projects
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub status: Option<ProjectStatus>,
    pub limit: Option<i64>,
}

impl From<ProjectListQuery> for ProjectFilter {
    fn from(query: ProjectListQuery) -> Self {
        Self {
            category: non_empty(query.category.as_deref()).map(str::to_string),
            featured: parse_flag(query.featured.as_deref()),
            status: query.status,
            limit: query.limit,
        }
    }
}

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProjectListQuery>,
) -> AppResult<ApiResponse<Vec<Project>>> {
    let projects = projects::list(&state.pool, &query.into()).await?;
    Ok(Json(Envelope::list(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Project>> {
    Ok(Json(Envelope::data(projects::get(&state.pool, id).await?)))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewProject>,
) -> AppResult<impl IntoResponse> {
    let project = projects::create(&state.pool, &payload).await?;
    Ok(created(
        Envelope::data(project).with_message("Project created successfully"),
    ))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateProject>,
) -> AppResult<ApiResponse<Project>> {
    let project = projects::update(&state.pool, id, &payload).await?;
    Ok(Json(
        Envelope::data(project).with_message("Project updated successfully"),
    ))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    projects::delete(&state.pool, id).await?;
    Ok(Json(Envelope::message("Project deleted successfully")))
}

/// GET /api/projects/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(Json(Envelope::data(projects::categories(&state.pool).await?)))
}
