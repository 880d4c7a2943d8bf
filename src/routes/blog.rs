/**
 * Blog Routes
 * CRUD API endpoints for blog posts
 *
 * `/blog/posts/{key}` is read by numeric id, or by slug (which counts a
 * view), and written and deleted by numeric id.
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
    blog::{self, BlogFilter},
    models::{BlogPost, NewBlogPost, UpdateBlogPost},
    query::{non_empty, parse_flag},
};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blog/posts", get(list_posts).post(create_post))
        .route("/blog/categories", get(list_categories))
        .route(
            "/blog/posts/{key}",
            get(get_post).put(update_post).delete(delete_post),
        )
}

/// Query parameters for GET /api/blog/posts
#[derive(Debug, Default, Deserialize)]
pub struct BlogListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub published: Option<String>,
    pub limit: Option<i64>,
}

impl From<BlogListQuery> for BlogFilter {
    fn from(query: BlogListQuery) -> Self {
        Self {
            category: non_empty(query.category.as_deref()).map(str::to_string),
            featured: parse_flag(query.featured.as_deref()),
            // Drafts stay hidden unless asked for
            published: parse_flag(query.published.as_deref()).or(Some(true)),
            limit: query.limit,
        }
    }
}

/// GET /api/blog/posts
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> AppResult<ApiResponse<Vec<BlogPost>>> {
    let posts = blog::list(&state.pool, &query.into()).await?;
    Ok(Json(Envelope::list(posts)))
}

/// GET /api/blog/posts/{key}
///
/// A numeric key is an id and reads the post as is. Anything else is a slug,
/// and each such read counts as one view.
pub async fn get_post(
    State(state): State<AppState>,
    ApiPath(key): ApiPath<String>,
) -> AppResult<ApiResponse<BlogPost>> {
    let post = match key.parse::<i64>() {
        Ok(id) => blog::get(&state.pool, id).await?,
        Err(_) => blog::view_by_slug(&state.pool, &key).await?,
    };
    Ok(Json(Envelope::data(post)))
}

/// POST /api/blog/posts
pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewBlogPost>,
) -> AppResult<impl IntoResponse> {
    let post = blog::create(&state.pool, &payload).await?;
    Ok(created(
        Envelope::data(post).with_message("Blog post created successfully"),
    ))
}

/// PUT /api/blog/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateBlogPost>,
) -> AppResult<ApiResponse<BlogPost>> {
    let post = blog::update(&state.pool, id, &payload).await?;
    Ok(Json(
        Envelope::data(post).with_message("Blog post updated successfully"),
    ))
}

/// DELETE /api/blog/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    blog::delete(&state.pool, id).await?;
    Ok(Json(Envelope::message("Blog post deleted successfully")))
}

/// GET /api/blog/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(Json(Envelope::data(blog::categories(&state.pool).await?)))
}
