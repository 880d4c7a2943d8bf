//! Blog post repository
//!
//! One operation here touches rows on read: [`view_by_slug`] bumps the view
//! counter as part of the same statement that returns the post. [`get`] is
//! the plain read.

use chrono::Utc;
use regex::Regex;
use sqlx::{types::Json, SqliteConnection, SqlitePool};

use super::models::{merge_text, required, BlogPost, NewBlogPost, UpdateBlogPost};
use super::query::{OrderBy, Select};
use crate::error::{is_unique_violation, AppError, AppResult};

/// Reading speed used for `reading_time`
pub const WORDS_PER_MINUTE: f64 = 200.0;

const SLUG_TAKEN: &str = "A post with this slug already exists";

macro_rules! blog_columns {
    () => {
        "id, title, slug, content, excerpt, category, tags, featured_image, published, \
         featured, reading_time, views, created_at, updated_at, published_at"
    };
}

lazy_static::lazy_static! {
    /// Valid slug pattern: lowercase letters, numbers, and hyphens
    static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_REGEX.is_match(slug)
}

fn validate_slug(slug: &str) -> AppResult<()> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(AppError::validation(
            "Invalid slug: must contain only lowercase letters, numbers, and hyphens",
        ))
    }
}

/// Minutes needed to read `content`: words / 200, ties rounded to even,
/// never below 1.
pub fn reading_time(content: &str) -> i64 {
    let words = content.split_whitespace().count() as f64;
    ((words / WORDS_PER_MINUTE).round_ties_even() as i64).max(1)
}

#[derive(Debug, Clone)]
pub struct BlogFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub limit: Option<i64>,
}

impl Default for BlogFilter {
    fn default() -> Self {
        Self {
            category: None,
            featured: None,
            published: Some(true),
            limit: None,
        }
    }
}

/// Newest publication first; unpublished posts (no `published_at`) last.
pub async fn list(pool: &SqlitePool, filter: &BlogFilter) -> AppResult<Vec<BlogPost>> {
    let mut select = Select::from("blog_posts", blog_columns!());
    select
        .eq_opt("category", filter.category.clone())
        .eq_opt("featured", filter.featured)
        .eq_opt("published", filter.published)
        .order_by(&[
            OrderBy::desc("published_at").nulls_last(),
            OrderBy::desc("created_at"),
            OrderBy::desc("id"),
        ])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}

/// Plain lookup by id, without touching the view counter.
pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<BlogPost> {
    let mut conn = pool.acquire().await?;
    fetch(&mut *conn, id).await
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> AppResult<BlogPost> {
    sqlx::query_as::<_, BlogPost>(concat!(
        "SELECT ",
        blog_columns!(),
        " FROM blog_posts WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::not_found("Blog post not found"))
}

async fn slug_taken(conn: &mut SqliteConnection, slug: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM blog_posts WHERE slug = ?")
        .bind(slug)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

/// Fetches a post by slug and counts the fetch as a view.
pub async fn view_by_slug(pool: &SqlitePool, slug: &str) -> AppResult<BlogPost> {
    sqlx::query_as::<_, BlogPost>(concat!(
        "UPDATE blog_posts SET views = views + 1 WHERE slug = ? RETURNING ",
        blog_columns!()
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Blog post not found"))
}

pub async fn create(pool: &SqlitePool, new: &NewBlogPost) -> AppResult<BlogPost> {
    let mut tx = pool.begin().await?;
    let post = insert(&mut *tx, new).await?;
    tx.commit().await?;
    Ok(post)
}

/// Validates and inserts a post on a connection the caller holds; the slug
/// check and the insert should share one transaction.
pub async fn insert(conn: &mut SqliteConnection, new: &NewBlogPost) -> AppResult<BlogPost> {
    let title = required(&new.title, "title")?;
    let slug = required(&new.slug, "slug")?;
    let content = required(&new.content, "content")?;
    let category = required(&new.category, "category")?;
    validate_slug(slug)?;

    let published = new.published.unwrap_or(false);
    let now = Utc::now();
    let published_at = published.then_some(now);

    if slug_taken(&mut *conn, slug).await? {
        return Err(AppError::conflict(SLUG_TAKEN));
    }

    let post = sqlx::query_as::<_, BlogPost>(concat!(
        "INSERT INTO blog_posts (title, slug, content, excerpt, category, tags, featured_image, \
         published, featured, reading_time, views, created_at, updated_at, published_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?) RETURNING ",
        blog_columns!()
    ))
    .bind(title)
    .bind(slug)
    .bind(content)
    .bind(&new.excerpt)
    .bind(category)
    .bind(Json(&new.tags))
    .bind(&new.featured_image)
    .bind(published)
    .bind(new.featured.unwrap_or(false))
    .bind(reading_time(content))
    .bind(now)
    .bind(now)
    .bind(published_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(slug_conflict)?;

    tracing::info!(post_id = post.id, slug = %post.slug, "blog post created");
    Ok(post)
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &UpdateBlogPost) -> AppResult<BlogPost> {
    let mut tx = pool.begin().await?;
    let existing = fetch(&mut *tx, id).await?;

    let slug = match changes.slug.as_deref().map(str::trim) {
        Some(slug) if slug != existing.slug => {
            validate_slug(slug)?;
            if slug_taken(&mut *tx, slug).await? {
                return Err(AppError::conflict(SLUG_TAKEN));
            }
            slug.to_string()
        }
        _ => existing.slug,
    };

    let title = merge_text(&changes.title, existing.title, "title")?;
    let category = merge_text(&changes.category, existing.category, "category")?;
    let content = merge_text(&changes.content, existing.content, "content")?;
    let reading_minutes = if changes.content.is_some() {
        reading_time(&content)
    } else {
        existing.reading_time
    };
    let excerpt = changes.excerpt.clone().or(existing.excerpt);
    let tags = changes.tags.clone().unwrap_or(existing.tags);
    let featured_image = changes.featured_image.clone().or(existing.featured_image);
    let featured = changes.featured.unwrap_or(existing.featured);
    let published = changes.published.unwrap_or(existing.published);

    let now = Utc::now();
    let published_at = match existing.published_at {
        None if published => Some(now),
        other => other,
    };

    let post = sqlx::query_as::<_, BlogPost>(concat!(
        "UPDATE blog_posts SET title = ?, slug = ?, content = ?, excerpt = ?, category = ?, \
         tags = ?, featured_image = ?, published = ?, featured = ?, reading_time = ?, \
         updated_at = ?, published_at = ? WHERE id = ? RETURNING ",
        blog_columns!()
    ))
    .bind(&title)
    .bind(&slug)
    .bind(&content)
    .bind(&excerpt)
    .bind(&category)
    .bind(Json(&tags))
    .bind(&featured_image)
    .bind(published)
    .bind(featured)
    .bind(reading_minutes)
    .bind(now)
    .bind(published_at)
    .bind(id)
    .fetch_one(&mut *tx)
    .await
    .map_err(slug_conflict)?;

    tx.commit().await?;
    Ok(post)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Blog post not found"));
    }
    Ok(())
}

pub async fn categories(pool: &SqlitePool) -> AppResult<Vec<String>> {
    Ok(super::query::distinct_categories(pool, "blog_posts").await?)
}

/// A concurrent writer can still win the race for a slug between our check
/// and the write; the UNIQUE index turns that into the same Conflict.
fn slug_conflict(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        AppError::conflict(SLUG_TAKEN)
    } else {
        AppError::Store(err)
    }
}
