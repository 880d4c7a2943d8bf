//! Project repository

use chrono::Utc;
use sqlx::{types::Json, SqliteConnection, SqliteExecutor, SqlitePool};

use super::models::{merge_text, required, NewProject, Project, ProjectStatus, UpdateProject};
use super::query::{OrderBy, Select};
use crate::error::{AppError, AppResult};

macro_rules! project_columns {
    () => {
        "id, title, description, short_description, category, tags, tech_stack, \
         image_url, demo_url, github_url, featured, status, created_at, updated_at"
    };
}

/// Allow-listed equality filters for GET /projects
#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
    pub limit: Option<i64>,
}

pub async fn list(pool: &SqlitePool, filter: &ProjectFilter) -> AppResult<Vec<Project>> {
    let mut select = Select::from("projects", project_columns!());
    select
        .eq_opt("category", filter.category.clone())
        .eq_opt("featured", filter.featured)
        .eq_opt("status", filter.status)
        .order_by(&[OrderBy::desc("created_at"), OrderBy::desc("id")])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Project> {
    let mut conn = pool.acquire().await?;
    fetch(&mut *conn, id).await
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> AppResult<Project> {
    sqlx::query_as::<_, Project>(concat!(
        "SELECT ",
        project_columns!(),
        " FROM projects WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::not_found("Project not found"))
}

pub async fn create<'e, E>(executor: E, new: &NewProject) -> AppResult<Project>
where
    E: SqliteExecutor<'e>,
{
    let title = required(&new.title, "title")?;
    let description = required(&new.description, "description")?;
    let category = required(&new.category, "category")?;
    let now = Utc::now();

    let project = sqlx::query_as::<_, Project>(concat!(
        "INSERT INTO projects (title, description, short_description, category, tags, tech_stack, \
         image_url, demo_url, github_url, featured, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
        project_columns!()
    ))
    .bind(title)
    .bind(description)
    .bind(&new.short_description)
    .bind(category)
    .bind(Json(&new.tags))
    .bind(Json(&new.tech_stack))
    .bind(&new.image_url)
    .bind(&new.demo_url)
    .bind(&new.github_url)
    .bind(new.featured.unwrap_or(false))
    .bind(new.status.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;

    tracing::info!(project_id = project.id, "project created");
    Ok(project)
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &UpdateProject) -> AppResult<Project> {
    let mut tx = pool.begin().await?;
    let existing = fetch(&mut *tx, id).await?;

    let title = merge_text(&changes.title, existing.title, "title")?;
    let description = merge_text(&changes.description, existing.description, "description")?;
    let category = merge_text(&changes.category, existing.category, "category")?;
    let short_description = changes
        .short_description
        .clone()
        .or(existing.short_description);
    let tags = changes.tags.clone().unwrap_or(existing.tags);
    let tech_stack = changes.tech_stack.clone().unwrap_or(existing.tech_stack);
    let image_url = changes.image_url.clone().or(existing.image_url);
    let demo_url = changes.demo_url.clone().or(existing.demo_url);
    let github_url = changes.github_url.clone().or(existing.github_url);
    let featured = changes.featured.unwrap_or(existing.featured);
    let status = changes.status.unwrap_or(existing.status);

    let project = sqlx::query_as::<_, Project>(concat!(
        "UPDATE projects SET title = ?, description = ?, short_description = ?, category = ?, \
         tags = ?, tech_stack = ?, image_url = ?, demo_url = ?, github_url = ?, featured = ?, \
         status = ?, updated_at = ? WHERE id = ? RETURNING ",
        project_columns!()
    ))
    .bind(&title)
    .bind(&description)
    .bind(&short_description)
    .bind(&category)
    .bind(Json(&tags))
    .bind(Json(&tech_stack))
    .bind(&image_url)
    .bind(&demo_url)
    .bind(&github_url)
    .bind(featured)
    .bind(status)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(project)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Project not found"));
    }
    Ok(())
}

pub async fn categories(pool: &SqlitePool) -> AppResult<Vec<String>> {
    Ok(super::query::distinct_categories(pool, "projects").await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample(title: &str, category: &str) -> NewProject {
        NewProject {
            title: Some(title.to_string()),
            description: Some("A project".to_string()),
            category: Some(category.to_string()),
            tags: vec!["Rust".to_string(), "Axum".to_string(), "SQLite".to_string()],
            tech_stack: vec!["tokio".to_string(), "sqlx".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_keeps_tag_order() {
        let pool = test_pool().await;
        let project = create(&pool, &sample("Portfolio", "Web")).await.unwrap();
        assert_eq!(project.status, ProjectStatus::Completed);
        assert!(!project.featured);
        assert_eq!(project.tags, vec!["Rust", "Axum", "SQLite"]);

        let fetched = get(&pool, project.id).await.unwrap();
        assert_eq!(fetched.tags, vec!["Rust", "Axum", "SQLite"]);
        assert_eq!(fetched.tech_stack, vec!["tokio", "sqlx"]);
    }

    #[tokio::test]
    async fn test_create_missing_field_is_validation_error() {
        let pool = test_pool().await;
        let mut new = sample("Portfolio", "Web");
        new.category = None;
        let err = create(&pool, &new).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Missing required field: category"));
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let pool = test_pool().await;
        create(&pool, &sample("First", "Web")).await.unwrap();
        let mut featured = sample("Second", "Web");
        featured.featured = Some(true);
        create(&pool, &featured).await.unwrap();
        create(&pool, &sample("Third", "IoT")).await.unwrap();

        let all = list(&pool, &ProjectFilter::default()).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);

        let web_featured = list(
            &pool,
            &ProjectFilter {
                category: Some("Web".to_string()),
                featured: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(web_featured.len(), 1);
        assert_eq!(web_featured[0].title, "Second");

        let limited = list(
            &pool,
            &ProjectFilter {
                limit: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let pool = test_pool().await;
        let project = create(&pool, &sample("Portfolio", "Web")).await.unwrap();
        let updated = update(
            &pool,
            project.id,
            &UpdateProject {
                status: Some(ProjectStatus::InProgress),
                tags: Some(vec!["Zig".to_string(), "C".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, ProjectStatus::InProgress);
        assert_eq!(updated.tags, vec!["Zig", "C"]);
        assert_eq!(updated.title, "Portfolio");
        assert_eq!(updated.tech_stack, project.tech_stack);
        assert_eq!(updated.created_at, project.created_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_is_not_found() {
        let pool = test_pool().await;
        let err = update(&pool, 42, &UpdateProject::default()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = delete(&pool, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_categories_are_distinct() {
        let pool = test_pool().await;
        create(&pool, &sample("A", "Web")).await.unwrap();
        create(&pool, &sample("B", "Web")).await.unwrap();
        create(&pool, &sample("C", "AI/ML")).await.unwrap();
        assert_eq!(categories(&pool).await.unwrap(), vec!["AI/ML", "Web"]);
    }
}
