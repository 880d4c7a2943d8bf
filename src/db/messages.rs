//! Contact message repository

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use super::models::{
    required, Message, MessageStats, MessageStatus, NewMessage, Priority, UpdateMessage,
};
use super::query::{OrderBy, Select};
use crate::error::{AppError, AppResult};

const DEFAULT_SOURCE: &str = "contact_form";

macro_rules! message_columns {
    () => {
        "id, name, email, subject, message, phone, company, project_type, budget_range, \
         status, priority, source, ip_address, user_agent, created_at, read_at, replied_at"
    };
}

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub status: Option<MessageStatus>,
    pub priority: Option<Priority>,
    pub limit: Option<i64>,
}

pub async fn list(pool: &SqlitePool, filter: &MessageFilter) -> AppResult<Vec<Message>> {
    let mut select = Select::from("messages", message_columns!());
    select
        .eq_opt("status", filter.status)
        .eq_opt("priority", filter.priority)
        .order_by(&[OrderBy::desc("created_at"), OrderBy::desc("id")])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> AppResult<Message> {
    sqlx::query_as::<_, Message>(concat!(
        "SELECT ",
        message_columns!(),
        " FROM messages WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::not_found("Message not found"))
}

/// Fetches a message, marking it read on first open.
pub async fn open(pool: &SqlitePool, id: i64) -> AppResult<Message> {
    let mut tx = pool.begin().await?;

    let marked = sqlx::query("UPDATE messages SET status = ?, read_at = ? WHERE id = ? AND status = ?")
        .bind(MessageStatus::Read)
        .bind(Utc::now())
        .bind(id)
        .bind(MessageStatus::New)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let message = fetch(&mut *tx, id).await?;
    tx.commit().await?;

    if marked > 0 {
        tracing::debug!(message_id = id, "message marked as read");
    }
    Ok(message)
}

pub async fn create<'e, E>(executor: E, new: &NewMessage) -> AppResult<Message>
where
    E: SqliteExecutor<'e>,
{
    let name = required(&new.name, "name")?;
    let email = required(&new.email, "email")?;
    let body = required(&new.message, "message")?;
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    let source = new
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SOURCE);

    let message = sqlx::query_as::<_, Message>(concat!(
        "INSERT INTO messages (name, email, subject, message, phone, company, project_type, \
         budget_range, status, priority, source, ip_address, user_agent, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
        message_columns!()
    ))
    .bind(name)
    .bind(email)
    .bind(&new.subject)
    .bind(body)
    .bind(&new.phone)
    .bind(&new.company)
    .bind(&new.project_type)
    .bind(&new.budget_range)
    .bind(MessageStatus::New)
    .bind(new.priority.unwrap_or_default())
    .bind(source)
    .bind(&new.ip_address)
    .bind(&new.user_agent)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    tracing::info!(message_id = message.id, source = %message.source, "contact message received");
    Ok(message)
}

/// Changes status and/or priority. The first move to `read` or `replied`
/// stamps the matching timestamp; later moves keep it.
pub async fn update(pool: &SqlitePool, id: i64, changes: &UpdateMessage) -> AppResult<Message> {
    let mut tx = pool.begin().await?;
    let message = apply_update(&mut *tx, id, changes).await?;
    tx.commit().await?;
    Ok(message)
}

/// [`update`] on a connection the caller already holds, usually inside its
/// own transaction.
pub async fn apply_update(
    conn: &mut SqliteConnection,
    id: i64,
    changes: &UpdateMessage,
) -> AppResult<Message> {
    let existing = fetch(&mut *conn, id).await?;

    let status = changes.status.unwrap_or(existing.status);
    let priority = changes.priority.unwrap_or(existing.priority);
    let now = Utc::now();
    let read_at = match (changes.status, existing.read_at) {
        (Some(MessageStatus::Read), None) => Some(now),
        (_, read_at) => read_at,
    };
    let replied_at = match (changes.status, existing.replied_at) {
        (Some(MessageStatus::Replied), None) => Some(now),
        (_, replied_at) => replied_at,
    };

    let message = sqlx::query_as::<_, Message>(concat!(
        "UPDATE messages SET status = ?, priority = ?, read_at = ?, replied_at = ? \
         WHERE id = ? RETURNING ",
        message_columns!()
    ))
    .bind(status)
    .bind(priority)
    .bind(read_at)
    .bind(replied_at)
    .bind(id)
    .fetch_one(conn)
    .await?;

    Ok(message)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Message not found"));
    }
    Ok(())
}

pub async fn stats(pool: &SqlitePool) -> AppResult<MessageStats> {
    let by_status: Vec<(MessageStatus, i64)> =
        sqlx::query_as("SELECT status, COUNT(*) FROM messages GROUP BY status")
            .fetch_all(pool)
            .await?;
    let by_priority: Vec<(Priority, i64)> =
        sqlx::query_as("SELECT priority, COUNT(*) FROM messages GROUP BY priority")
            .fetch_all(pool)
            .await?;

    let mut stats = MessageStats::default();
    for (status, count) in by_status {
        stats.total_messages += count;
        match status {
            MessageStatus::New => stats.new_messages = count,
            MessageStatus::Read => stats.read_messages = count,
            MessageStatus::Replied => stats.replied_messages = count,
            MessageStatus::Archived => stats.archived_messages = count,
        }
    }
    for (priority, count) in by_priority {
        match priority {
            Priority::Low => stats.low_priority = count,
            Priority::Normal => stats.normal_priority = count,
            Priority::High => stats.high_priority = count,
            Priority::Urgent => stats.urgent_priority = count,
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample(name: &str) -> NewMessage {
        NewMessage {
            name: Some(name.to_string()),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            message: Some("Hello there".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = test_pool().await;
        let message = create(&pool, &sample("Ada")).await.unwrap();
        assert_eq!(message.status, MessageStatus::New);
        assert_eq!(message.priority, Priority::Normal);
        assert_eq!(message.source, "contact_form");
        assert!(message.read_at.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let pool = test_pool().await;
        let mut new = sample("Ada");
        new.email = Some("not-an-email".to_string());
        let err = create(&pool, &new).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        new.email = None;
        let err = create(&pool, &new).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Missing required field: email"));
    }

    #[tokio::test]
    async fn test_open_marks_read_exactly_once() {
        let pool = test_pool().await;
        let message = create(&pool, &sample("Ada")).await.unwrap();

        let first = open(&pool, message.id).await.unwrap();
        assert_eq!(first.status, MessageStatus::Read);
        let read_at = first.read_at.expect("read_at stamped");

        let second = open(&pool, message.id).await.unwrap();
        assert_eq!(second.status, MessageStatus::Read);
        assert_eq!(second.read_at, Some(read_at));
    }

    #[tokio::test]
    async fn test_open_does_not_touch_replied_message() {
        let pool = test_pool().await;
        let message = create(&pool, &sample("Ada")).await.unwrap();
        update(
            &pool,
            message.id,
            &UpdateMessage {
                status: Some(MessageStatus::Replied),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let opened = open(&pool, message.id).await.unwrap();
        assert_eq!(opened.status, MessageStatus::Replied);
        assert!(opened.read_at.is_none());
    }

    #[tokio::test]
    async fn test_replied_at_set_only_once() {
        let pool = test_pool().await;
        let message = create(&pool, &sample("Ada")).await.unwrap();
        let replied = UpdateMessage {
            status: Some(MessageStatus::Replied),
            ..Default::default()
        };

        let first = update(&pool, message.id, &replied).await.unwrap();
        let replied_at = first.replied_at.expect("replied_at stamped");

        update(
            &pool,
            message.id,
            &UpdateMessage {
                status: Some(MessageStatus::Archived),
                priority: Some(Priority::High),
            },
        )
        .await
        .unwrap();
        let again = update(&pool, message.id, &replied).await.unwrap();
        assert_eq!(again.status, MessageStatus::Replied);
        assert_eq!(again.priority, Priority::High);
        assert_eq!(again.replied_at, Some(replied_at));
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = test_pool().await;
        let first = create(&pool, &sample("Ada")).await.unwrap();
        create(&pool, &sample("Grace")).await.unwrap();
        open(&pool, first.id).await.unwrap();

        let unread = list(
            &pool,
            &MessageFilter {
                status: Some(MessageStatus::New),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].name, "Grace");
    }

    #[tokio::test]
    async fn test_stats_counts_status_and_priority() {
        let pool = test_pool().await;
        let a = create(&pool, &sample("Ada")).await.unwrap();
        let mut urgent = sample("Grace");
        urgent.priority = Some(Priority::Urgent);
        create(&pool, &urgent).await.unwrap();
        create(&pool, &sample("Linus")).await.unwrap();
        open(&pool, a.id).await.unwrap();

        let stats = stats(&pool).await.unwrap();
        assert_eq!(
            stats,
            MessageStats {
                total_messages: 3,
                new_messages: 2,
                read_messages: 1,
                normal_priority: 2,
                urgent_priority: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let pool = test_pool().await;
        let err = delete(&pool, 5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
