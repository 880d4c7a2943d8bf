//! Page-view and interaction analytics.
//!
//! Every aggregate is a grouped count over rows whose `created_at` falls in a
//! trailing window. Each dashboard call scans the window in full; there is no
//! caching or pre-aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, SqliteExecutor, SqlitePool};

use super::models::{required, Interaction, NewInteraction, NewPageView, PageView};
use super::query::{OrderBy, Select};
use crate::error::{AppError, AppResult};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Longest window the dashboard will zero-fill, about ten years
pub const MAX_WINDOW_DAYS: i64 = 3660;

const TOP_N: i64 = 10;

macro_rules! page_view_columns {
    () => {
        "id, page_url, page_title, referrer, user_agent, ip_address, session_id, device_type, \
         browser, os, country, city, duration, created_at"
    };
}

macro_rules! interaction_columns {
    () => {
        "id, event_type, element_id, element_class, element_text, page_url, session_id, \
         ip_address, extra_data, created_at"
    };
}

/// Trailing time window `[now - days, now]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub days: i64,
    pub since: DateTime<Utc>,
}

impl Window {
    pub fn trailing(days: i64) -> AppResult<Self> {
        Self::ending_at(days, Utc::now())
    }

    pub fn ending_at(days: i64, now: DateTime<Utc>) -> AppResult<Self> {
        if days < 1 {
            return Err(AppError::validation("Invalid days: must be at least 1"));
        }
        if days > MAX_WINDOW_DAYS {
            return Err(AppError::validation(format!(
                "Invalid days: must be at most {}",
                MAX_WINDOW_DAYS
            )));
        }
        let since = Duration::try_days(days)
            .and_then(|span| now.checked_sub_signed(span))
            .ok_or_else(|| AppError::validation("Invalid days: window too large"))?;
        Ok(Self { days, since })
    }
}

pub async fn record_page_view<'e, E>(
    executor: E,
    new: &NewPageView,
    at: DateTime<Utc>,
) -> AppResult<PageView>
where
    E: SqliteExecutor<'e>,
{
    let page_url = required(&new.page_url, "page_url")?;

    let view = sqlx::query_as::<_, PageView>(concat!(
        "INSERT INTO page_views (page_url, page_title, referrer, user_agent, ip_address, \
         session_id, device_type, browser, os, country, city, duration, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
        page_view_columns!()
    ))
    .bind(page_url)
    .bind(&new.page_title)
    .bind(&new.referrer)
    .bind(&new.user_agent)
    .bind(&new.ip_address)
    .bind(&new.session_id)
    .bind(&new.device_type)
    .bind(&new.browser)
    .bind(&new.os)
    .bind(&new.country)
    .bind(&new.city)
    .bind(new.duration)
    .bind(at)
    .fetch_one(executor)
    .await?;

    tracing::debug!(page_url = %view.page_url, "page view recorded");
    Ok(view)
}

pub async fn record_interaction<'e, E>(
    executor: E,
    new: &NewInteraction,
    at: DateTime<Utc>,
) -> AppResult<Interaction>
where
    E: SqliteExecutor<'e>,
{
    let event_type = required(&new.event_type, "event_type")?;
    let page_url = required(&new.page_url, "page_url")?;
    let extra_data = match &new.extra_data {
        Some(value) if !value.is_null() => value.clone(),
        _ => serde_json::json!({}),
    };

    let interaction = sqlx::query_as::<_, Interaction>(concat!(
        "INSERT INTO interactions (event_type, element_id, element_class, element_text, \
         page_url, session_id, ip_address, extra_data, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
        interaction_columns!()
    ))
    .bind(event_type)
    .bind(&new.element_id)
    .bind(&new.element_class)
    .bind(&new.element_text)
    .bind(page_url)
    .bind(&new.session_id)
    .bind(&new.ip_address)
    .bind(Json(&extra_data))
    .bind(at)
    .fetch_one(executor)
    .await?;

    tracing::debug!(event_type = %interaction.event_type, "interaction recorded");
    Ok(interaction)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PageCount {
    pub url: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceCount {
    pub device: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BrowserCount {
    pub browser: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReferrerCount {
    pub referrer: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventCount {
    pub event: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub window_days: i64,
    pub since: DateTime<Utc>,
    pub total_pageviews: i64,
    /// Distinct IP addresses; NAT and dynamic addresses make this approximate
    pub unique_visitors: i64,
    pub popular_pages: Vec<PageCount>,
    pub device_stats: Vec<DeviceCount>,
    pub browser_stats: Vec<BrowserCount>,
    pub referrer_stats: Vec<ReferrerCount>,
    pub daily_views: Vec<DailyViews>,
    pub top_interactions: Vec<EventCount>,
}

pub async fn dashboard(pool: &SqlitePool, window: Window) -> AppResult<Dashboard> {
    let since = window.since;

    let (total_pageviews, unique_visitors): (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COUNT(DISTINCT ip_address) FROM page_views WHERE created_at >= ?",
    )
    .bind(since)
    .fetch_one(pool)
    .await?;

    let popular_pages = sqlx::query_as::<_, PageCount>(
        "SELECT page_url AS url, COUNT(*) AS views FROM page_views WHERE created_at >= ? \
         GROUP BY page_url ORDER BY views DESC, url LIMIT ?",
    )
    .bind(since)
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    let device_stats = sqlx::query_as::<_, DeviceCount>(
        "SELECT device_type AS device, COUNT(*) AS count FROM page_views WHERE created_at >= ? \
         GROUP BY device_type ORDER BY count DESC, device",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let browser_stats = sqlx::query_as::<_, BrowserCount>(
        "SELECT browser, COUNT(*) AS count FROM page_views WHERE created_at >= ? \
         GROUP BY browser ORDER BY count DESC, browser LIMIT ?",
    )
    .bind(since)
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    let referrer_stats = sqlx::query_as::<_, ReferrerCount>(
        "SELECT referrer, COUNT(*) AS count FROM page_views \
         WHERE created_at >= ? AND referrer IS NOT NULL AND referrer != '' \
         GROUP BY referrer ORDER BY count DESC, referrer LIMIT ?",
    )
    .bind(since)
    .bind(TOP_N)
    .fetch_all(pool)
    .await?;

    // Timestamps are stored as RFC 3339 UTC text, so the first ten
    // characters are the calendar date.
    let per_day: Vec<(String, i64)> = sqlx::query_as(
        "SELECT substr(created_at, 1, 10) AS day, COUNT(*) FROM page_views \
         WHERE created_at >= ? GROUP BY day ORDER BY day",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    let daily_views = fill_daily_views(&per_day, since.date_naive(), Utc::now().date_naive());

    let top_interactions = sqlx::query_as::<_, EventCount>(
        "SELECT event_type AS event, COUNT(*) AS count FROM interactions WHERE created_at >= ? \
         GROUP BY event_type ORDER BY count DESC, event",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(Dashboard {
        window_days: window.days,
        since,
        total_pageviews,
        unique_visitors,
        popular_pages,
        device_stats,
        browser_stats,
        referrer_stats,
        daily_views,
        top_interactions,
    })
}

/// One entry per calendar date in `[start, end]`; dates without views are 0.
fn fill_daily_views(counts: &[(String, i64)], start: NaiveDate, end: NaiveDate) -> Vec<DailyViews> {
    let by_date: BTreeMap<NaiveDate, i64> = counts
        .iter()
        .filter_map(|(day, views)| {
            NaiveDate::parse_from_str(day, "%Y-%m-%d")
                .ok()
                .map(|date| (date, *views))
        })
        .collect();

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| DailyViews {
            date,
            views: by_date.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct PageViewFilter {
    pub page_url: Option<String>,
    pub window: Window,
    pub limit: Option<i64>,
}

pub async fn list_page_views(pool: &SqlitePool, filter: &PageViewFilter) -> AppResult<Vec<PageView>> {
    let mut select = Select::from("page_views", page_view_columns!());
    select
        .since("created_at", filter.window.since)
        .eq_opt("page_url", filter.page_url.clone())
        .order_by(&[OrderBy::desc("created_at"), OrderBy::desc("id")])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}

#[derive(Debug, Clone)]
pub struct InteractionFilter {
    pub event_type: Option<String>,
    pub page_url: Option<String>,
    pub window: Window,
    pub limit: Option<i64>,
}

pub async fn list_interactions(
    pool: &SqlitePool,
    filter: &InteractionFilter,
) -> AppResult<Vec<Interaction>> {
    let mut select = Select::from("interactions", interaction_columns!());
    select
        .since("created_at", filter.window.since)
        .eq_opt("event_type", filter.event_type.clone())
        .eq_opt("page_url", filter.page_url.clone())
        .order_by(&[OrderBy::desc("created_at"), OrderBy::desc("id")])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}
