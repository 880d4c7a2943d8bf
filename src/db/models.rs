//! Database Models - structs representing database tables (used by sqlx/serde),
//! plus the create/update payloads accepted for each entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Enumerations stored as TEXT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Completed,
    InProgress,
    Planned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: Option<String>,
    pub category: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New project for creation. Required fields are optional here so that a
/// missing one is reported as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
}

/// Project update; only supplied fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tech_stack: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProjectStatus>,
}

// ============================================================================
// Blog post
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub reading_time: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBlogPost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBlogPost {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
}

// ============================================================================
// Product
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    pub price: f64,
    pub original_price: Option<f64>,
    pub category: String,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    #[sqlx(json)]
    pub gallery_images: Vec<String>,
    pub download_url: Option<String>,
    pub file_size: Option<String>,
    pub file_format: Option<String>,
    pub featured: bool,
    pub active: bool,
    /// -1 means unlimited (digital goods)
    pub stock_quantity: i64,
    pub sales_count: i64,
    /// Opaque Stripe price reference
    pub stripe_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery_images: Vec<String>,
    pub download_url: Option<String>,
    pub file_size: Option<String>,
    pub file_format: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub sales_count: Option<i64>,
    pub stripe_price_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub price: Option<f64>,
    pub original_price: Option<f64>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub gallery_images: Option<Vec<String>>,
    pub download_url: Option<String>,
    pub file_size: Option<String>,
    pub file_format: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub stock_quantity: Option<i64>,
    pub stripe_price_id: Option<String>,
}

// ============================================================================
// Contact message
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    pub status: MessageStatus,
    pub priority: Priority,
    pub source: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    pub replied_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub project_type: Option<String>,
    pub budget_range: Option<String>,
    pub priority: Option<Priority>,
    pub source: Option<String>,
    /// Filled from the connection when absent
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMessage {
    pub status: Option<MessageStatus>,
    pub priority: Option<Priority>,
}

/// Message counts by status and priority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    pub total_messages: i64,
    pub new_messages: i64,
    pub read_messages: i64,
    pub replied_messages: i64,
    pub archived_messages: i64,
    pub low_priority: i64,
    pub normal_priority: i64,
    pub high_priority: i64,
    pub urgent_priority: i64,
}

// ============================================================================
// Analytics
// ============================================================================

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageView {
    pub id: i64,
    pub page_url: String,
    pub page_title: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub session_id: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    /// Seconds spent on the page
    pub duration: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPageView {
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub session_id: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub event_type: String,
    pub element_id: Option<String>,
    pub element_class: Option<String>,
    pub element_text: Option<String>,
    pub page_url: String,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    #[sqlx(json)]
    pub extra_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewInteraction {
    pub event_type: Option<String>,
    pub element_id: Option<String>,
    pub element_class: Option<String>,
    pub element_text: Option<String>,
    pub page_url: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    #[serde(alias = "metadata")]
    pub extra_data: Option<serde_json::Value>,
}

/// Returns the trimmed value of a required text field or the matching
/// validation error.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> crate::error::AppResult<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(crate::error::AppError::missing_field(field)),
    }
}

/// Keeps the existing value unless a replacement is supplied; a supplied
/// replacement for a required field must not be blank.
pub fn merge_text(
    supplied: &Option<String>,
    existing: String,
    field: &str,
) -> crate::error::AppResult<String> {
    match supplied {
        Some(value) if value.trim().is_empty() => Err(crate::error::AppError::validation(
            format!("Field cannot be empty: {}", field),
        )),
        Some(value) => Ok(value.trim().to_string()),
        None => Ok(existing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&MessageStatus::Replied).unwrap(), "\"replied\"");
        assert_eq!(serde_json::to_string(&Priority::Urgent).unwrap(), "\"urgent\"");
    }

    #[test]
    fn test_required_rejects_blank_and_missing() {
        assert!(required(&None, "title").is_err());
        assert!(required(&Some("   ".to_string()), "title").is_err());
        assert_eq!(required(&Some(" Hello ".to_string()), "title").unwrap(), "Hello");
    }

    #[test]
    fn test_interaction_accepts_metadata_alias() {
        let payload: NewInteraction = serde_json::from_value(serde_json::json!({
            "event_type": "click",
            "page_url": "/",
            "metadata": { "button": "cta" }
        }))
        .unwrap();
        assert_eq!(payload.extra_data.unwrap()["button"], "cta");
    }

    #[test]
    fn test_update_payload_omitted_fields_are_none() {
        let update: UpdateProject =
            serde_json::from_value(serde_json::json!({ "featured": true })).unwrap();
        assert_eq!(update.featured, Some(true));
        assert!(update.title.is_none());
        assert!(update.tags.is_none());
    }
}
