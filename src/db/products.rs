//! Shop product repository

use chrono::Utc;
use sqlx::{types::Json, SqliteConnection, SqliteExecutor, SqlitePool};

use super::models::{merge_text, required, NewProduct, Product, UpdateProduct};
use super::query::{OrderBy, Select, SortOrder};
use crate::error::{AppError, AppResult};

macro_rules! product_columns {
    () => {
        "id, name, description, short_description, price, original_price, category, tags, \
         image_url, gallery_images, download_url, file_size, file_format, featured, active, \
         stock_quantity, sales_count, stripe_price_id, created_at, updated_at"
    };
}

/// Sortable product columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    CreatedAt,
    Price,
    SalesCount,
}

impl ProductSort {
    /// Unknown or missing names sort by creation time.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price") => ProductSort::Price,
            Some("sales_count") => ProductSort::SalesCount,
            _ => ProductSort::CreatedAt,
        }
    }

    fn column(self) -> &'static str {
        match self {
            ProductSort::CreatedAt => "created_at",
            ProductSort::Price => "price",
            ProductSort::SalesCount => "sales_count",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub sort: ProductSort,
    pub order: SortOrder,
    pub limit: Option<i64>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            featured: None,
            active: Some(true),
            sort: ProductSort::default(),
            order: SortOrder::default(),
            limit: None,
        }
    }
}

fn validate_price(price: f64, field: &str) -> AppResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "Invalid {}: must be a non-negative number",
            field
        )));
    }
    Ok(())
}

/// Stock is a count, or -1 for unlimited.
fn validate_stock(stock: i64) -> AppResult<()> {
    if stock < -1 {
        return Err(AppError::validation(
            "Invalid stock_quantity: must be -1 (unlimited) or a count",
        ));
    }
    Ok(())
}

pub async fn list(pool: &SqlitePool, filter: &ProductFilter) -> AppResult<Vec<Product>> {
    let mut select = Select::from("products", product_columns!());
    select
        .eq_opt("category", filter.category.clone())
        .eq_opt("featured", filter.featured)
        .eq_opt("active", filter.active)
        .order_by(&[
            OrderBy::by(filter.sort.column(), filter.order),
            OrderBy::by("id", filter.order),
        ])
        .limit(filter.limit);

    Ok(select.fetch_all(pool).await?)
}

pub async fn get(pool: &SqlitePool, id: i64) -> AppResult<Product> {
    let mut conn = pool.acquire().await?;
    fetch(&mut *conn, id).await
}

async fn fetch(conn: &mut SqliteConnection, id: i64) -> AppResult<Product> {
    sqlx::query_as::<_, Product>(concat!(
        "SELECT ",
        product_columns!(),
        " FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))
}

pub async fn create<'e, E>(executor: E, new: &NewProduct) -> AppResult<Product>
where
    E: SqliteExecutor<'e>,
{
    let name = required(&new.name, "name")?;
    let description = required(&new.description, "description")?;
    let price = new.price.ok_or_else(|| AppError::missing_field("price"))?;
    let category = required(&new.category, "category")?;
    validate_price(price, "price")?;
    if let Some(original) = new.original_price {
        validate_price(original, "original_price")?;
    }
    if let Some(stock) = new.stock_quantity {
        validate_stock(stock)?;
    }
    let now = Utc::now();

    let product = sqlx::query_as::<_, Product>(concat!(
        "INSERT INTO products (name, description, short_description, price, original_price, \
         category, tags, image_url, gallery_images, download_url, file_size, file_format, \
         featured, active, stock_quantity, sales_count, stripe_price_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
        product_columns!()
    ))
    .bind(name)
    .bind(description)
    .bind(&new.short_description)
    .bind(price)
    .bind(new.original_price)
    .bind(category)
    .bind(Json(&new.tags))
    .bind(&new.image_url)
    .bind(Json(&new.gallery_images))
    .bind(&new.download_url)
    .bind(&new.file_size)
    .bind(&new.file_format)
    .bind(new.featured.unwrap_or(false))
    .bind(new.active.unwrap_or(true))
    .bind(new.stock_quantity.unwrap_or(-1))
    .bind(new.sales_count.unwrap_or(0).max(0))
    .bind(&new.stripe_price_id)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;

    tracing::info!(product_id = product.id, "product created");
    Ok(product)
}

pub async fn update(pool: &SqlitePool, id: i64, changes: &UpdateProduct) -> AppResult<Product> {
    if let Some(price) = changes.price {
        validate_price(price, "price")?;
    }
    if let Some(original) = changes.original_price {
        validate_price(original, "original_price")?;
    }
    if let Some(stock) = changes.stock_quantity {
        validate_stock(stock)?;
    }

    let mut tx = pool.begin().await?;
    let existing = fetch(&mut *tx, id).await?;

    let name = merge_text(&changes.name, existing.name, "name")?;
    let description = merge_text(&changes.description, existing.description, "description")?;
    let category = merge_text(&changes.category, existing.category, "category")?;
    let short_description = changes
        .short_description
        .clone()
        .or(existing.short_description);
    let price = changes.price.unwrap_or(existing.price);
    let original_price = changes.original_price.or(existing.original_price);
    let tags = changes.tags.clone().unwrap_or(existing.tags);
    let image_url = changes.image_url.clone().or(existing.image_url);
    let gallery_images = changes
        .gallery_images
        .clone()
        .unwrap_or(existing.gallery_images);
    let download_url = changes.download_url.clone().or(existing.download_url);
    let file_size = changes.file_size.clone().or(existing.file_size);
    let file_format = changes.file_format.clone().or(existing.file_format);
    let featured = changes.featured.unwrap_or(existing.featured);
    let active = changes.active.unwrap_or(existing.active);
    let stock_quantity = changes.stock_quantity.unwrap_or(existing.stock_quantity);
    let stripe_price_id = changes.stripe_price_id.clone().or(existing.stripe_price_id);

    let product = sqlx::query_as::<_, Product>(concat!(
        "UPDATE products SET name = ?, description = ?, short_description = ?, price = ?, \
         original_price = ?, category = ?, tags = ?, image_url = ?, gallery_images = ?, \
         download_url = ?, file_size = ?, file_format = ?, featured = ?, active = ?, \
         stock_quantity = ?, stripe_price_id = ?, updated_at = ? WHERE id = ? RETURNING ",
        product_columns!()
    ))
    .bind(&name)
    .bind(&description)
    .bind(&short_description)
    .bind(price)
    .bind(original_price)
    .bind(&category)
    .bind(Json(&tags))
    .bind(&image_url)
    .bind(Json(&gallery_images))
    .bind(&download_url)
    .bind(&file_size)
    .bind(&file_format)
    .bind(featured)
    .bind(active)
    .bind(stock_quantity)
    .bind(&stripe_price_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(product)
}

/// Counts one sale. Finite stock goes down by one but never below zero;
/// unlimited stock (-1) is left alone.
pub async fn record_purchase(pool: &SqlitePool, id: i64) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>(concat!(
        "UPDATE products SET sales_count = sales_count + 1, \
         stock_quantity = CASE WHEN stock_quantity > 0 THEN stock_quantity - 1 ELSE stock_quantity END, \
         updated_at = ? WHERE id = ? RETURNING ",
        product_columns!()
    ))
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    tracing::info!(
        product_id = product.id,
        sales_count = product.sales_count,
        stock_quantity = product.stock_quantity,
        "purchase recorded"
    );
    Ok(product)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }
    Ok(())
}

pub async fn categories(pool: &SqlitePool) -> AppResult<Vec<String>> {
    Ok(super::query::distinct_categories(pool, "products").await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample(name: &str, price: f64, stock: Option<i64>) -> NewProduct {
        NewProduct {
            name: Some(name.to_string()),
            description: Some("Digital download".to_string()),
            price: Some(price),
            category: Some("Templates".to_string()),
            stock_quantity: stock,
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_parse_is_lenient() {
        assert_eq!(ProductSort::parse(Some("price")), ProductSort::Price);
        assert_eq!(ProductSort::parse(Some("sales_count")), ProductSort::SalesCount);
        assert_eq!(ProductSort::parse(Some("name; DROP TABLE")), ProductSort::CreatedAt);
        assert_eq!(ProductSort::parse(None), ProductSort::CreatedAt);
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = test_pool().await;
        let product = create(&pool, &sample("Kit", 19.99, None)).await.unwrap();
        assert!(product.active);
        assert!(!product.featured);
        assert_eq!(product.stock_quantity, -1);
        assert_eq!(product.sales_count, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_or_negative_price() {
        let pool = test_pool().await;
        let mut new = sample("Kit", 1.0, None);
        new.price = None;
        let err = create(&pool, &new).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Missing required field: price"));

        let err = create(&pool, &sample("Kit", -5.0, None)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_stock_below_unlimited_is_rejected() {
        let pool = test_pool().await;
        let err = create(&pool, &sample("Kit", 1.0, Some(-2))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m.starts_with("Invalid stock_quantity")));

        let product = create(&pool, &sample("Kit", 1.0, Some(-1))).await.unwrap();
        let changes = UpdateProduct {
            stock_quantity: Some(-5),
            ..Default::default()
        };
        let err = update(&pool, product.id, &changes).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(get(&pool, product.id).await.unwrap().stock_quantity, -1);
    }

    #[tokio::test]
    async fn test_purchase_decrements_finite_stock() {
        let pool = test_pool().await;
        let product = create(&pool, &sample("Kit", 10.0, Some(3))).await.unwrap();
        let bought = record_purchase(&pool, product.id).await.unwrap();
        assert_eq!(bought.stock_quantity, 2);
        assert_eq!(bought.sales_count, 1);
    }

    #[tokio::test]
    async fn test_purchase_never_goes_below_zero() {
        let pool = test_pool().await;
        let product = create(&pool, &sample("Kit", 10.0, Some(0))).await.unwrap();
        let bought = record_purchase(&pool, product.id).await.unwrap();
        assert_eq!(bought.stock_quantity, 0);
        assert_eq!(bought.sales_count, 1);
    }

    #[tokio::test]
    async fn test_purchase_leaves_unlimited_stock() {
        let pool = test_pool().await;
        let product = create(&pool, &sample("Kit", 10.0, Some(-1))).await.unwrap();
        record_purchase(&pool, product.id).await.unwrap();
        let bought = record_purchase(&pool, product.id).await.unwrap();
        assert_eq!(bought.stock_quantity, -1);
        assert_eq!(bought.sales_count, 2);
    }

    #[tokio::test]
    async fn test_purchase_missing_is_not_found() {
        let pool = test_pool().await;
        let err = record_purchase(&pool, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_by_price_ascending_is_non_decreasing() {
        let pool = test_pool().await;
        for (name, price) in [("B", 49.0), ("A", 9.5), ("C", 19.0), ("D", 9.5)] {
            create(&pool, &sample(name, price, None)).await.unwrap();
        }
        let sorted = list(
            &pool,
            &ProductFilter {
                sort: ProductSort::Price,
                order: SortOrder::Asc,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(sorted.len(), 4);
        assert!(sorted.windows(2).all(|w| w[0].price <= w[1].price));
    }

    #[tokio::test]
    async fn test_list_hides_inactive_by_default() {
        let pool = test_pool().await;
        create(&pool, &sample("Live", 5.0, None)).await.unwrap();
        let mut retired = sample("Retired", 5.0, None);
        retired.active = Some(false);
        create(&pool, &retired).await.unwrap();

        let visible = list(&pool, &ProductFilter::default()).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Live");

        let all = list(
            &pool,
            &ProductFilter {
                active: None,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_sales_count() {
        let pool = test_pool().await;
        let product = create(&pool, &sample("Kit", 10.0, Some(5))).await.unwrap();
        record_purchase(&pool, product.id).await.unwrap();
        let updated = update(
            &pool,
            product.id,
            &UpdateProduct {
                price: Some(12.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 12.5);
        assert_eq!(updated.sales_count, 1);
        assert_eq!(updated.stock_quantity, 4);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let pool = test_pool().await;
        let err = delete(&pool, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
