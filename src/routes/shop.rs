/**
 * Shop Routes
 * Product catalogue and purchase counting
 */
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::{created, ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Envelope};
use crate::db::{
    models::{NewProduct, Product, UpdateProduct},
    products::{self, ProductFilter, ProductSort},
    query::{non_empty, parse_flag, SortOrder},
};
use crate::error::AppResult;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/shop/products", get(list_products).post(create_product))
        .route("/shop/categories", get(list_categories))
        .route(
            "/shop/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/shop/products/{id}/purchase", post(purchase_product))
}

/// Query parameters for GET /api/shop/products
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub featured: Option<String>,
    pub active: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
}

impl From<ProductListQuery> for ProductFilter {
    fn from(query: ProductListQuery) -> Self {
        Self {
            category: non_empty(query.category.as_deref()).map(str::to_string),
            featured: parse_flag(query.featured.as_deref()),
            active: parse_flag(query.active.as_deref()).or(Some(true)),
            sort: ProductSort::parse(query.sort_by.as_deref()),
            order: SortOrder::parse(query.order.as_deref()),
            limit: query.limit,
        }
    }
}

/// GET /api/shop/products
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductListQuery>,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let products = products::list(&state.pool, &query.into()).await?;
    Ok(Json(Envelope::list(products)))
}

/// GET /api/shop/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Product>> {
    Ok(Json(Envelope::data(products::get(&state.pool, id).await?)))
}

/// POST /api/shop/products
pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewProduct>,
) -> AppResult<impl IntoResponse> {
    let product = products::create(&state.pool, &payload).await?;
    Ok(created(
        Envelope::data(product).with_message("Product created successfully"),
    ))
}

/// PUT /api/shop/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateProduct>,
) -> AppResult<ApiResponse<Product>> {
    let product = products::update(&state.pool, id, &payload).await?;
    Ok(Json(
        Envelope::data(product).with_message("Product updated successfully"),
    ))
}

/// DELETE /api/shop/products/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<()>> {
    products::delete(&state.pool, id).await?;
    Ok(Json(Envelope::message("Product deleted successfully")))
}

/// POST /api/shop/products/{id}/purchase
///
/// Records the sale only; payment happens elsewhere.
pub async fn purchase_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<ApiResponse<Product>> {
    let product = products::record_purchase(&state.pool, id).await?;
    Ok(Json(
        Envelope::data(product).with_message("Purchase recorded successfully"),
    ))
}

/// GET /api/shop/categories
pub async fn list_categories(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<String>>> {
    Ok(Json(Envelope::data(products::categories(&state.pool).await?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{delete, get, json, send, state};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn app() -> Router {
        routes().with_state(state().await)
    }

    fn product(name: &str, price: f64) -> serde_json::Value {
        json!({
            "name": name,
            "description": "A downloadable kit",
            "price": price,
            "category": "Templates"
        })
    }

    #[tokio::test]
    async fn test_sorted_by_price_ascending() {
        let app = app().await;
        for (name, price) in [("Mid", 20.0), ("Cheap", 5.0), ("Pricey", 99.0)] {
            let (status, _) = send(&app, json("POST", "/shop/products", &product(name, price))).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, get("/shop/products?sort_by=price&order=asc")).await;
        assert_eq!(status, StatusCode::OK);
        let prices: Vec<f64> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["price"].as_f64().unwrap())
            .collect();
        assert_eq!(prices, vec![5.0, 20.0, 99.0]);

        let (status, body) = send(&app, get("/shop/products?sort_by=bogus&order=sideways")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
    }

    #[tokio::test]
    async fn test_purchase_updates_counts() {
        let app = app().await;
        let mut limited = product("Limited", 10.0);
        limited["stock_quantity"] = json!(3);
        let (_, created) = send(&app, json("POST", "/shop/products", &limited)).await;
        let id = created["data"]["id"].as_i64().unwrap();

        let (status, body) = send(&app, json("POST", &format!("/shop/products/{}/purchase", id), &json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["stock_quantity"], 2);
        assert_eq!(body["data"]["sales_count"], 1);
    }

    #[tokio::test]
    async fn test_purchase_missing_is_404() {
        let app = app().await;
        let (status, body) = send(&app, json("POST", "/shop/products/77/purchase", &json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_missing_price_is_400() {
        let app = app().await;
        let mut body = product("Kit", 1.0);
        body.as_object_mut().unwrap().remove("price");
        let (status, body) = send(&app, json("POST", "/shop/products", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required field: price");
    }

    #[tokio::test]
    async fn test_delete_missing_is_404() {
        let app = app().await;
        let (status, _) = send(&app, delete("/shop/products/3")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
