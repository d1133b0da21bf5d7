//! Product endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use artisania_core::{Category, Money, ProductId};

use super::extract::{QueryParams, ValidatedJson, parse_id, validate_not_blank};
use crate::db::products::{ActiveFilter, NewProduct, ProductUpdate};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, RequireSeller};
use crate::models::{PageParams, ProductImage, Specifications};
use crate::services::products::ProductService;
use crate::state::AppState;

fn validate_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if price.is_sign_negative() {
        return Err(ValidationError::new("price").with_message("Price must be a positive number".into()));
    }
    Ok(())
}

fn to_money(price: Decimal) -> Result<Money> {
    Money::new(price).map_err(|e| AppError::BadRequest(e.to_string()))
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ImageInput {
    #[validate(url(message = "Image URL must be valid"))]
    pub url: String,
    #[validate(length(max = 200, message = "Alt text must be less than 200 characters"))]
    pub alt: String,
}

impl From<ImageInput> for ProductImage {
    fn from(input: ImageInput) -> Self {
        Self {
            url: input.url.trim().to_string(),
            alt: input.alt.trim().to_string(),
        }
    }
}

/// POST /api/products body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(
        length(min = 1, max = 100, message = "Product name is required and must be less than 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description is required and must be less than 1000 characters"
    ))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub category: Category,
    #[serde(default)]
    #[validate(nested)]
    pub images: Vec<ImageInput>,
    #[validate(range(min = 0, message = "Stock must be a non-negative integer"))]
    pub stock: i32,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub is_featured: bool,
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct> {
        Ok(NewProduct {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: to_money(self.price)?,
            category: self.category,
            images: self.images.into_iter().map(ProductImage::from).collect(),
            stock: self.stock,
            specifications: self.specifications,
            is_featured: self.is_featured,
        })
    }
}

/// PUT /api/products/{id} body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(
        length(min = 1, max = 100, message = "Product name must be less than 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    #[validate(nested)]
    pub images: Option<Vec<ImageInput>>,
    #[validate(range(min = 0, message = "Stock must be a non-negative integer"))]
    pub stock: Option<i32>,
    pub specifications: Option<Specifications>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl UpdateProductRequest {
    fn into_update(self) -> Result<ProductUpdate> {
        Ok(ProductUpdate {
            name: self.name.map(|n| n.trim().to_string()),
            description: self.description.map(|d| d.trim().to_string()),
            price: self.price.map(to_money).transpose()?,
            category: self.category,
            images: self
                .images
                .map(|images| images.into_iter().map(ProductImage::from).collect()),
            stock: self.stock,
            specifications: self.specifications,
            is_active: self.is_active,
            is_featured: self.is_featured,
            tags: None,
        })
    }
}

/// `?status=active|inactive` on the seller's product list.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Inactive,
}

#[derive(Debug, Deserialize)]
pub struct MyProductsQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub status: Option<StatusFilter>,
}

fn default_page() -> u32 {
    PageParams::default().page
}

fn default_limit() -> u32 {
    PageParams::default().limit
}

impl MyProductsQuery {
    const fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }

    const fn filter(&self) -> ActiveFilter {
        match self.status {
            None => ActiveFilter::Any,
            Some(StatusFilter::Active) => ActiveFilter::Active,
            Some(StatusFilter::Inactive) => ActiveFilter::Inactive,
        }
    }
}

/// Active products of active shops.
///
/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>> {
    let page = ProductService::new(state.pool()).list(params).await?;
    Ok(Json(json!({
        "products": page.items,
        "pagination": page.pagination,
    })))
}

/// The caller's products, including inactive ones unless filtered.
///
/// GET /api/products/my-products
pub async fn mine(
    State(state): State<AppState>,
    seller: RequireSeller,
    QueryParams(query): QueryParams<MyProductsQuery>,
) -> Result<Json<Value>> {
    let page = ProductService::new(state.pool())
        .list_mine(seller.actor(), query.filter(), query.page_params())
        .await?;
    Ok(Json(json!({
        "products": page.items,
        "pagination": page.pagination,
    })))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: ProductId = parse_id(&id, "Product")?;
    let product = ProductService::new(state.pool()).get_active(id).await?;
    Ok(Json(json!({ "product": product })))
}

/// Add a product to the caller's shop.
///
/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    seller: RequireSeller,
    ValidatedJson(req): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let product = ProductService::new(state.pool())
        .create(seller.actor(), &req.into_new_product()?)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Product created successfully",
            "product": product,
        })),
    ))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<Value>> {
    let id: ProductId = parse_id(&id, "Product")?;
    let product = ProductService::new(state.pool())
        .update(auth.actor(), id, req.into_update()?)
        .await?;
    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": product,
    })))
}

/// Soft-delete a product.
///
/// DELETE /api/products/{id}
pub async fn destroy(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: ProductId = parse_id(&id, "Product")?;
    ProductService::new(state.pool())
        .delete(auth.actor(), id)
        .await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_create_product_request() {
        let req: CreateProductRequest = serde_json::from_value(json!({
            "name": "Berber rug",
            "description": "Hand-knotted wool from the Middle Atlas",
            "price": "1250.5",
            "category": "textiles",
            "stock": 3,
            "images": [{ "url": "https://cdn.artisania.ma/rug.jpg", "alt": "Rug" }]
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let product = req.into_new_product().unwrap();
        assert_eq!(product.price.to_string(), "1250.50");
        assert_eq!(product.images.len(), 1);
        assert!(!product.is_featured);
    }

    #[test]
    fn test_create_product_request_rejects_bad_values() {
        let req: CreateProductRequest = serde_json::from_value(json!({
            "name": "",
            "description": "x",
            "price": -1,
            "category": "jewelry",
            "stock": -2,
            "images": [{ "url": "nope" }]
        }))
        .unwrap();
        let fields: Vec<String> = crate::error::field_errors(&req.validate().unwrap_err())
            .into_iter()
            .map(|f| f.field)
            .collect();
        assert!(fields.contains(&"name".to_string()));
        assert!(fields.contains(&"price".to_string()));
        assert!(fields.contains(&"stock".to_string()));
        assert!(fields.contains(&"images[0].url".to_string()));
    }

    #[test]
    fn test_unknown_category_fails_to_parse() {
        let result = serde_json::from_value::<CreateProductRequest>(json!({
            "name": "Lamp",
            "description": "Brass",
            "price": 10,
            "category": "plastics",
            "stock": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_my_products_filter() {
        let query: MyProductsQuery =
            serde_json::from_value(json!({ "status": "inactive" })).unwrap();
        assert_eq!(query.filter(), ActiveFilter::Inactive);
        assert_eq!(query.page_params().page(), 1);

        let query: MyProductsQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.filter(), ActiveFilter::Any);
    }
}
