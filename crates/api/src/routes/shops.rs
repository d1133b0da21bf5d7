//! Shop endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use artisania_core::{Address, BusinessType, Category, ShopId};

use super::address::ShopAddressInput;
use super::extract::{QueryParams, ValidatedJson, clean, parse_id, validate_not_blank, validate_phone};
use crate::db::shops::{NewShop, ShopUpdate};
use crate::error::Result;
use crate::middleware::{RequireAuth, RequireSeller};
use crate::models::{
    BusinessInfo, PageParams, Product, ProductSummary, ShopContact, ShopSettings, SocialMedia,
};
use crate::services::shops::ShopService;
use crate::state::AppState;

/// Products embedded in a shop page.
const SHOP_PAGE_PRODUCTS: u32 = 50;

const EARLIEST_FOUNDED_YEAR: i32 = 1900;

fn validate_founded_year(year: i32) -> std::result::Result<(), ValidationError> {
    if (EARLIEST_FOUNDED_YEAR..=Utc::now().year()).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::new("founded_year")
            .with_message("Founded year must be between 1900 and the current year".into()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInput {
    #[validate(email(message = "Please provide a valid contact email"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(url(message = "Website must be a valid URL"))]
    pub website: Option<String>,
}

impl From<ContactInput> for ShopContact {
    fn from(input: ContactInput) -> Self {
        Self {
            email: clean(input.email).map(|e| e.to_lowercase()),
            phone: input.phone.trim().to_string(),
            website: clean(input.website),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SocialMediaInput {
    #[validate(url(message = "Facebook must be a valid URL"))]
    pub facebook: Option<String>,
    #[validate(url(message = "Instagram must be a valid URL"))]
    pub instagram: Option<String>,
    #[validate(url(message = "Twitter must be a valid URL"))]
    pub twitter: Option<String>,
    #[validate(url(message = "YouTube must be a valid URL"))]
    pub youtube: Option<String>,
}

impl From<SocialMediaInput> for SocialMedia {
    fn from(input: SocialMediaInput) -> Self {
        Self {
            facebook: clean(input.facebook),
            instagram: clean(input.instagram),
            twitter: clean(input.twitter),
            youtube: clean(input.youtube),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfoInput {
    pub business_type: Option<BusinessType>,
    #[validate(length(max = 50, message = "Tax ID must be less than 50 characters"))]
    pub tax_id: Option<String>,
    #[validate(length(max = 50, message = "Registration number must be less than 50 characters"))]
    pub registration_number: Option<String>,
    #[validate(custom(function = "validate_founded_year"))]
    pub founded_year: Option<i32>,
}

impl From<BusinessInfoInput> for BusinessInfo {
    fn from(input: BusinessInfoInput) -> Self {
        Self {
            business_type: input.business_type.unwrap_or_default(),
            tax_id: clean(input.tax_id),
            registration_number: clean(input.registration_number),
            founded_year: input.founded_year,
        }
    }
}

/// POST /api/shops body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateShopRequest {
    #[validate(
        length(min = 1, max = 100, message = "Shop name is required and must be less than 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 1000,
        message = "Description is required and must be less than 1000 characters"
    ))]
    pub description: String,
    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo: Option<String>,
    #[validate(url(message = "Banner must be a valid URL"))]
    pub banner: Option<String>,
    #[validate(nested)]
    pub contact: ContactInput,
    #[validate(nested)]
    pub address: ShopAddressInput,
    #[validate(nested)]
    pub social_media: Option<SocialMediaInput>,
    #[validate(nested)]
    pub business_info: Option<BusinessInfoInput>,
    pub categories: Vec<Category>,
    pub settings: Option<ShopSettings>,
}

impl From<CreateShopRequest> for NewShop {
    fn from(req: CreateShopRequest) -> Self {
        Self {
            name: req.name.trim().to_string(),
            description: req.description.trim().to_string(),
            logo: clean(req.logo),
            banner: clean(req.banner),
            contact: req.contact.into(),
            address: Address::from(req.address),
            social_media: req.social_media.map(SocialMedia::from).unwrap_or_default(),
            business_info: req.business_info.map(BusinessInfo::from).unwrap_or_default(),
            categories: dedup_categories(req.categories),
            settings: req.settings.unwrap_or_default(),
        }
    }
}

/// PUT /api/shops/{id} body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShopRequest {
    #[validate(
        length(min = 1, max = 100, message = "Shop name must be less than 100 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Description must be less than 1000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Logo must be a valid URL"))]
    pub logo: Option<String>,
    #[validate(url(message = "Banner must be a valid URL"))]
    pub banner: Option<String>,
    #[validate(nested)]
    pub contact: Option<ContactInput>,
    #[validate(nested)]
    pub address: Option<ShopAddressInput>,
    #[validate(nested)]
    pub social_media: Option<SocialMediaInput>,
    #[validate(nested)]
    pub business_info: Option<BusinessInfoInput>,
    pub categories: Option<Vec<Category>>,
    pub settings: Option<ShopSettings>,
}

impl From<UpdateShopRequest> for ShopUpdate {
    fn from(req: UpdateShopRequest) -> Self {
        Self {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description.map(|d| d.trim().to_string()),
            logo: clean(req.logo),
            banner: clean(req.banner),
            contact: req.contact.map(ShopContact::from),
            address: req.address.map(Address::from),
            social_media: req.social_media.map(SocialMedia::from),
            business_info: req.business_info.map(BusinessInfo::from),
            categories: req.categories.map(dedup_categories),
            settings: req.settings,
        }
    }
}

fn dedup_categories(categories: Vec<Category>) -> Vec<Category> {
    let mut out: Vec<Category> = Vec::with_capacity(categories.len());
    for category in categories {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

/// Active shops.
///
/// GET /api/shops
pub async fn index(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>> {
    let page = ShopService::new(state.pool()).list(params).await?;
    Ok(Json(json!({
        "shops": page.items,
        "pagination": page.pagination,
    })))
}

/// The caller's own shop with product counts.
///
/// GET /api/shops/my-shop
pub async fn mine(
    State(state): State<AppState>,
    seller: RequireSeller,
) -> Result<Json<Value>> {
    let (shop, counts) = ShopService::new(state.pool()).mine(seller.actor()).await?;
    Ok(Json(json!({
        "shop": shop,
        "stats": counts,
    })))
}

/// An active shop and the first page of its products.
///
/// GET /api/shops/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: ShopId = parse_id(&id, "Shop")?;
    let params = PageParams {
        page: 1,
        limit: SHOP_PAGE_PRODUCTS,
    };
    let (shop, products) = ShopService::new(state.pool()).products(id, params).await?;
    let products: Vec<ProductSummary> = products.items.iter().map(Product::summary).collect();

    Ok(Json(json!({
        "shop": shop,
        "products": products,
    })))
}

/// An active shop's active products.
///
/// GET /api/shops/{id}/products
pub async fn products(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(params): QueryParams<PageParams>,
) -> Result<Json<Value>> {
    let id: ShopId = parse_id(&id, "Shop")?;
    let (_, page) = ShopService::new(state.pool()).products(id, params).await?;
    Ok(Json(json!({
        "products": page.items,
        "pagination": page.pagination,
    })))
}

/// Open the caller's shop.
///
/// POST /api/shops
pub async fn create(
    State(state): State<AppState>,
    seller: RequireSeller,
    ValidatedJson(req): ValidatedJson<CreateShopRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let shop = ShopService::new(state.pool())
        .create(seller.actor(), &NewShop::from(req))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Shop created successfully",
            "shop": shop,
        })),
    ))
}

/// PUT /api/shops/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateShopRequest>,
) -> Result<Json<Value>> {
    let id: ShopId = parse_id(&id, "Shop")?;
    let shop = ShopService::new(state.pool())
        .update(auth.actor(), id, &ShopUpdate::from(req))
        .await?;
    Ok(Json(json!({
        "message": "Shop updated successfully",
        "shop": shop,
    })))
}

/// Recompute the shop's product and sales counters.
///
/// PUT /api/shops/{id}/stats
pub async fn refresh_stats(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id: ShopId = parse_id(&id, "Shop")?;
    let stats = ShopService::new(state.pool())
        .refresh_stats(auth.actor(), id)
        .await?;
    Ok(Json(json!({
        "message": "Shop stats updated successfully",
        "stats": stats,
    })))
}
