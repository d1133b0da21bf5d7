//! Seed a development database with a demo seller, shop, and catalog.
//!
//! Re-running is safe: an existing demo seller is reported and left alone.

use artisania_api::db::products::NewProduct;
use artisania_api::db::shops::NewShop;
use artisania_api::models::{
    BusinessInfo, ProductImage, ShopContact, ShopSettings, SocialMedia, Specifications,
};
use artisania_api::services::Actor;
use artisania_api::services::auth::{AuthError, AuthService, Registration};
use artisania_api::services::products::ProductService;
use artisania_api::services::shops::ShopService;
use artisania_core::{Address, Category, Money, UserRole};

use super::{CommandError, connect};

pub const DEMO_SELLER_EMAIL: &str = "seller@artisania.test";

/// Insert the demo seller with one shop and a handful of products.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn demo(password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let registration = Registration {
        first_name: "Youssef".to_owned(),
        last_name: "Benali".to_owned(),
        email: DEMO_SELLER_EMAIL.to_owned(),
        password: password.to_owned(),
        role: UserRole::Seller,
        phone: Some("+212 600 000 000".to_owned()),
        address: Some(fes_address()),
    };

    let seller = match AuthService::new(&pool).register(registration).await {
        Ok(user) => user,
        Err(AuthError::UserAlreadyExists) => {
            tracing::info!("Demo seller {DEMO_SELLER_EMAIL} already exists, nothing to do");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let actor = Actor {
        id: seller.id,
        role: seller.role,
    };

    let shop = ShopService::new(&pool).create(actor, &demo_shop()).await?;
    tracing::info!(shop_id = %shop.id, slug = %shop.slug, "Created demo shop");

    let products = ProductService::new(&pool);
    let catalog = sample_products();
    let count = catalog.len();
    for product in &catalog {
        let created = products.create(actor, product).await?;
        tracing::info!(product_id = %created.id, name = %created.name, "Created product");
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Seller: {DEMO_SELLER_EMAIL}");
    tracing::info!("  Products: {count}");
    Ok(())
}

fn fes_address() -> Address {
    Address {
        street: Some("12 Derb Sidi Ahmed".to_owned()),
        city: Some("Fes".to_owned()),
        postal_code: Some("30000".to_owned()),
        ..Address::default()
    }
}

fn demo_shop() -> NewShop {
    NewShop {
        name: "Atelier Fassi".to_owned(),
        description: "Hand-thrown pottery and woven textiles from the Fes medina.".to_owned(),
        logo: None,
        banner: None,
        contact: ShopContact {
            email: Some(DEMO_SELLER_EMAIL.to_owned()),
            phone: "+212 600 000 000".to_owned(),
            website: None,
        },
        address: fes_address(),
        social_media: SocialMedia::default(),
        business_info: BusinessInfo {
            founded_year: Some(2015),
            ..BusinessInfo::default()
        },
        categories: vec![Category::Pottery, Category::Textiles],
        settings: ShopSettings::default(),
    }
}

fn product(
    name: &str,
    description: &str,
    cents: u32,
    category: Category,
    stock: i32,
    materials: &[&str],
) -> NewProduct {
    NewProduct {
        name: name.to_owned(),
        description: description.to_owned(),
        price: Money::from_cents(cents),
        category,
        images: vec![ProductImage {
            url: format!("https://images.artisania.test/{}.jpg", name.to_lowercase().replace(' ', "-")),
            alt: name.to_owned(),
        }],
        stock,
        specifications: Specifications {
            materials: materials.iter().map(|m| (*m).to_owned()).collect(),
            ..Specifications::default()
        },
        is_featured: false,
    }
}

fn sample_products() -> Vec<NewProduct> {
    vec![
        product(
            "Blue Tagine",
            "Glazed clay tagine painted in Fes blue",
            45_000,
            Category::Pottery,
            12,
            &["clay"],
        ),
        product(
            "Zellige Bowl",
            "Serving bowl with a hand-cut zellige pattern",
            18_000,
            Category::Ceramics,
            30,
            &["clay", "glaze"],
        ),
        product(
            "Berber Rug",
            "Wool rug woven on a vertical loom",
            250_000,
            Category::Textiles,
            3,
            &["wool"],
        ),
        product(
            "Silver Khamsa Pendant",
            "Engraved silver hand pendant",
            32_000,
            Category::Jewelry,
            0,
            &["silver"],
        ),
    ]
}
