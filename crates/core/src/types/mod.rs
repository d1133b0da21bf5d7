//! Core types for Artisania.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod category;
pub mod email;
pub mod id;
pub mod money;
pub mod order_number;
pub mod phone;
pub mod status;
pub mod text;

pub use address::{Address, Coordinates, ShippingAddress};
pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{LineAmount, Money, MoneyError, PricingBreakdown, PricingPolicy};
pub use order_number::{OrderNumber, OrderNumberError};
pub use phone::{Phone, PhoneError};
pub use status::*;
pub use text::{derive_tags, slugify};
