//! Craft categories shared by shops and products.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryError(String);

/// A craft category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "product_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ceramics,
    Textiles,
    Jewelry,
    Painting,
    Woodwork,
    Metalwork,
    Glasswork,
    Leatherwork,
    Pottery,
    Sculpture,
    Other,
}

impl Category {
    pub const ALL: [Self; 11] = [
        Self::Ceramics,
        Self::Textiles,
        Self::Jewelry,
        Self::Painting,
        Self::Woodwork,
        Self::Metalwork,
        Self::Glasswork,
        Self::Leatherwork,
        Self::Pottery,
        Self::Sculpture,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ceramics => "ceramics",
            Self::Textiles => "textiles",
            Self::Jewelry => "jewelry",
            Self::Painting => "painting",
            Self::Woodwork => "woodwork",
            Self::Metalwork => "metalwork",
            Self::Glasswork => "glasswork",
            Self::Leatherwork => "leatherwork",
            Self::Pottery => "pottery",
            Self::Sculpture => "sculpture",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CategoryError(s.to_owned()))
    }
}
