use serde::{Deserialize, Serialize};

/// Products are grouped under exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    /// Unique across the catalog
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// A storefront item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    /// Unique across the catalog
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
    pub category_id: i64,
}

/// Writable fields of a [`Product`], shared by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub quantity: i32,
    pub price: f64,
    pub category_id: i64,
}

impl ProductInput {
    pub fn into_product(self, id: i64) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            price: self.price,
            category_id: self.category_id,
        }
    }
}
