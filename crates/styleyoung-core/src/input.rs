//! # Input Types
//!
//! Payloads accepted by the create/update operations, each with a
//! `validate()` that runs the field rules before anything touches the
//! database.

use serde::{Deserialize, Serialize};

use crate::types::SizeLabel;
use crate::validation::{
    validate_address, validate_category_name, validate_display_order, validate_email,
    validate_password, validate_phone, validate_price_cents, validate_product_name,
    validate_required_text, validate_stock, validate_username, ValidationResult,
};

/// Create or update a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_category_name(&self.name)
    }
}

/// Create or update a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInput {
    pub category_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_cents: i64,
    pub brand: String,
    pub color: String,
    pub material: String,
}

impl ProductInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_price_cents(self.price_cents)?;
        validate_required_text("category_id", &self.category_id, 64)?;
        validate_required_text("brand", &self.brand, 100)?;
        validate_required_text("color", &self.color, 50)?;
        validate_required_text("material", &self.material, 100)?;
        Ok(())
    }
}

/// Create a size variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeInput {
    pub label: SizeLabel,
    #[serde(default)]
    pub stock: i64,
}

impl SizeInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_stock(self.stock)
    }
}

/// Attach an image to a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInput {
    /// Storage path or URL of an already-stored file.
    pub file_ref: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub display_order: i64,
}

impl ImageInput {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required_text("file_ref", &self.file_ref, 500)?;
        validate_display_order(self.display_order)
    }
}

/// Customer sign-up form.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub address: String,
    pub phone: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Registration {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_required_text("full_name", &self.full_name, 150)?;
        validate_address(&self.address)?;
        validate_phone(&self.phone)?;
        validate_password(&self.password, &self.password_confirmation)?;
        Ok(())
    }

    /// Emails are compared case-insensitively, so they are stored lowercased.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}
