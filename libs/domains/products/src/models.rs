use regex::Regex;
use rust_decimal::{Decimal, dec};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::LazyLock;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::ProductError;

/// Quantities below this are reported as `lowStock`
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Largest value a `NUMERIC(19,2)` price column holds
pub const MAX_PRICE: Decimal = dec!(99999999999999999.99);

/// ASCII letters plus the Latin-1 accented range
static LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-zA-ZÀ-ÿ]").unwrap());

static DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]*$").unwrap());

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(rule("not_blank", "Name is mandatory"));
    }
    if !LETTER.is_match(name) {
        return Err(rule("letter_required", "Name must contain at least one letter"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category.trim().is_empty() {
        return Err(rule("not_blank", "Category is mandatory"));
    }
    if !LETTER.is_match(category) {
        return Err(rule(
            "letter_required",
            "Category must contain at least one letter",
        ));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.is_empty() || LETTER.is_match(description) {
        Ok(())
    } else {
        Err(rule(
            "letter_required",
            "Description must contain at least one letter if provided",
        ))
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if !price.is_sign_positive() || price.is_zero() {
        return Err(rule("positive", "Price must be greater than zero"));
    }
    if price.round_dp(2) > MAX_PRICE {
        return Err(rule("max", "Price cannot exceed 99999999999999999.99"));
    }
    Ok(())
}

fn validate_barcode(barcode: &str) -> Result<(), ValidationError> {
    if DIGITS_ONLY.is_match(barcode) {
        Ok(())
    } else {
        Err(rule("digits_only", "Barcode must contain only numbers"))
    }
}

/// Capitalizes the first character, leaving the rest untouched.
///
/// `"phone"` becomes `"Phone"`, `"iPhone"` becomes `"IPhone"`, `""` stays empty.
pub fn capitalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A stored product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
    pub active: bool,
    pub on_sale: bool,
}

impl Product {
    pub fn from_details(id: i64, details: ProductDetails) -> Self {
        Self {
            id,
            name: details.name,
            category: details.category,
            description: details.description,
            price: details.price,
            stock_quantity: details.stock_quantity,
            barcode: details.barcode,
            active: details.active,
            on_sale: details.on_sale,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity < LOW_STOCK_THRESHOLD
    }
}

/// Request body for create and full-replacement update
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(
        required(message = "Name is mandatory"),
        custom(function = "validate_name")
    )]
    #[schema(example = "Wireless mouse")]
    pub name: Option<String>,

    #[validate(
        required(message = "Category is mandatory"),
        custom(function = "validate_category")
    )]
    #[schema(example = "Electronics")]
    pub category: Option<String>,

    #[validate(
        length(max = 255, message = "Description cannot exceed 255 characters"),
        custom(function = "validate_description")
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Price is mandatory"),
        custom(function = "validate_price")
    )]
    #[schema(example = 24.99)]
    pub price: Option<Decimal>,

    #[validate(
        required(message = "Stock quantity is mandatory"),
        range(min = 0, message = "Stock quantity cannot be negative")
    )]
    #[schema(example = 12)]
    pub stock_quantity: Option<i32>,

    #[validate(custom(function = "validate_barcode"))]
    #[schema(example = "4006381333931")]
    pub barcode: Option<String>,

    pub active: Option<bool>,
    pub on_sale: Option<bool>,
}

/// Validated field values for a product without its id.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
    pub active: bool,
    pub on_sale: bool,
}

/// Missing booleans become `false`; the required fields have already been
/// checked by `Validate`, so a `None` here only happens when that step was skipped.
impl TryFrom<ProductPayload> for ProductDetails {
    type Error = ProductError;

    fn try_from(payload: ProductPayload) -> Result<Self, Self::Error> {
        let missing = |message: &str| ProductError::Validation(message.to_string());

        Ok(Self {
            name: payload.name.ok_or_else(|| missing("Name is mandatory"))?,
            category: payload
                .category
                .ok_or_else(|| missing("Category is mandatory"))?,
            description: payload.description,
            price: payload.price.ok_or_else(|| missing("Price is mandatory"))?,
            stock_quantity: payload
                .stock_quantity
                .ok_or_else(|| missing("Stock quantity is mandatory"))?,
            barcode: payload.barcode,
            active: payload.active.unwrap_or(false),
            on_sale: payload.on_sale.unwrap_or(false),
        })
    }
}

/// Product as returned over HTTP
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[schema(example = 1)]
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(example = 24.99)]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
    pub active: bool,
    pub on_sale: bool,
    /// `stockQuantity < 5`
    pub low_stock: bool,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let low_stock = product.is_low_stock();
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            barcode: product.barcode,
            active: product.active,
            on_sale: product.on_sale,
            low_stock,
        }
    }
}

/// Optional listing predicates. Blank values are dropped on construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact, case-sensitive category
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn new(name: Option<String>, category: Option<String>) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Self {
            name: present(name),
            category: present(category),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.category.is_none()
    }
}

/// Query string of `GET /products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Case-insensitive substring of the product name
    pub name: Option<String>,
    /// Exact category
    pub category: Option<String>,
    /// Zero-based page index (default 0)
    pub page: Option<i64>,
    /// Page size (default 10, max 2000)
    pub size: Option<i64>,
    /// `property[,asc|desc]`, repeatable (default `name,asc`)
    #[serde(default)]
    pub sort: Vec<String>,
}

/// Sum of `price * stockQuantity` over active products
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalStockValue {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(example = 1499.5)]
    pub total_value: Decimal,
}
