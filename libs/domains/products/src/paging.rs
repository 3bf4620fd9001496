//! Page requests, sort specifications and result pages for product listings.

use serde::Serialize;
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::{ProductError, ProductResult};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sortable product fields. Accepts camelCase and snake_case in any letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SortProperty {
    #[strum(to_string = "id")]
    Id,
    #[strum(to_string = "name")]
    Name,
    #[strum(to_string = "category")]
    Category,
    #[strum(to_string = "description")]
    Description,
    #[strum(to_string = "price")]
    Price,
    #[strum(to_string = "stockQuantity", serialize = "stock_quantity")]
    StockQuantity,
    #[strum(to_string = "barcode")]
    Barcode,
    #[strum(to_string = "active")]
    Active,
    #[strum(to_string = "onSale", serialize = "on_sale")]
    OnSale,
}

impl SortProperty {
    /// Text columns compared without regard to case in listings
    pub fn is_case_insensitive_text(self) -> bool {
        matches!(self, SortProperty::Name | SortProperty::Category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub property: SortProperty,
    pub direction: SortDirection,
    pub ignore_case: bool,
}

impl SortOrder {
    pub fn asc(property: SortProperty) -> Self {
        Self::new(property, SortDirection::Asc)
    }

    pub fn desc(property: SortProperty) -> Self {
        Self::new(property, SortDirection::Desc)
    }

    pub fn new(property: SortProperty, direction: SortDirection) -> Self {
        Self {
            property,
            direction,
            ignore_case: false,
        }
    }
}

/// Ordered list of sort keys, first key most significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort(Vec<SortOrder>);

impl Sort {
    pub fn by(orders: Vec<SortOrder>) -> Self {
        Self(orders)
    }

    /// Parses `sort` query values of the form `property[,property...][,asc|desc]`.
    ///
    /// The trailing direction applies to every property in the same value and
    /// defaults to ascending. Empty input yields the default `name,asc`; a value
    /// holding only a direction (`desc`) is an error.
    pub fn parse<S: AsRef<str>>(params: &[S]) -> ProductResult<Self> {
        let mut orders = Vec::new();

        for param in params {
            let parts: Vec<&str> = param
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect();

            let Some((last, rest)) = parts.split_last() else {
                continue;
            };

            // A lone direction names no property and is rejected like any unknown one
            let (properties, direction) = match last.parse::<SortDirection>() {
                Ok(direction) if !rest.is_empty() => (rest, direction),
                _ => (parts.as_slice(), SortDirection::Asc),
            };

            for property in properties {
                let property = property.parse::<SortProperty>().map_err(|_| {
                    ProductError::Validation(format!(
                        "No property '{}' found for sorting",
                        property
                    ))
                })?;
                orders.push(SortOrder::new(property, direction));
            }
        }

        if orders.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(orders))
    }

    /// Same keys in the same order, with `name` and `category` flagged to
    /// compare case-insensitively.
    pub fn case_insensitive(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|order| SortOrder {
                    ignore_case: order.ignore_case || order.property.is_case_insensitive_text(),
                    ..*order
                })
                .collect(),
        )
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.0
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self(vec![SortOrder::asc(SortProperty::Name)])
    }
}

/// Zero-based page index, bounded page size and sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl PageRequest {
    /// Negative pages become 0; a missing or non-positive size falls back to
    /// the default and oversized requests are capped.
    ///
    /// The page index is bounded so that `page * size` fits a signed 64-bit
    /// SQL `OFFSET`.
    pub fn new(page: Option<i64>, size: Option<i64>, sort: Sort) -> Self {
        let size = match size {
            Some(s) if s >= 1 => (s as u64).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        let max_page = i64::MAX as u64 / size;
        let page = page.map_or(0, |p| (p.max(0) as u64).min(max_page));
        Self { page, size, sort }
    }

    pub fn with_sort(self, sort: Sort) -> Self {
        Self { sort, ..self }
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, Sort::default())
    }
}

/// One page of results plus the totals of the whole result set
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub size: u64,
    /// Zero-based page index
    pub number: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        Self {
            content,
            total_elements,
            total_pages: total_elements.div_ceil(request.size.max(1)),
            size: request.size,
            number: request.page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            size: self.size,
            number: self.number,
        }
    }
}
