use async_trait::async_trait;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductDetails, ProductFilter};
use crate::paging::{PageRequest, SortDirection, SortOrder, SortProperty};

/// Repository trait for Product persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product; the store assigns its id
    async fn create(&self, details: ProductDetails) -> ProductResult<Product>;

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>>;

    /// One page of products matching `filter`, plus the total match count.
    ///
    /// Absent predicates are skipped; an empty filter lists everything.
    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> ProductResult<(Vec<Product>, u64)>;

    /// Replace every field of an existing product. `NotFound` if the id is gone.
    async fn update(&self, product: Product) -> ProductResult<Product>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> ProductResult<bool>;

    /// `SUM(price * stock_quantity)` over active products, `None` when there are none
    async fn sum_active_stock_value(&self) -> ProductResult<Option<Decimal>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<BTreeMap<i64, Product>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self {
            products: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirrors the NUMERIC(19,2) column
fn to_currency(price: Decimal) -> Decimal {
    price.round_dp(2)
}

fn matches(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(name) = &filter.name {
        if !product.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if let Some(category) = &filter.category {
        if &product.category != category {
            return false;
        }
    }
    true
}

fn compare_text(a: &str, b: &str, ignore_case: bool) -> Ordering {
    if ignore_case {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

/// NULLs sort after values when ascending, like PostgreSQL
fn compare_nullable(a: Option<&str>, b: Option<&str>, ignore_case: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_text(a, b, ignore_case),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_by(a: &Product, b: &Product, order: &SortOrder) -> Ordering {
    let ic = order.ignore_case;
    let ordering = match order.property {
        SortProperty::Id => a.id.cmp(&b.id),
        SortProperty::Name => compare_text(&a.name, &b.name, ic),
        SortProperty::Category => compare_text(&a.category, &b.category, ic),
        SortProperty::Description => {
            compare_nullable(a.description.as_deref(), b.description.as_deref(), ic)
        }
        SortProperty::Price => a.price.cmp(&b.price),
        SortProperty::StockQuantity => a.stock_quantity.cmp(&b.stock_quantity),
        SortProperty::Barcode => compare_nullable(a.barcode.as_deref(), b.barcode.as_deref(), ic),
        SortProperty::Active => a.active.cmp(&b.active),
        SortProperty::OnSale => a.on_sale.cmp(&b.on_sale),
    };

    match order.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, mut details: ProductDetails) -> ProductResult<Product> {
        details.price = to_currency(details.price);
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        let product = Product::from_details(id, details);

        self.products.write().await.insert(id, product.clone());

        tracing::info!(product_id = id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| matches(p, filter))
            .cloned()
            .collect();

        result.sort_by(|a, b| {
            page.sort
                .orders()
                .iter()
                .map(|order| compare_by(a, b, order))
                .find(|ordering| ordering.is_ne())
                .unwrap_or_else(|| a.id.cmp(&b.id))
        });

        let total = result.len() as u64;
        let content = result
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.size as usize)
            .collect();

        Ok((content, total))
    }

    async fn update(&self, mut product: Product) -> ProductResult<Product> {
        let mut products = self.products.write().await;

        let slot = products
            .get_mut(&product.id)
            .ok_or(ProductError::NotFound(product.id))?;
        product.price = to_currency(product.price);
        *slot = product.clone();

        tracing::info!(product_id = product.id, "Updated product");
        Ok(product)
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let mut products = self.products.write().await;

        if products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn sum_active_stock_value(&self) -> ProductResult<Option<Decimal>> {
        let products = self.products.read().await;

        products
            .values()
            .filter(|p| p.active)
            .try_fold(None, |total: Option<Decimal>, p| {
                let value = p
                    .price
                    .checked_mul(Decimal::from(p.stock_quantity))
                    .ok_or(ProductError::StockValueOverflow)?;
                match total {
                    None => Ok(Some(value)),
                    Some(total) => total
                        .checked_add(value)
                        .map(Some)
                        .ok_or(ProductError::StockValueOverflow),
                }
            })
    }
}
