use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{ProductError, ProductResult};
use crate::models::{Product, ProductDetails, ProductFilter, capitalize_name};
use crate::paging::{Page, PageRequest};
use crate::repository::ProductRepository;

/// Service layer for Product business logic
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a product with its name capitalized
    #[instrument(skip(self, details), fields(name = %details.name))]
    pub async fn create_product(&self, mut details: ProductDetails) -> ProductResult<Product> {
        details.name = capitalize_name(&details.name);
        self.repository.create(details).await
    }

    /// List products, sorting `name` and `category` case-insensitively
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        request: PageRequest,
    ) -> ProductResult<Page<Product>> {
        let sort = request.sort.case_insensitive();
        let request = request.with_sort(sort);

        let (content, total) = self.repository.list(&filter, &request).await?;
        Ok(Page::new(content, total, &request))
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Replace every mutable field of an existing product
    #[instrument(skip(self, details))]
    pub async fn update_product(&self, id: i64, details: ProductDetails) -> ProductResult<Product> {
        self.get_product(id).await?;

        let mut product = Product::from_details(id, details);
        product.name = capitalize_name(&product.name);
        self.repository.update(product).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> ProductResult<()> {
        self.get_product(id).await?;

        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound(id));
        }

        Ok(())
    }

    /// Sum of `price * stockQuantity` over active products; `None` if there are none
    #[instrument(skip(self))]
    pub async fn total_stock_value(&self) -> ProductResult<Option<Decimal>> {
        self.repository.sum_active_stock_value().await
    }
}
