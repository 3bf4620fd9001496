use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select,
};

use crate::{
    entity,
    error::{ProductError, ProductResult},
    models::{Product, ProductDetails, ProductFilter},
    paging::{PageRequest, SortDirection, SortProperty},
    repository::ProductRepository,
};

/// Shares the application's pool; cloning the repository is cheap.
#[derive(Clone)]
pub struct PgProductRepository {
    db: Arc<DatabaseConnection>,
}

impl PgProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

const LIKE_ESCAPE: char = '\\';

/// Escapes LIKE wildcards so the fragment matches literally.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

fn column_for(property: SortProperty) -> entity::Column {
    match property {
        SortProperty::Id => entity::Column::Id,
        SortProperty::Name => entity::Column::Name,
        SortProperty::Category => entity::Column::Category,
        SortProperty::Description => entity::Column::Description,
        SortProperty::Price => entity::Column::Price,
        SortProperty::StockQuantity => entity::Column::StockQuantity,
        SortProperty::Barcode => entity::Column::Barcode,
        SortProperty::Active => entity::Column::Active,
        SortProperty::OnSale => entity::Column::OnSale,
    }
}

fn lower(column: entity::Column) -> SimpleExpr {
    SimpleExpr::FunctionCall(Func::lower(Expr::col(column)))
}

fn apply_filter(mut query: Select<entity::Entity>, filter: &ProductFilter) -> Select<entity::Entity> {
    if let Some(name) = &filter.name {
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        query = query.filter(
            Expr::expr(lower(entity::Column::Name))
                .like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)),
        );
    }

    if let Some(category) = &filter.category {
        query = query.filter(entity::Column::Category.eq(category.as_str()));
    }

    query
}

fn apply_sort(mut query: Select<entity::Entity>, page: &PageRequest) -> Select<entity::Entity> {
    let mut sorted_by_id = false;

    for order in page.sort.orders() {
        let column = column_for(order.property);
        let direction = match order.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };

        query = if order.ignore_case {
            query.order_by(lower(column), direction)
        } else {
            query.order_by(column, direction)
        };
        sorted_by_id |= order.property == SortProperty::Id;
    }

    // Stable pages across equal sort keys
    if !sorted_by_id {
        query = query.order_by_asc(entity::Column::Id);
    }

    query
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, details: ProductDetails) -> ProductResult<Product> {
        let active_model: entity::ActiveModel = details.into();
        let model = active_model.insert(self.conn()).await?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id).one(self.conn()).await?;
        Ok(model.map(Into::into))
    }

    async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> ProductResult<(Vec<Product>, u64)> {
        let query = apply_filter(entity::Entity::find(), filter);
        let query = apply_sort(query, page);

        let paginator = query.paginate(self.conn(), page.size);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page).await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn update(&self, product: Product) -> ProductResult<Product> {
        let id = product.id;
        let active_model: entity::ActiveModel = product.into();

        let model = active_model.update(self.conn()).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => ProductError::NotFound(id),
            other => other.into(),
        })?;

        tracing::info!(product_id = id, "Updated product");
        Ok(model.into())
    }

    async fn delete(&self, id: i64) -> ProductResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(self.conn()).await?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn sum_active_stock_value(&self) -> ProductResult<Option<Decimal>> {
        let stock_value = Expr::col(entity::Column::Price).mul(Expr::col(entity::Column::StockQuantity));

        let total = entity::Entity::find()
            .select_only()
            .column_as(SimpleExpr::FunctionCall(Func::sum(stock_value)), "total")
            .filter(entity::Column::Active.eq(true))
            .into_tuple::<Option<Decimal>>()
            .one(self.conn())
            .await?;

        Ok(total.flatten())
    }
}
