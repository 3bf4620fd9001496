use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{Product, ProductDetails};

/// Sea-ORM Entity for the products table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub barcode: Option<String>,
    pub active: bool,
    pub on_sale: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            category: model.category,
            description: model.description,
            price: model.price,
            stock_quantity: model.stock_quantity,
            barcode: model.barcode,
            active: model.active,
            on_sale: model.on_sale,
        }
    }
}

// The id is left to the identity column
impl From<ProductDetails> for ActiveModel {
    fn from(details: ProductDetails) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(details.name),
            category: Set(details.category),
            description: Set(details.description),
            price: Set(details.price),
            stock_quantity: Set(details.stock_quantity),
            barcode: Set(details.barcode),
            active: Set(details.active),
            on_sale: Set(details.on_sale),
        }
    }
}

impl From<Product> for ActiveModel {
    fn from(product: Product) -> Self {
        ActiveModel {
            id: Set(product.id),
            name: Set(product.name),
            category: Set(product.category),
            description: Set(product.description),
            price: Set(product.price),
            stock_quantity: Set(product.stock_quantity),
            barcode: Set(product.barcode),
            active: Set(product.active),
            on_sale: Set(product.on_sale),
        }
    }
}
