//! Integration tests for the Products domain
//!
//! `PgProductRepository` against a real PostgreSQL started with
//! testcontainers, so the SQL for filtering, ordering, paging and the
//! stock value aggregate runs against the migrated schema.
//!
//! Run with `cargo test -p domain_products -- --ignored` (requires Docker).

use domain_products::*;
use rust_decimal::{Decimal, dec};
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn details(name: &str, category: &str, price: Decimal, stock: i32, active: bool) -> ProductDetails {
    ProductDetails {
        name: name.to_string(),
        category: category.to_string(),
        description: None,
        price,
        stock_quantity: stock,
        barcode: None,
        active,
        on_sale: false,
    }
}

fn names(products: &[Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = ProductDetails {
        description: Some("Integration test product".to_string()),
        barcode: Some(builder.barcode()),
        on_sale: true,
        ..details(&builder.name("keyboard"), "Electronics", dec!(59.90), 7, true)
    };

    let created = repo.create(input.clone()).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.name, input.name);
    assert_eq!(created.price, dec!(59.90));

    let retrieved = assert_some(
        repo.get_by_id(created.id).await.unwrap(),
        "product should exist",
    );
    assert_eq!(retrieved, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_price_is_stored_with_two_decimals() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let created = repo
        .create(details("Pen", "Office", dec!(1.499), 1, true))
        .await
        .unwrap();

    assert_eq!(created.price, dec!(1.50));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_filters_and_case_insensitive_sort() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    let service = ProductService::new(PgProductRepository::new(db.connection()));

    for (name, category) in [
        ("iPhone", "Electronics"),
        ("Tablet", "Electronics"),
        ("banana", "Groceries"),
        ("Apple", "electronics"),
        ("50%_off sign", "Decor"),
    ] {
        repo.create(details(name, category, dec!(1), 1, true)).await.unwrap();
    }

    let (products, total) = repo
        .list(
            &ProductFilter::new(Some("PHO".to_string()), None),
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!((names(&products), total), (vec!["iPhone"], 1));

    let (products, total) = repo
        .list(
            &ProductFilter::new(None, Some("Electronics".to_string())),
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(products.iter().all(|p| p.category == "Electronics"));

    // Wildcards in the fragment match literally
    let (products, _) = repo
        .list(
            &ProductFilter::new(Some("%_".to_string()), None),
            &PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(names(&products), vec!["50%_off sign"]);

    let page = service
        .list_products(
            ProductFilter::default(),
            PageRequest::new(Some(0), Some(4), Sort::default()),
        )
        .await
        .unwrap();
    assert_eq!(
        names(&page.content),
        vec!["50%_off sign", "Apple", "banana", "iPhone"]
    );
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_name_descending_ignores_case() {
    let db = TestDatabase::new().await;
    let service = ProductService::new(PgProductRepository::new(db.connection()));

    for name in ["aZURE", "abacus", "banana"] {
        service
            .create_product(details(name, "Misc", dec!(1), 1, true))
            .await
            .unwrap();
    }

    let page = service
        .list_products(
            ProductFilter::default(),
            PageRequest::new(None, None, Sort::parse(&["name,desc"]).unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(names(&page.content), vec!["Banana", "AZURE", "Abacus"]);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_far_out_page_is_empty() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());
    repo.create(details("Lamp", "Home", dec!(5), 1, true)).await.unwrap();

    let (products, total) = repo
        .list(
            &ProductFilter::default(),
            &PageRequest::new(Some(i64::MAX), Some(10), Sort::default()),
        )
        .await
        .unwrap();
    assert!(products.is_empty());
    assert_eq!(total, 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_pages_are_stable_on_equal_keys() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    for i in 0..5 {
        repo.create(details(&format!("Same {}", "x".repeat(i + 1)), "Misc", dec!(3), 1, true))
            .await
            .unwrap();
    }

    let sort = Sort::parse(&["price,desc"]).unwrap();
    let mut seen = Vec::new();
    for page in 0..3 {
        let (products, _) = repo
            .list(
                &ProductFilter::default(),
                &PageRequest::new(Some(page), Some(2), sort.clone()),
            )
            .await
            .unwrap();
        seen.extend(products.into_iter().map(|p| p.id));
    }

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_replaces_all_fields() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let mut product = repo
        .create(ProductDetails {
            barcode: Some("123".to_string()),
            description: Some("Old".to_string()),
            ..details("Lamp", "Home", dec!(20), 10, true)
        })
        .await
        .unwrap();

    product.barcode = None;
    product.description = None;
    product.active = false;
    product.price = dec!(25.50);

    let updated = repo.update(product.clone()).await.unwrap();
    assert_eq!(updated, product);
    assert_eq!(repo.get_by_id(product.id).await.unwrap(), Some(product));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_and_delete_missing_rows() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    let ghost = Product::from_details(999, details("Ghost", "None", dec!(1), 1, true));
    assert!(matches!(
        repo.update(ghost).await,
        Err(ProductError::NotFound(999))
    ));
    assert!(!repo.delete(999).await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_sum_active_stock_value() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.connection());

    assert_eq!(repo.sum_active_stock_value().await.unwrap(), None);

    repo.create(details("A", "X", dec!(10), 5, true)).await.unwrap();
    repo.create(details("B", "X", dec!(20), 0, true)).await.unwrap();
    repo.create(details("C", "X", dec!(100), 1, false)).await.unwrap();

    assert_eq!(repo.sum_active_stock_value().await.unwrap(), Some(dec!(50)));

    db.truncate_products().await;
    repo.create(details("C", "X", dec!(100), 1, false)).await.unwrap();
    assert_eq!(repo.sum_active_stock_value().await.unwrap(), None);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_service_round_trip_capitalizes_and_deletes() {
    let db = TestDatabase::new().await;
    let service = ProductService::new(PgProductRepository::new(db.connection()));

    let created = service
        .create_product(details("monitor", "Electronics", dec!(149), 3, true))
        .await
        .unwrap();
    assert_eq!(created.name, "Monitor");

    service.delete_product(created.id).await.unwrap();
    assert!(matches!(
        service.get_product(created.id).await,
        Err(ProductError::NotFound(id)) if id == created.id
    ));
}
