mod common;

use retail_inventory_rs::error::LedgerError;
use retail_inventory_rs::models::NewSale;
use retail_inventory_rs::services::{sale_recorder, stock_reconciler};
use serial_test::serial;

use common::{day, money};

#[tokio::test]
#[serial]
async fn test_sale_total_uses_price_at_sale_time() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    let storage_id = common::insert_storage(&pool, "Main warehouse").await;
    common::set_open_price(&pool, variant_id, money(250), day(2024, 1, 1)).await;

    let receipt = sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id,
            quantity: 5,
            sold_at: Some(day(2024, 6, 1)),
        },
    )
    .await
    .expect("record sale");

    assert_eq!(receipt.unit_price, money(250));
    assert_eq!(receipt.total_price, money(1250));
    assert_eq!(receipt.sold_at, day(2024, 6, 1));

    let stored = sale_recorder::find_sale(&pool, receipt.sale_id).await.unwrap();
    assert_eq!(stored.total_price, money(1250));
    assert_eq!(stored.quantity, 5);
    assert_eq!(stored.product_name, "Milk");

    common::teardown_pool(pool).await;
}

#[tokio::test]
#[serial]
async fn test_sale_without_price_is_not_found() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    let storage_id = common::insert_storage(&pool, "Main warehouse").await;

    let err = sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id,
            quantity: 1,
            sold_at: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, LedgerError::NotFound(_)), "got {:?}", err);
    assert!(err.to_string().contains("no price for variant"));
    assert_eq!(common::count_rows(&pool, "sales").await, 0);

    common::teardown_pool(pool).await;
}

#[tokio::test]
#[serial]
async fn test_sale_before_first_price_is_not_found() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    let storage_id = common::insert_storage(&pool, "Main warehouse").await;
    common::set_open_price(&pool, variant_id, money(250), day(2024, 1, 1)).await;

    let err = sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id,
            quantity: 1,
            sold_at: Some(day(2023, 12, 31)),
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());

    common::teardown_pool(pool).await;
}

#[tokio::test]
#[serial]
async fn test_recorded_sale_keeps_its_price_snapshot() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    let storage_id = common::insert_storage(&pool, "Main warehouse").await;
    common::set_open_price(&pool, variant_id, money(250), day(2024, 1, 1)).await;

    let receipt = sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id,
            quantity: 2,
            sold_at: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(receipt.total_price, money(500));

    common::set_open_price(&pool, variant_id, money(400), day(2024, 3, 1)).await;

    let stored = sale_recorder::find_sale(&pool, receipt.sale_id).await.unwrap();
    assert_eq!(stored.unit_price, money(250));
    assert_eq!(stored.total_price, money(500));

    common::teardown_pool(pool).await;
}

#[tokio::test]
#[serial]
async fn test_sale_does_not_touch_stock() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    let storage_id = common::insert_storage(&pool, "Main warehouse").await;
    common::set_open_price(&pool, variant_id, money(250), day(2024, 1, 1)).await;
    let line_id = common::put_stock(&pool, variant_id, storage_id, 50, day(2024, 1, 2)).await;

    sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id,
            quantity: 5,
            sold_at: Some(day(2024, 6, 1)),
        },
    )
    .await
    .unwrap();

    let line = stock_reconciler::find_stock_line(&pool, line_id).await.unwrap();
    assert_eq!(line.quantity, 50);

    common::teardown_pool(pool).await;
}

#[tokio::test]
#[serial]
async fn test_sale_to_unknown_storage_writes_nothing() {
    let pool = common::setup_pool().await;

    let (_, variant_id) = common::add_milk(&pool).await;
    common::set_open_price(&pool, variant_id, money(250), day(2024, 1, 1)).await;

    let err = sale_recorder::record_sale(
        &pool,
        &NewSale {
            variant_id,
            storage_id: 424_242,
            quantity: 1,
            sold_at: None,
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(common::count_rows(&pool, "sales").await, 0);

    common::teardown_pool(pool).await;
}
