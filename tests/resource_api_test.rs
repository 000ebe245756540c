//! Resource routes under /api/v1: access control, cascades and validation.

mod common;

use std::str::FromStr;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn create(app: &TestApp, token: &str, uri: &str, body: Value) -> Value {
    let response = app
        .request(Method::POST, uri, Some(body.clone()), Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri} {body}");
    response_json(response).await
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_string()
}

fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}

struct Catalog {
    category: String,
    product: String,
    variation: String,
}

async fn seed_catalog(app: &TestApp, token: &str) -> Catalog {
    let category = create(app, token, "/api/v1/categories", json!({ "name": "Coffee" })).await;
    let product = create(
        app,
        token,
        "/api/v1/products",
        json!({ "name": "Latte", "category_id": category["id"], "price": "4.50" }),
    )
    .await;
    let variation = create(
        app,
        token,
        "/api/v1/variations",
        json!({ "product_id": product["id"], "name": "Large", "price_money": "5.00" }),
    )
    .await;
    let response = app
        .request(
            Method::PATCH,
            &format!("/api/v1/products/{}", id_of(&product)),
            Some(json!({ "variation_id": variation["id"] })),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    Catalog {
        category: id_of(&category),
        product: id_of(&product),
        variation: id_of(&variation),
    }
}

#[tokio::test]
async fn resource_routes_require_a_token() {
    let app = TestApp::new().await;

    for uri in ["/api/v1/products", "/api/v1/orders", "/api/v1/discounts/active"] {
        let response = app.request(Method::GET, uri, None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn non_staff_can_read_but_not_write_the_catalog() {
    let app = TestApp::new().await;
    let cashier = app.cashier_token().await;

    let response = app
        .request(Method::GET, "/api/v1/categories", None, Some(&cashier))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::POST,
            "/api/v1/categories",
            Some(json!({ "name": "Tea" })),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn lists_are_paginated() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    for name in ["A", "B", "C"] {
        create(&app, &staff, "/api/v1/categories", json!({ "name": name })).await;
    }

    let response = app
        .request(
            Method::GET,
            "/api/v1/categories?page=2&per_page=2",
            None,
            Some(&staff),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["total_pages"], 2);
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/products/00000000-0000-0000-0000-000000000000",
            None,
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_removes_its_products_and_variations() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let catalog = seed_catalog(&app, &staff).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/categories/{}", catalog.category),
            None,
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for uri in [
        format!("/api/v1/products/{}", catalog.product),
        format!("/api/v1/variations/{}", catalog.variation),
    ] {
        let response = app.request(Method::GET, &uri, None, Some(&staff)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn new_product_cannot_take_another_products_variation_as_default() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let catalog = seed_catalog(&app, &staff).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Bagel", "variation_id": catalog.variation })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_variation_clears_the_default_and_its_sales() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let catalog = seed_catalog(&app, &staff).await;
    let order = create(&app, &staff, "/api/v1/orders", json!({})).await;
    let sold = create(
        &app,
        &staff,
        "/api/v1/items-sold",
        json!({
            "product_id": catalog.product,
            "order_id": order["id"],
            "variation_id": catalog.variation,
            "quantity": 2,
        }),
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/variations/{}", catalog.variation),
            None,
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let product = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/products/{}", catalog.product),
            None,
            Some(&staff),
        )
        .await,
    )
    .await;
    assert!(product["variation_id"].is_null());

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/items-sold/{}", id_of(&sold)),
            None,
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn negative_item_quantity_is_rejected() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let catalog = seed_catalog(&app, &staff).await;
    let order = create(&app, &staff, "/api/v1/orders", json!({})).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/items-sold",
            Some(json!({
                "product_id": catalog.product,
                "order_id": order["id"],
                "variation_id": catalog.variation,
                "quantity": -1,
            })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_detail_carries_totals_and_freezes_pricing_once_closed() {
    let app = TestApp::new().await;
    let cashier = app.cashier_token().await;

    let order = create(
        &app,
        &cashier,
        "/api/v1/orders",
        json!({
            "line_items": [
                { "name": "Latte", "quantity": 2, "base_price_money": "5.00" },
                { "name": "Bagel", "quantity": 1, "base_price_money": "10.00" }
            ],
            "taxes": [{ "name": "VAT", "percentage": "10", "applied_money": "2.00" }]
        }),
    )
    .await;
    assert_eq!(order["state"], "OPEN");
    assert_eq!(money(&order["totals"]["subtotal"]), dec!(20));
    assert_eq!(money(&order["totals"]["total"]), dec!(22));

    let uri = format!("/api/v1/orders/{}", id_of(&order));
    let response = app
        .request(
            Method::PATCH,
            &uri,
            Some(json!({ "state": "COMPLETED" })),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::PATCH,
            &uri,
            Some(json!({ "line_items": [] })),
            Some(&cashier),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_amounts_are_rejected_and_listing_keeps_working() {
    let app = TestApp::new().await;
    let cashier = app.cashier_token().await;

    for price in ["79228162514264337593543950335", "10000000000.00"] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/orders",
                Some(json!({
                    "line_items": [{ "name": "Gold", "quantity": 2, "base_price_money": price }]
                })),
                Some(&cashier),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{price}");
    }

    let order = create(
        &app,
        &cashier,
        "/api/v1/orders",
        json!({
            "line_items": [{ "name": "Gold", "quantity": 3, "base_price_money": "9999999999.99" }]
        }),
    )
    .await;
    assert_eq!(money(&order["totals"]["subtotal"]), dec!(29999999999.97));

    let response = app
        .request(Method::GET, "/api/v1/orders", None, Some(&cashier))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["pagination"]["total"], 1);
}

#[tokio::test]
async fn transactions_require_existing_order_and_location() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let order = create(&app, &staff, "/api/v1/orders", json!({})).await;

    let tender = json!({ "tender_type": "CARD", "card_brand": "VISA", "last_4": "4242" });
    let response = app
        .request(
            Method::POST,
            "/api/v1/transactions",
            Some(json!({
                "order_id": order["id"],
                "location_id": "00000000-0000-0000-0000-000000000000",
                "tender": tender,
                "amount_money": "12.50",
            })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let location = create(&app, &staff, "/api/v1/locations", json!({ "name": "Main St" })).await;
    let transaction = create(
        &app,
        &staff,
        "/api/v1/transactions",
        json!({
            "order_id": order["id"],
            "location_id": location["id"],
            "tender": tender,
            "amount_money": "12.50",
        }),
    )
    .await;
    assert_eq!(money(&transaction["tip_money"]), Decimal::ZERO);

    let listed = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/orders/{}/transactions", id_of(&order)),
            None,
            Some(&staff),
        )
        .await,
    )
    .await;
    assert_eq!(listed["pagination"]["total"], 1);
}

#[tokio::test]
async fn customers_need_an_identifying_field_and_can_be_searched() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(json!({ "note": "walk-in" })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    create(
        &app,
        &staff,
        "/api/v1/customers",
        json!({ "given_name": "Ada", "family_name": "Lovelace", "group_id": "vip" }),
    )
    .await;
    create(&app, &staff, "/api/v1/customers", json!({ "company_name": "Acme" })).await;

    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/customers?search=love",
            None,
            Some(&staff),
        )
        .await,
    )
    .await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["given_name"], "Ada");
}

#[tokio::test]
async fn employee_emails_are_unique() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    let employee = json!({ "first_name": "Sam", "last_name": "Lee", "email": "sam@example.com" });

    create(&app, &staff, "/api/v1/employees", employee.clone()).await;
    let response = app
        .request(Method::POST, "/api/v1/employees", Some(employee), Some(&staff))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn discount_terms_are_validated() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;

    let invalid = [
        json!({ "name": "Ten off", "discount_type": "FIXED_PERCENTAGE" }),
        json!({ "name": "Five off", "discount_type": "FIXED_AMOUNT", "amount_money": "5.00", "percentage": "10" }),
        json!({ "name": "Odd percent", "discount_type": "FIXED_PERCENTAGE", "percentage": "12.345" }),
        json!({ "name": "Huge", "discount_type": "FIXED_AMOUNT", "amount_money": "79228162514264337593543950335" }),
    ];
    for payload in invalid {
        let response = app
            .request(Method::POST, "/api/v1/discounts", Some(payload.clone()), Some(&staff))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
    }
}

#[tokio::test]
async fn active_discounts_respect_groups_and_price_the_subtotal() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;

    create(
        &app,
        &staff,
        "/api/v1/discounts",
        json!({ "name": "Ten percent", "discount_type": "FIXED_PERCENTAGE", "percentage": "10" }),
    )
    .await;
    create(
        &app,
        &staff,
        "/api/v1/discounts",
        json!({
            "name": "VIP five",
            "discount_type": "FIXED_AMOUNT",
            "amount_money": "5.00",
            "customer_group_ids": ["vip"]
        }),
    )
    .await;

    let walk_in = response_json(
        app.request(
            Method::GET,
            "/api/v1/discounts/active?subtotal=20.00",
            None,
            Some(&staff),
        )
        .await,
    )
    .await;
    let walk_in = walk_in.as_array().unwrap();
    assert_eq!(walk_in.len(), 1);
    assert_eq!(money(&walk_in[0]["amount_off"]), dec!(2));

    let vip = response_json(
        app.request(
            Method::GET,
            "/api/v1/discounts/active?group_id=vip",
            None,
            Some(&staff),
        )
        .await,
    )
    .await;
    assert_eq!(vip.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn active_discounts_reject_out_of_range_subtotals() {
    let app = TestApp::new().await;
    let staff = app.staff_token().await;
    create(
        &app,
        &staff,
        "/api/v1/discounts",
        json!({ "name": "Half off", "discount_type": "FIXED_PERCENTAGE", "percentage": "50" }),
    )
    .await;

    for subtotal in ["79228162514264337593543950335", "10000000000", "-1"] {
        let response = app
            .request(
                Method::GET,
                &format!("/api/v1/discounts/active?subtotal={subtotal}"),
                None,
                Some(&staff),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{subtotal}");
    }
}
