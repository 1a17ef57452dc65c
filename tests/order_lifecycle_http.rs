//! Order lifecycle through the REST surface: placement occupies the table,
//! confirmation deducts recipe stock, the last finished order frees the
//! table, and a closed day locks order changes.

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;

use common::{decimal, id, TestApp};
use comanda::domain::foundation::Role;

#[tokio::test]
async fn order_for_table_three_occupies_it_and_totals_its_lines() {
    let t = TestApp::new();
    let table = t.create_table(3).await;
    assert_eq!(table["status"], "AVAILABLE");
    let steak = t.create_product("Steak", "18.50").await;
    let wine = t.create_product("Wine", "6.25").await;

    let (status, body) = t.place_order(&table, &[(&steak, 2), (&wine, 3)]).await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let order = &body["data"];
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["table_number"], 3);
    assert_eq!(decimal(&order["total"]), "55.75".parse::<Decimal>().unwrap());
    assert_eq!(t.table(&table).await["status"], "OCCUPIED");
}

#[tokio::test]
async fn confirmation_deducts_recipe_stock_and_delivery_frees_the_table() {
    let t = TestApp::new();
    let table = t.create_table(5).await;
    let salad = t.create_product("Salad", "9").await;
    let tomato = t.create_ingredient("Tomato", "20", "2").await;
    let lettuce = t.create_ingredient("Lettuce", "8", "1").await;
    t.set_recipe(&salad, &[(&tomato, "2"), (&lettuce, "1")]).await;

    let (_, placed) = t.place_order(&table, &[(&salad, 3)]).await;
    let order = placed["data"].clone();

    let (status, confirmed) = t.move_order(&order, Role::Kitchen, "CONFIRMED").await;
    assert_eq!(status, StatusCode::OK, "{}", confirmed);
    assert_eq!(confirmed["data"]["order"]["status"], "CONFIRMED");
    assert_eq!(confirmed["data"]["movements"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&t.ingredient(&tomato).await["current_stock"]), Decimal::from(14));
    assert_eq!(decimal(&t.ingredient(&lettuce).await["current_stock"]), Decimal::from(5));

    for (role, next) in [(Role::Kitchen, "PREPARING"), (Role::Kitchen, "READY")] {
        let (status, body) = t.move_order(&order, role, next).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["data"]["tableReleased"], false);
    }
    assert_eq!(t.table(&table).await["status"], "OCCUPIED");

    let (status, delivered) = t.move_order(&order, Role::Waiter, "DELIVERED").await;
    assert_eq!(status, StatusCode::OK, "{}", delivered);
    assert_eq!(delivered["data"]["tableReleased"], true);
    assert_eq!(t.table(&table).await["status"], "AVAILABLE");
}

#[tokio::test]
async fn table_stays_occupied_while_another_order_is_active() {
    let t = TestApp::new();
    let table = t.create_table(8).await;
    let soup = t.create_product("Soup", "5").await;

    let (_, first) = t.place_order(&table, &[(&soup, 1)]).await;
    let (_, second) = t.place_order(&table, &[(&soup, 1)]).await;

    let (_, cancelled) = t
        .move_order(&first["data"], Role::Waiter, "CANCELLED")
        .await;
    assert_eq!(cancelled["data"]["tableReleased"], false);
    assert_eq!(t.table(&table).await["status"], "OCCUPIED");

    let (_, cancelled) = t
        .move_order(&second["data"], Role::Manager, "CANCELLED")
        .await;
    assert_eq!(cancelled["data"]["tableReleased"], true);
    assert_eq!(t.table(&table).await["status"], "AVAILABLE");
}

#[tokio::test]
async fn short_stock_rejects_confirmation_without_touching_anything() {
    let t = TestApp::new();
    let table = t.create_table(2).await;
    let salad = t.create_product("Salad", "9").await;
    let tomato = t.create_ingredient("Tomato", "10", "2").await;
    let basil = t.create_ingredient("Basil", "1", "0").await;
    t.set_recipe(&salad, &[(&tomato, "2"), (&basil, "1")]).await;

    let (_, placed) = t.place_order(&table, &[(&salad, 2)]).await;
    let (status, body) = t
        .move_order(&placed["data"], Role::Kitchen, "CONFIRMED")
        .await;

    assert_eq!(status, StatusCode::CONFLICT, "{}", body);
    assert_eq!(body["error"], "INSUFFICIENT_STOCK");
    assert_eq!(decimal(&t.ingredient(&tomato).await["current_stock"]), Decimal::from(10));
    assert_eq!(decimal(&t.ingredient(&basil).await["current_stock"]), Decimal::ONE);

    let (_, fetched) = t
        .get(&format!("/api/orders/{}", id(&placed["data"])), Role::Waiter)
        .await;
    assert_eq!(fetched["data"]["status"], "PENDING");
}

#[tokio::test]
async fn cancelling_after_preparation_started_is_rejected() {
    let t = TestApp::new();
    let table = t.create_table(4).await;
    let soup = t.create_product("Soup", "5").await;
    let (_, placed) = t.place_order(&table, &[(&soup, 1)]).await;
    let order = placed["data"].clone();

    t.move_order(&order, Role::Kitchen, "CONFIRMED").await;
    t.move_order(&order, Role::Kitchen, "PREPARING").await;
    let (_, body) = t.move_order(&order, Role::Manager, "CANCELLED").await;

    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn payment_is_recorded_once_after_delivery() {
    let t = TestApp::new();
    let table = t.create_table(6).await;
    let coffee = t.create_product("Coffee", "2.50").await;
    let (_, placed) = t.place_order(&table, &[(&coffee, 2)]).await;
    let order = placed["data"].clone();
    let uri = format!("/api/orders/{}/payment", id(&order));

    let (_, early) = t.post(&uri, Role::Cashier, json!({ "method": "CASH" })).await;
    assert_eq!(early["success"], false);

    for (role, next) in [
        (Role::Waiter, "CONFIRMED"),
        (Role::Kitchen, "PREPARING"),
        (Role::Kitchen, "READY"),
        (Role::Waiter, "DELIVERED"),
    ] {
        let (status, body) = t.move_order(&order, role, next).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (status, paid) = t.post(&uri, Role::Cashier, json!({ "method": "CARD" })).await;
    assert_eq!(status, StatusCode::OK, "{}", paid);
    let (_, again) = t.post(&uri, Role::Cashier, json!({ "method": "CASH" })).await;
    assert_eq!(again["error"], "ALREADY_PAID");
}

#[tokio::test]
async fn closed_day_locks_orders_until_reopened() {
    let t = TestApp::new();
    let table = t.create_table(1).await;
    let soup = t.create_product("Soup", "5").await;

    let (status, closed) = t.post("/api/daily-close", Role::Manager, json!({})).await;
    assert_eq!(status, StatusCode::CREATED, "{}", closed);

    let (status, locked) = t.place_order(&table, &[(&soup, 1)]).await;
    assert_eq!(status, StatusCode::LOCKED, "{}", locked);
    assert_eq!(locked["error"], "DAILY_CLOSE_LOCKED");

    let (_, state) = t.get("/api/daily-close/status", Role::Waiter).await;
    assert_eq!(state["success"], true);

    let reopen = format!("/api/daily-close/{}/reopen", id(&closed["data"]));
    let (status, _) = t.post(&reopen, Role::Manager, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, reopened) = t.post(&reopen, Role::Admin, json!({})).await;
    assert_eq!(status, StatusCode::OK, "{}", reopened);

    let (status, body) = t.place_order(&table, &[(&soup, 1)]).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn day_cannot_close_with_active_orders() {
    let t = TestApp::new();
    let table = t.create_table(9).await;
    let soup = t.create_product("Soup", "5").await;
    t.place_order(&table, &[(&soup, 1)]).await;

    let (status, body) = t.post("/api/daily-close", Role::Admin, json!({})).await;

    assert_eq!(body["success"], false, "{}", body);
    assert!(status.is_client_error());
}

#[tokio::test]
async fn missing_or_bad_tokens_are_rejected() {
    let t = TestApp::new();

    let (status, _) = t.call(Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .call(Method::GET, "/api/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = t.call(Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn kitchen_cannot_take_orders() {
    let t = TestApp::new();
    let table = t.create_table(7).await;
    let soup = t.create_product("Soup", "5").await;

    let (status, body) = t
        .post(
            "/api/orders",
            Role::Kitchen,
            json!({
                "tableId": table["id"],
                "items": [{ "productId": soup["id"], "quantity": 1 }],
            }),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
}

#[tokio::test]
async fn amounts_the_columns_cannot_hold_are_bad_requests() {
    let t = TestApp::new();
    let (_, category) = t
        .post("/api/categories", Role::Manager, json!({ "name": "Mains" }))
        .await;

    for price in ["18.505", "100000000"] {
        let (status, body) = t
            .post(
                "/api/products",
                Role::Manager,
                json!({ "categoryId": category["data"]["id"], "name": "Steak", "price": price }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }

    let flour = t.create_ingredient("Flour", "999999999", "1").await;
    for quantity in ["1000", "0.0001"] {
        let (status, body) = t
            .post(
                "/api/inventory/movements",
                Role::Manager,
                json!({ "ingredientId": flour["id"], "type": "IN", "quantity": quantity }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    }
    assert_eq!(
        decimal(&t.ingredient(&flour).await["current_stock"]),
        Decimal::from(999_999_999)
    );
}
