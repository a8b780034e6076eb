//! Tests for the item handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{api_app, list_item, sign_up};
use crate::test_support::memory_state;

#[actix_web::test]
async fn created_item_snapshots_the_owner() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let (ada, cookie) = sign_up(&app, "Ada", "ada@example.org").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/items")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": "Kettle",
                "description": "Barely used",
                "category": "kitchen",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let item: Value = actix_test::read_body_json(res).await;
    assert_eq!(item["ownerId"], ada.as_str());
    assert_eq!(item["ownerName"], "Ada");
    assert_eq!(item["ownerLocation"], "Leeds");
    assert_eq!(item["location"], "Leeds");

    // Later profile edits do not follow into the snapshot.
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/users/me")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Countess" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let id = item["id"].as_str().expect("item id");
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/items/{id}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    let fetched: Value = actix_test::read_body_json(res).await;
    assert_eq!(fetched["ownerName"], "Ada");
}

#[rstest]
#[case(json!({"description": "d", "category": "c"}), "name", "missing_field")]
#[case(json!({"name": "n", "category": "c"}), "description", "missing_field")]
#[case(json!({"name": "n", "description": "d", "category": "x".repeat(51)}), "category", "too_long")]
#[case(json!({"name": "n", "description": "d", "category": "c", "location": ""}), "location", "missing_field")]
#[actix_web::test]
async fn create_rejects_invalid_fields(
    #[case] body: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let (_, cookie) = sign_up(&app, "Ada", "ada@example.org").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/items")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(res).await;
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[rstest]
#[case::list("/api/v1/items")]
#[case::single("/api/v1/items/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
#[actix_web::test]
async fn reads_require_login(#[case] uri: &str) {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let res =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn listings_are_newest_first_and_filter_by_owner() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let (ada, ada_cookie) = sign_up(&app, "Ada", "ada@example.org").await;
    let (_, bob_cookie) = sign_up(&app, "Bob", "bob@example.org").await;
    let kettle = list_item(&app, &ada_cookie, "Kettle").await;
    let bike = list_item(&app, &bob_cookie, "Bike").await;
    let lamp = list_item(&app, &ada_cookie, "Lamp").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/items")
            .cookie(bob_cookie.clone())
            .to_request(),
    )
    .await;
    let all: Vec<Value> = actix_test::read_body_json(res).await;
    let ids: Vec<&str> = all.iter().filter_map(|i| i["id"].as_str()).collect();
    assert_eq!(ids, vec![lamp.as_str(), bike.as_str(), kettle.as_str()]);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/users/{ada}/items"))
            .cookie(bob_cookie)
            .to_request(),
    )
    .await;
    let mine: Vec<Value> = actix_test::read_body_json(res).await;
    let ids: Vec<&str> = mine.iter().filter_map(|i| i["id"].as_str()).collect();
    assert_eq!(ids, vec![lamp.as_str(), kettle.as_str()]);
}

#[actix_web::test]
async fn only_the_owner_may_edit_or_delete() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let (_, ada_cookie) = sign_up(&app, "Ada", "ada@example.org").await;
    let (_, bob_cookie) = sign_up(&app, "Bob", "bob@example.org").await;
    let kettle = list_item(&app, &ada_cookie, "Kettle").await;
    let uri = format!("/api/v1/items/{kettle}");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(bob_cookie.clone())
            .set_json(json!({ "name": "Stolen" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "forbidden");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .cookie(bob_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri(&uri)
            .cookie(ada_cookie.clone())
            .set_json(json!({ "category": "appliances" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["category"], "appliances");
    assert_eq!(body["name"], "Kettle");

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&uri)
            .cookie(ada_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(&uri)
            .cookie(ada_cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn malformed_item_id_is_a_bad_request() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let (_, cookie) = sign_up(&app, "Ada", "ada@example.org").await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/items/not-a-uuid")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}
