//! Tests for the swap handlers, covering the negotiation scenarios end to
//! end over the in-memory adapters.

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ErrorCode as DomainCode;
use crate::inbound::http::test_utils::{api_app, list_item, sign_up};
use crate::test_support::memory_state;

struct Market {
    alice: String,
    alice_cookie: Cookie<'static>,
    bob: String,
    bob_cookie: Cookie<'static>,
    carol_cookie: Cookie<'static>,
    /// Owned by Alice.
    x: String,
    /// Owned by Bob.
    y: String,
    /// Owned by Bob.
    z: String,
    /// Owned by Carol.
    w: String,
}

async fn market<S>(app: &S) -> Market
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (alice, alice_cookie) = sign_up(app, "Alice", "alice@example.org").await;
    let (bob, bob_cookie) = sign_up(app, "Bob", "bob@example.org").await;
    let (_, carol_cookie) = sign_up(app, "Carol", "carol@example.org").await;
    let x = list_item(app, &alice_cookie, "Kettle").await;
    let y = list_item(app, &bob_cookie, "Bike").await;
    let z = list_item(app, &bob_cookie, "Lamp").await;
    let w = list_item(app, &carol_cookie, "Drill").await;
    Market {
        alice,
        alice_cookie,
        bob,
        bob_cookie,
        carol_cookie,
        x,
        y,
        z,
        w,
    }
}

async fn propose<S>(app: &S, cookie: &Cookie<'static>, item1: &str, item2: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/swaps")
            .cookie(cookie.clone())
            .set_json(json!({ "item1": item1, "item2": item2 }))
            .to_request(),
    )
    .await
}

async fn resolve<S>(app: &S, cookie: &Cookie<'static>, swap: &str, body: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/swaps/{swap}"))
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await
}

async fn withdraw<S>(app: &S, cookie: &Cookie<'static>, swap: &str) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(
        app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/swaps/{swap}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await
}

async fn fetch_item<S>(app: &S, cookie: &Cookie<'static>, id: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = actix_test::call_service(
        app,
        actix_test::TestRequest::get()
            .uri(&format!("/api/v1/items/{id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    actix_test::read_body_json(res).await
}

async fn pending_swap<S>(app: &S, m: &Market) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = propose(app, &m.bob_cookie, &m.x, &m.y).await;
    assert_eq!(res.status(), StatusCode::OK);
    let swap: Value = actix_test::read_body_json(res).await;
    swap["id"].as_str().expect("swap id").to_owned()
}

async fn error_code(res: ServiceResponse) -> String {
    let body: Value = actix_test::read_body_json(res).await;
    body["code"].as_str().expect("error code").to_owned()
}

#[actix_web::test]
async fn proposal_records_current_owners() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;

    let res = propose(&app, &m.bob_cookie, &m.x, &m.y).await;
    assert_eq!(res.status(), StatusCode::OK);
    let swap: Value = actix_test::read_body_json(res).await;
    assert_eq!(swap["status"], "pending");
    assert_eq!(swap["item1"], m.x.as_str());
    assert_eq!(swap["item2"], m.y.as_str());
    assert_eq!(swap["item1User"], m.alice.as_str());
    assert_eq!(swap["item2User"], m.bob.as_str());
}

#[rstest]
#[case::wanted_item_reused("x", "z")]
#[case::offered_item_reused("w", "y")]
#[actix_web::test]
async fn overlapping_proposal_conflicts(#[case] item1: &str, #[case] item2: &str) {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    pending_swap(&app, &m).await;

    let pick = |name: &str| match name {
        "x" => m.x.clone(),
        "y" => m.y.clone(),
        "z" => m.z.clone(),
        _ => m.w.clone(),
    };
    let res = propose(&app, &m.bob_cookie, &pick(item1), &pick(item2)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "conflict");
}

#[actix_web::test]
async fn approval_trades_parties_and_items() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;

    let res = resolve(&app, &m.alice_cookie, &swap, json!({ "status": "approved" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["item1User"], m.bob.as_str());
    assert_eq!(body["item2User"], m.alice.as_str());

    let x = fetch_item(&app, &m.alice_cookie, &m.x).await;
    assert_eq!(x["ownerId"], m.bob.as_str());
    assert_eq!(x["ownerName"], "Bob");
    let y = fetch_item(&app, &m.alice_cookie, &m.y).await;
    assert_eq!(y["ownerId"], m.alice.as_str());
    assert_eq!(y["ownerName"], "Alice");
}

#[actix_web::test]
async fn rejection_leaves_items_alone_and_frees_them() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;

    let res = resolve(
        &app,
        &m.alice_cookie,
        &swap,
        json!({ "approved": false, "rejected": true }),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["item1User"], m.alice.as_str());

    let x = fetch_item(&app, &m.alice_cookie, &m.x).await;
    assert_eq!(x["ownerId"], m.alice.as_str());
    let res = propose(&app, &m.bob_cookie, &m.x, &m.z).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn withdrawal_frees_both_items() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;

    let res = withdraw(&app, &m.bob_cookie, &swap).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({ "msg": "swap removed" }));

    let res = propose(&app, &m.bob_cookie, &m.x, &m.y).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn closed_swap_cannot_be_withdrawn_or_resolved_again() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;
    let res = resolve(&app, &m.alice_cookie, &swap, json!({ "status": "approved" })).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = withdraw(&app, &m.bob_cookie, &swap).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(res).await, "invalid_state");

    // After approval Bob is item1User, but the swap is closed regardless.
    for cookie in [&m.alice_cookie, &m.bob_cookie] {
        let res = resolve(&app, cookie, &swap, json!({ "status": "rejected" })).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(res).await, "invalid_state");
    }
}

#[actix_web::test]
async fn only_the_parties_in_their_roles_may_act() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;

    // Proposer cannot decide; owner of item1 cannot withdraw; outsiders neither.
    for cookie in [&m.bob_cookie, &m.carol_cookie] {
        let res = resolve(&app, cookie, &swap, json!({ "status": "approved" })).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(res).await, "forbidden");
    }
    for cookie in [&m.alice_cookie, &m.carol_cookie] {
        let res = withdraw(&app, cookie, &swap).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(res).await, "forbidden");
    }
}

#[rstest]
#[case::not_owner_of_offer("x", "w", StatusCode::UNAUTHORIZED, "forbidden")]
#[case::already_own_wanted("y", "z", StatusCode::BAD_REQUEST, "invalid_request")]
#[case::same_item("y", "y", StatusCode::BAD_REQUEST, "invalid_request")]
#[actix_web::test]
async fn invalid_proposals_are_rejected(
    #[case] item1: &str,
    #[case] item2: &str,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let pick = |name: &str| match name {
        "x" => m.x.clone(),
        "y" => m.y.clone(),
        "z" => m.z.clone(),
        _ => m.w.clone(),
    };

    let res = propose(&app, &m.bob_cookie, &pick(item1), &pick(item2)).await;
    assert_eq!(res.status(), status);
    assert_eq!(error_code(res).await, code);
}

#[actix_web::test]
async fn unknown_records_are_not_found() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let missing = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    let res = propose(&app, &m.bob_cookie, missing, &m.y).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = resolve(&app, &m.alice_cookie, missing, json!({ "status": "approved" })).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = withdraw(&app, &m.bob_cookie, missing).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn listing_shows_swaps_for_either_party() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    let swap = pending_swap(&app, &m).await;

    for (cookie, expected) in [
        (&m.alice_cookie, 1),
        (&m.bob_cookie, 1),
        (&m.carol_cookie, 0),
    ] {
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/swaps")
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let swaps: Vec<Value> = actix_test::read_body_json(res).await;
        assert_eq!(swaps.len(), expected);
        if let Some(first) = swaps.first() {
            assert_eq!(first["id"], swap.as_str());
        }
    }
}

#[actix_web::test]
async fn pending_item_cannot_be_deleted() {
    let app = actix_test::init_service(api_app(memory_state())).await;
    let m = market(&app).await;
    pending_swap(&app, &m).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/items/{}", m.x))
            .cookie(m.alice_cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "conflict");
}

#[rstest]
#[case::status_approved(json!({"status": "approved"}), Ok(SwapDecision::Approved))]
#[case::flags_rejected(json!({"rejected": true}), Ok(SwapDecision::Rejected))]
#[case::agreeing_forms(json!({"status": "approved", "approved": true}), Ok(SwapDecision::Approved))]
#[case::pending_status(json!({"status": "pending"}), Err(DomainCode::InvalidRequest))]
#[case::both_flags(json!({"approved": true, "rejected": true}), Err(DomainCode::InvalidRequest))]
#[case::no_flags_set(json!({"approved": false, "rejected": false}), Err(DomainCode::InvalidRequest))]
#[case::disagreeing_forms(json!({"status": "approved", "rejected": true}), Err(DomainCode::InvalidRequest))]
#[case::empty(json!({}), Err(DomainCode::InvalidRequest))]
fn resolve_body_maps_to_decision(
    #[case] body: Value,
    #[case] expected: Result<SwapDecision, DomainCode>,
) {
    let request: ResolveSwapRequest = serde_json::from_value(body).expect("request body");
    let decision = SwapDecision::try_from(request).map_err(|err| err.code());
    assert_eq!(decision, expected);
}
