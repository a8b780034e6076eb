//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use crate::Trace;
use crate::inbound::http::error::json_config;
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Disables the `Secure` flag for local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE_NAME.to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by `res`.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE_NAME)
        .expect("session cookie")
        .into_owned()
}

/// Full API surface over `state`, mounted the way the server mounts it.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(test_session_middleware())
                .configure(super::configure),
        )
}

/// Register a member and return their id.
pub async fn register<S>(app: &S, name: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": "secret-password",
                "location": "Leeds",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "register {email}: {}", res.status());
    let body: Value = test::read_body_json(res).await;
    body["id"].as_str().expect("user id").to_owned()
}

/// Log in as `email` and return the session cookie.
pub async fn login<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "password": "secret-password" }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login {email}: {}", res.status());
    session_cookie(&res)
}

/// Register, log in and return `(user id, cookie)`.
pub async fn sign_up<S>(app: &S, name: &str, email: &str) -> (String, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let id = register(app, name, email).await;
    let cookie = login(app, email).await;
    (id, cookie)
}

/// List an item as the session owner and return its id.
pub async fn list_item<S>(app: &S, cookie: &Cookie<'static>, name: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/items")
            .cookie(cookie.clone())
            .set_json(json!({
                "name": name,
                "description": format!("A well loved {name}"),
                "category": "misc",
            }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "list item {name}: {}", res.status());
    let body: Value = test::read_body_json(res).await;
    body["id"].as_str().expect("item id").to_owned()
}
