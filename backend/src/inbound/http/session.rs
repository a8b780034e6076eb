//! Session identity for HTTP handlers.
//!
//! Wraps the Actix session so handlers only see "who is calling". The
//! session cookie is private, so a missing, garbled or tampered cookie all
//! read as "no user" and surface as `401 Unauthorized`.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Authenticated-session view of the Actix [`Session`].
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the request session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Start a session for `user_id`, replacing any earlier identity.
    pub fn sign_in(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// End the session and clear its cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "ignoring malformed user id in session");
                None
            }
        }))
    }

    /// The signed-in user or `Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
