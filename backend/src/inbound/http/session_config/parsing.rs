//! Reading the cookie toggles from the environment.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{BuildMode, SAMESITE_ENV, SessionConfigError};

const FLAG_VALUES: &str = "1|0|true|false|yes|no|y|n";
const SAME_SITE_VALUES: &str = "Strict|Lax|None";

impl BuildMode {
    /// Debug builds fall back to `fallback` with a warning; release builds
    /// fail with `error`.
    pub(super) fn fallback_or<T>(
        self,
        fallback: T,
        error: SessionConfigError,
    ) -> Result<T, SessionConfigError> {
        if self.is_debug() {
            warn!(%error, "session configuration fallback in debug build");
            Ok(fallback)
        } else {
            Err(error)
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

/// Read the boolean toggle `name`, defaulting to `default` in debug builds.
pub(super) fn read_flag<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(raw) = env.string(name) else {
        return mode.fallback_or(default, SessionConfigError::MissingEnv { name });
    };
    match parse_flag(&raw) {
        Some(flag) => Ok(flag),
        None => mode.fallback_or(
            default,
            SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected: FLAG_VALUES,
            },
        ),
    }
}

/// Read `SESSION_SAMESITE`. `None` is only valid on secure cookies.
pub(super) fn read_same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(raw) = env.string(SAMESITE_ENV) else {
        return mode.fallback_or(default, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match raw.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => mode.fallback_or(SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => mode.fallback_or(
            default,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: raw,
                expected: SAME_SITE_VALUES,
            },
        ),
    }
}
