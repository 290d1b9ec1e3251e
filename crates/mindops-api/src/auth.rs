//! API key authentication and scope-based authorization.
//!
//! Mirrors the source's header contract exactly: `x-api-key` or a `Bearer`
//! token in `Authorization` against `CONTROL_PLANE_API_KEY`; `x-actor`/
//! `x-user` name the caller; `x-scopes` is a comma-separated scope list.

use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthzMode {
    AllowAll,
    DenyAll,
    Scoped,
}

impl AuthzMode {
    pub fn from_env() -> Self {
        match std::env::var("CONTROL_PLANE_AUTHZ_MODE").ok().as_deref() {
            Some("deny-all") => Self::DenyAll,
            Some("scoped") => Self::Scoped,
            _ => Self::AllowAll,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor: String,
    pub scopes: HashSet<String>,
    pub auth_mode: &'static str,
}

impl ActorContext {
    fn parse_scopes(raw: Option<&str>) -> HashSet<String> {
        raw.map(|value| {
            value
                .split(',')
                .map(|scope| scope.trim())
                .filter(|scope| !scope.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;
        let configured_key = std::env::var("CONTROL_PLANE_API_KEY").ok();

        let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let bearer = header_str("authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);
        let provided = header_str("x-api-key").or(bearer);

        let auth_mode = match &configured_key {
            Some(expected) => {
                if provided != Some(expected.as_str()) {
                    return Err(ApiError::Unauthorized);
                }
                "api_key"
            }
            None => "none",
        };

        let actor = header_str("x-actor")
            .or_else(|| header_str("x-user"))
            .unwrap_or("anonymous")
            .to_string();
        let scopes = ActorContext::parse_scopes(header_str("x-scopes"));

        Ok(ActorContext { actor, scopes, auth_mode })
    }
}

/// Authorizes `action` for `actor` under the process-wide authz mode.
pub fn authorize(actor: &ActorContext, action: &str) -> Result<(), ApiError> {
    match AuthzMode::from_env() {
        AuthzMode::AllowAll => Ok(()),
        AuthzMode::DenyAll => Err(ApiError::Forbidden),
        AuthzMode::Scoped => {
            if actor.scopes.is_empty() || actor.scopes.contains(action) {
                Ok(())
            } else {
                Err(ApiError::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_all_permits_any_action() {
        let actor = ActorContext { actor: "anonymous".into(), scopes: HashSet::new(), auth_mode: "none" };
        std::env::remove_var("CONTROL_PLANE_AUTHZ_MODE");
        assert!(authorize(&actor, "policy.write").is_ok());
    }

    #[test]
    fn scoped_mode_requires_matching_scope() {
        std::env::set_var("CONTROL_PLANE_AUTHZ_MODE", "scoped");
        let mut scopes = HashSet::new();
        scopes.insert("policy.read".to_string());
        let actor = ActorContext { actor: "svc".into(), scopes, auth_mode: "api_key" };
        assert!(authorize(&actor, "policy.read").is_ok());
        assert!(authorize(&actor, "policy.write").is_err());
        std::env::remove_var("CONTROL_PLANE_AUTHZ_MODE");
    }

    #[test]
    fn deny_all_rejects_every_action() {
        std::env::set_var("CONTROL_PLANE_AUTHZ_MODE", "deny-all");
        let actor = ActorContext { actor: "svc".into(), scopes: HashSet::new(), auth_mode: "api_key" };
        assert!(authorize(&actor, "health").is_err());
        std::env::remove_var("CONTROL_PLANE_AUTHZ_MODE");
    }
}
