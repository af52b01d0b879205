/*!
 * # Tenant context
 *
 * Every API call is scoped to a tenant. The tenant is resolved once per
 * request, from the `X-Tenant-ID` header, into a [`TenantContext`] that is
 * passed explicitly to every service call. The acting user is taken from
 * `X-User-ID` / `X-User-Name` and snapshotted onto documents.
 */

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ServiceError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_NAME_HEADER: &str = "x-user-name";

const SYSTEM_ACTOR: &str = "system";
const MAX_HEADER_LEN: usize = 128;

/// Snapshot of the user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_ACTOR, SYSTEM_ACTOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: String,
    pub actor: Actor,
}

impl TenantContext {
    pub fn new(tenant_id: impl Into<String>, actor: Actor) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            actor,
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ServiceError> {
    match parts.headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| ServiceError::ValidationError(format!("{} must be ASCII", name)))?
                .trim();
            if value.len() > MAX_HEADER_LEN {
                return Err(ServiceError::ValidationError(format!(
                    "{} must be at most {} characters",
                    name, MAX_HEADER_LEN
                )));
            }
            Ok(Some(value).filter(|v| !v.is_empty()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_value(parts, TENANT_HEADER)?
            .ok_or_else(|| ServiceError::Unauthorized("X-Tenant-ID header is required".into()))?
            .to_string();

        let actor = match header_value(parts, USER_ID_HEADER)? {
            Some(id) => {
                let name = header_value(parts, USER_NAME_HEADER)?.unwrap_or(id);
                Actor::new(id, name)
            }
            None => Actor::system(),
        };

        Ok(TenantContext { tenant_id, actor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<TenantContext, ServiceError> {
        let (mut parts, _) = request.into_parts();
        TenantContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn requires_tenant_header() {
        let result = extract(Request::builder().body(()).unwrap()).await;
        assert_matches!(result, Err(ServiceError::Unauthorized(_)));

        let blank = extract(
            Request::builder()
                .header(TENANT_HEADER, "   ")
                .body(())
                .unwrap(),
        )
        .await;
        assert_matches!(blank, Err(ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn actor_defaults_to_system() {
        let ctx = extract(
            Request::builder()
                .header(TENANT_HEADER, "acme")
                .body(())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(ctx.tenant_id, "acme");
        assert_eq!(ctx.actor, Actor::system());
    }

    #[tokio::test]
    async fn actor_name_falls_back_to_id() {
        let ctx = extract(
            Request::builder()
                .header(TENANT_HEADER, "acme")
                .header(USER_ID_HEADER, "u-42")
                .body(())
                .unwrap(),
        )
        .await
        .unwrap();
        assert_eq!(ctx.actor, Actor::new("u-42", "u-42"));
        assert_eq!(ctx.tenant_id(), "acme");
    }
}
