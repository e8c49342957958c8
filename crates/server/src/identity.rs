// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity extraction at the server boundary.
//!
//! The identity provider in front of the server supplies the caller's id
//! and roles in request headers. They are trusted verbatim; this module
//! only turns them into an `AuthenticatedActor`.

use axum::{extract::FromRequestParts, http::request::Parts};
use inst_plan_api::AuthenticatedActor;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::HttpError;

/// Header carrying the caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's comma-separated role names.
pub const USER_ROLES_HEADER: &str = "x-user-roles";
/// Optional header carrying a caller-chosen request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Extractor for the calling actor and the request id recorded as the
/// audit cause.
///
/// A missing or blank `x-user-id` is rejected with 401. A missing
/// `x-user-roles` header yields an actor with no roles, who is refused by
/// every authorization check.
pub struct Identity {
    pub actor: AuthenticatedActor,
    pub request_id: String,
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|value| value.to_str().ok())
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id: &str = header(parts, USER_ID_HEADER).unwrap_or_default();
        let roles: &str = header(parts, USER_ROLES_HEADER).unwrap_or_default();
        let actor: AuthenticatedActor = AuthenticatedActor::from_identity(id, roles)?;

        let request_id: String = header(parts, REQUEST_ID_HEADER)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map_or_else(
                || format!("req-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed)),
                String::from,
            );

        debug!(
            user_id = %actor.id,
            roles = ?actor.roles,
            request_id = %request_id,
            "Identity extracted"
        );

        Ok(Self { actor, request_id })
    }
}
