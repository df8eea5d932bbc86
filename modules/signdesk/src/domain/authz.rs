//! Authorization gate: resolved identity + required access → permit or deny.

use uuid::Uuid;

use crate::contract::model::Role;
use crate::domain::error::DomainError;
use crate::domain::identity::Identity;
use crate::domain::resource::Access;

/// Fails closed: no identity is `Unauthenticated`, too low a role is `Unauthorized`.
/// `target` is the record id the operation addresses, when there is one.
pub fn authorize(
    identity: Option<&Identity>,
    access: Access,
    target: Option<Uuid>,
) -> Result<&Identity, DomainError> {
    let identity = identity.ok_or(DomainError::Unauthenticated)?;
    let is_admin = identity.role == Role::Admin;

    let permitted = match access {
        Access::AnyRole => true,
        Access::Admin => is_admin,
        Access::AdminOrSelf => is_admin || target == Some(identity.user_id),
    };

    if permitted {
        Ok(identity)
    } else {
        Err(DomainError::Unauthorized)
    }
}
