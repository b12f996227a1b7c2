//! Authorization guard.
//!
//! Pure policy checks over an authenticated actor. The same functions drive
//! list filtering and single-record decisions so the two can never disagree.

use super::{Error, Resource, User, UserId};

const ADMIN_REQUIRED: &str = "admin access required";

/// An actor may read a resource unless it is admin-only and they are not an
/// administrator.
pub fn can_read_resource(actor: &User, resource: &Resource) -> bool {
    !resource.requires_admin || actor.is_admin()
}

/// Only administrators create, update or delete resources.
pub fn can_write_resource(actor: &User) -> bool {
    actor.is_admin()
}

/// Only administrators list or modify user accounts.
pub fn can_manage_users(actor: &User) -> bool {
    actor.is_admin()
}

/// Administrators may delete any account except their own.
pub fn can_delete_user(actor: &User, target: UserId) -> bool {
    actor.is_admin() && actor.id() != target
}

/// [`can_write_resource`] as a `forbidden` error.
///
/// Inbound adapters call this before decoding a write payload, so a
/// non-administrator is refused whatever they send.
pub fn require_resource_writer(actor: &User) -> Result<(), Error> {
    if can_write_resource(actor) {
        Ok(())
    } else {
        Err(Error::forbidden(ADMIN_REQUIRED))
    }
}

/// [`can_manage_users`] as a `forbidden` error.
pub fn require_user_manager(actor: &User) -> Result<(), Error> {
    if can_manage_users(actor) {
        Ok(())
    } else {
        Err(Error::forbidden(ADMIN_REQUIRED))
    }
}
