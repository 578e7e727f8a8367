//! Role-based authorization with explicit grants.

use std::collections::{BTreeSet, HashMap};

use school_assist_core::{ChatUser, Permission, Role};

use crate::error::ServiceError;

/// Decides whether a user may perform an action.
pub trait Authorizer: Send + Sync {
    fn allows(&self, user: &ChatUser, permission: Permission) -> bool;

    fn authorize(&self, user: &ChatUser, permission: Permission) -> Result<(), ServiceError> {
        if self.allows(user, permission) {
            Ok(())
        } else {
            tracing::info!(
                user_id = %user.id,
                role = %user.role,
                permission = %permission,
                "permission denied"
            );
            Err(ServiceError::Forbidden(permission))
        }
    }
}

/// Grants a permission when the user's role lists it or the user holds it
/// directly. No role is granted anything it is not listed for.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    grants: HashMap<Role, BTreeSet<Permission>>,
}

impl RolePolicy {
    /// Policy with no role grants; only direct permissions count.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// School admins hold every permission; teaching and office staff may
    /// view students.
    #[must_use]
    pub fn standard() -> Self {
        Self::empty()
            .grant(Role::SuperAdmin, Permission::ALL)
            .grant(Role::Admin, Permission::ALL)
            .grant(Role::Teacher, &[Permission::StudentsView])
            .grant(Role::Staff, &[Permission::StudentsView])
            .grant(Role::Accountant, &[Permission::StudentsView])
    }

    #[must_use]
    pub fn grant(mut self, role: Role, permissions: &[Permission]) -> Self {
        self.grants.entry(role).or_default().extend(permissions.iter().copied());
        self
    }
}

impl Authorizer for RolePolicy {
    fn allows(&self, user: &ChatUser, permission: Permission) -> bool {
        user.has_direct_permission(permission)
            || self.grants.get(&user.role).is_some_and(|granted| granted.contains(&permission))
    }
}
