//! Role checks scoped by shop and branch.
//!
//! A caller's role assignments are loaded once per request with
//! [`load_grants`] and every decision afterwards is a pure function of
//! [`Grants`], so the same rules apply to every route.
//!
//! Superadmins pass every check. Shop owners pass every check for their
//! shop's branches. Employees and delivery users only pass checks for the
//! branch they are assigned to, and only for the roles a route allows.

use diesel::{ExpressionMethods, PgConnection, QueryDsl, RunQueryDsl, SelectableHelper};
use uuid::Uuid;

use crate::{domain::Role, models::RoleAssignment, schema::role_assignments};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthzError {
    #[error("Only platform administrators can do this")]
    NotSuperadmin,
    #[error("Not an owner of shop {0}")]
    NotShopOwner(Uuid),
    #[error("Not a member of shop {0}")]
    NotShopMember(Uuid),
    #[error("Not allowed to do this at branch {0}")]
    NotBranchStaff(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grant {
    pub role: Role,
    pub shop_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct Grants {
    pub user_id: Uuid,
    grants: Vec<Grant>,
}

impl Grants {
    pub fn new(user_id: Uuid, grants: Vec<Grant>) -> Self {
        Self { user_id, grants }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.grants.iter().any(|g| g.role == role)
    }

    pub fn is_superadmin(&self) -> bool {
        self.has_role(Role::Superadmin)
    }

    pub fn owns_shop(&self, shop_id: Uuid) -> bool {
        self.is_superadmin()
            || self
                .grants
                .iter()
                .any(|g| g.role == Role::Owner && g.shop_id == Some(shop_id))
    }

    pub fn owned_shops(&self) -> Vec<Uuid> {
        self.grants
            .iter()
            .filter(|g| g.role == Role::Owner)
            .filter_map(|g| g.shop_id)
            .collect()
    }

    /// Branches where the caller holds one of `roles`.
    pub fn branches_with(&self, roles: &[Role]) -> Vec<Uuid> {
        self.grants
            .iter()
            .filter(|g| roles.contains(&g.role))
            .filter_map(|g| g.branch_id)
            .collect()
    }

    pub fn require_superadmin(&self) -> Result<(), AuthzError> {
        if self.is_superadmin() {
            Ok(())
        } else {
            Err(AuthzError::NotSuperadmin)
        }
    }

    pub fn require_shop_owner(&self, shop_id: Uuid) -> Result<(), AuthzError> {
        if self.owns_shop(shop_id) {
            Ok(())
        } else {
            Err(AuthzError::NotShopOwner(shop_id))
        }
    }

    /// Owners and staff of any branch of the shop.
    pub fn require_shop_member(&self, shop_id: Uuid) -> Result<(), AuthzError> {
        let is_staff = self
            .grants
            .iter()
            .any(|g| g.role.is_branch_staff() && g.shop_id == Some(shop_id));

        if self.owns_shop(shop_id) || is_staff {
            Ok(())
        } else {
            Err(AuthzError::NotShopMember(shop_id))
        }
    }

    /// Returns the role the caller acts with at the branch: `Owner` for
    /// owners and superadmins, otherwise the first of `allowed` they hold
    /// there.
    pub fn require_branch_staff(
        &self,
        shop_id: Uuid,
        branch_id: Uuid,
        allowed: &[Role],
    ) -> Result<Role, AuthzError> {
        if self.owns_shop(shop_id) {
            return Ok(Role::Owner);
        }

        allowed
            .iter()
            .copied()
            .find(|role| {
                self.grants
                    .iter()
                    .any(|g| g.role == *role && g.branch_id == Some(branch_id))
            })
            .ok_or(AuthzError::NotBranchStaff(branch_id))
    }
}

#[tracing::instrument("Loading role assignments", skip(conn))]
pub fn load_grants(conn: &mut PgConnection, user_id: Uuid) -> Result<Grants, diesel::result::Error> {
    let assignments = role_assignments::table
        .filter(role_assignments::user_id.eq(user_id))
        .select(RoleAssignment::as_select())
        .load::<RoleAssignment>(conn)?;

    let grants = assignments
        .into_iter()
        .filter_map(|a| match a.role_name.parse::<Role>() {
            Ok(role) => Some(Grant {
                role,
                shop_id: a.shop_id,
                branch_id: a.branch_id,
            }),
            Err(e) => {
                tracing::warn!(assignment_id = %a.assignment_id, "Skipping assignment: {}", e);
                None
            }
        })
        .collect();

    Ok(Grants::new(user_id, grants))
}

/// Distinct platform-wide roles to put in a login token.
pub fn token_roles(grants: &Grants) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();
    for grant in &grants.grants {
        if !roles.contains(&grant.role) {
            roles.push(grant.role);
        }
    }
    roles
}
