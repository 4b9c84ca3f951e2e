//! Request-scoped caller identity.
//!
//! Every repository operation receives a [`RequestContext`] explicitly. There
//! is no process-wide "current user".

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::i18n::Locale;
use crate::types::{BranchId, UserId};

/// Staff roles recognised by the workshop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access.
    Admin,
    /// Branch manager.
    Manager,
    /// Front desk.
    Reception,
    /// Diagnostic specialist.
    Specialist,
    /// Parts store keeper.
    Warehouse,
    /// Cash desk.
    Treasurer,
    /// Workshop technician.
    Technician,
}

impl Role {
    /// Returns the role as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Reception => "reception",
            Self::Specialist => "specialist",
            Self::Warehouse => "warehouse",
            Self::Treasurer => "treasurer",
            Self::Technician => "technician",
        }
    }

    /// Parses a role name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "manager" => Some(Self::Manager),
            "reception" => Some(Self::Reception),
            "specialist" => Some(Self::Specialist),
            "warehouse" => Some(Self::Warehouse),
            "treasurer" => Some(Self::Treasurer),
            "technician" => Some(Self::Technician),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Roles allowed to approve quotations and receive purchases.
pub const APPROVERS: &[Role] = &[Role::Admin, Role::Manager];
/// Roles allowed to post to the treasury directly.
pub const TREASURY_STAFF: &[Role] = &[Role::Admin, Role::Manager, Role::Treasurer];
/// Roles allowed to adjust stock by hand.
pub const STOCK_KEEPERS: &[Role] = &[Role::Admin, Role::Manager, Role::Warehouse];

/// Resolves the role of a caller from the (optional) role claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RolePolicy {
    default_role: Option<Role>,
}

impl RolePolicy {
    /// Creates a policy. `default_role` applies to tokens that carry no role.
    #[must_use]
    pub const fn new(default_role: Option<Role>) -> Self {
        Self { default_role }
    }

    /// Builds the policy from a configured role name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an unknown role name.
    pub fn from_config(default_role: Option<&str>) -> AppResult<Self> {
        match default_role {
            None => Ok(Self::new(None)),
            Some(name) => Role::parse(name)
                .map(|role| Self::new(Some(role)))
                .ok_or_else(|| AppError::Validation(format!("unknown default role: {name}"))),
        }
    }

    /// Resolves the effective role.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` when the claim is absent and no default
    /// is configured, or when the claim names an unknown role.
    pub fn resolve(&self, claim: Option<&str>) -> AppResult<Role> {
        match claim {
            Some(name) => Role::parse(name)
                .ok_or_else(|| AppError::Forbidden(format!("unknown role: {name}"))),
            None => self
                .default_role
                .ok_or_else(|| AppError::Forbidden("token carries no role".to_string())),
        }
    }
}

/// Identity and preferences of the caller of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    /// Acting user.
    pub user_id: UserId,
    /// Branch the user works in.
    pub branch_id: BranchId,
    /// Effective role.
    pub role: Role,
    /// Language for messages.
    pub locale: Locale,
}

impl RequestContext {
    /// Creates a new context.
    #[must_use]
    pub const fn new(user_id: UserId, branch_id: BranchId, role: Role, locale: Locale) -> Self {
        Self {
            user_id,
            branch_id,
            role,
            locale,
        }
    }

    /// Fails unless the caller holds one of `roles`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` naming the caller's role.
    pub fn require_any(&self, roles: &[Role]) -> AppResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role {} may not perform this action",
                self.role
            )))
        }
    }
}
