//! Company members, projects and the caller identity.
//!
//! These records are owned by other subsystems; the costs engine only reads
//! them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::NON_PRODUCTIVE_CATEGORY;
use crate::impl_stored_enum_conversions;

/// Identifiers are UUIDs issued by the platform.
pub type CompanyId = Uuid;
pub type UserId = Uuid;
pub type ProjectId = Uuid;
pub type CategoryId = Uuid;

/// Relation of a user to the company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRelation {
    Owner,
    Admin,
    Employee,
    Guest,
}

impl_stored_enum_conversions!(UserRelation {
    Owner => "OWNER",
    Admin => "ADMIN",
    Employee => "EMPLOYEE",
    Guest => "GUEST",
});

/// Company member as seen by the costs engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub company_id: CompanyId,
    pub name: String,
    pub relation: UserRelation,
    /// Monthly gross salary. `None` means not configured.
    pub salary: Option<Decimal>,
    /// Live hourly cost used outside closing.
    pub hourly_cost: Option<Decimal>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_guest(&self) -> bool {
        self.relation == UserRelation::Guest
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Non-guest and not soft-deleted, regardless of `is_active`. A user
    /// deactivated mid-month may still have logged hours.
    pub fn counts_for_cost_hour(&self) -> bool {
        !self.is_guest() && !self.is_deleted()
    }

    /// Active, non-guest, not deleted: the population whose salaries are
    /// pooled and validated.
    pub fn is_active_member(&self) -> bool {
        self.is_active && self.counts_for_cost_hour()
    }
}

/// Project category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCategory {
    pub id: CategoryId,
    pub company_id: CompanyId,
    pub name: String,
}

impl ProjectCategory {
    pub fn is_non_productive(&self) -> bool {
        self.name == NON_PRODUCTIVE_CATEGORY
    }
}

/// Project as seen by the costs engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub company_id: CompanyId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub is_active: bool,
}

impl Project {
    pub fn in_category(&self, category: Option<CategoryId>) -> bool {
        category.is_some() && self.category_id == category
    }
}

/// Which projects the caller may see. Decided by the access-control module;
/// only filters what is returned, never the math.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProjectScope {
    #[default]
    All,
    Only(HashSet<ProjectId>),
}

impl ProjectScope {
    pub fn allows(&self, project_id: &ProjectId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(project_id),
        }
    }
}

/// Authenticated caller, used for tenancy and audit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub scope: ProjectScope,
}

impl Actor {
    pub fn full_admin(user_id: UserId, company_id: CompanyId) -> Self {
        Self { user_id, company_id, scope: ProjectScope::All }
    }
}
