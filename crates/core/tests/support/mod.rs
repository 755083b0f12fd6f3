//! Shared test helpers for `costclose-core` integration tests.
//!
//! `Company` seeds one tenant into an [`InMemoryCosts`] store and wires the
//! services over it, so tests can focus on behaviour instead of plumbing.

#![allow(dead_code)]

pub mod repositories;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use costclose_core::{
    ClosingService, InternalCostService, MonthlySalaryService, OverheadService, PeriodLocks,
};
use costclose_domain::constants::NON_PRODUCTIVE_CATEGORY;
use costclose_domain::{
    Actor, CompanyId, Period, Project, ProjectCategory, ProjectId, ProjectMonthlyRevenue,
    TimeEntry, TimeEntryKind, User, UserId, UserRelation,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub use repositories::InMemoryCosts;

pub fn march() -> Period {
    Period::new(2025, 3).unwrap()
}

/// Services sharing one store and one lock registry.
pub struct Services {
    pub store: InMemoryCosts,
    pub closing: Arc<ClosingService>,
    pub salaries: MonthlySalaryService,
    pub overhead: OverheadService,
    pub internal: InternalCostService,
}

impl Services {
    pub fn new(store: InMemoryCosts) -> Self {
        let shared = Arc::new(store.clone());
        let locks = Arc::new(PeriodLocks::new());
        let closing = Arc::new(ClosingService::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared.clone(),
            locks.clone(),
        ));

        Self {
            salaries: MonthlySalaryService::new(
                shared.clone(),
                shared.clone(),
                closing.clone(),
                locks.clone(),
            ),
            overhead: OverheadService::new(shared.clone(), closing.clone(), locks),
            internal: InternalCostService::new(shared),
            closing,
            store,
        }
    }
}

/// One tenant seeded into a store.
pub struct Company {
    pub id: CompanyId,
    pub admin: UserId,
    pub store: InMemoryCosts,
}

impl Company {
    pub fn new() -> Self {
        let company = Self { id: Uuid::new_v4(), admin: Uuid::new_v4(), store: InMemoryCosts::new() };
        company.store.state().users.push(User {
            id: company.admin,
            company_id: company.id,
            name: "Admin".into(),
            relation: UserRelation::Guest,
            salary: None,
            hourly_cost: None,
            is_active: true,
            deleted_at: None,
        });
        company
    }

    pub fn actor(&self) -> Actor {
        Actor::full_admin(self.admin, self.id)
    }

    pub fn user(&self, name: &str, salary: Option<Decimal>, hourly_cost: Option<Decimal>) -> UserId {
        self.user_with(name, UserRelation::Employee, salary, hourly_cost)
    }

    pub fn user_with(
        &self,
        name: &str,
        relation: UserRelation,
        salary: Option<Decimal>,
        hourly_cost: Option<Decimal>,
    ) -> UserId {
        let id = Uuid::new_v4();
        self.store.state().users.push(User {
            id,
            company_id: self.id,
            name: name.into(),
            relation,
            salary,
            hourly_cost,
            is_active: true,
            deleted_at: None,
        });
        id
    }

    pub fn set_salary(&self, user_id: UserId, salary: Option<Decimal>) {
        let mut state = self.store.state();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.salary = salary;
        }
    }

    pub fn non_productive_category(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.store.state().categories.push(ProjectCategory {
            id,
            company_id: self.id,
            name: NON_PRODUCTIVE_CATEGORY.into(),
        });
        id
    }

    pub fn project(&self, name: &str, category_id: Option<Uuid>) -> ProjectId {
        let id = Uuid::new_v4();
        self.store.state().projects.push(Project {
            id,
            company_id: self.id,
            name: name.into(),
            category_id,
            is_active: true,
        });
        id
    }

    pub fn revenue(&self, project_id: ProjectId, period: Period, actual: Decimal) {
        let mut state = self.store.state();
        state.revenues.retain(|r| !(r.project_id == project_id && r.period == period));
        state.revenues.push(ProjectMonthlyRevenue {
            project_id,
            period,
            estimated_revenue: None,
            actual_revenue: Some(actual),
        });
    }

    /// Log `hours` of work on the 10th of the month.
    pub fn hours(&self, user_id: UserId, project_id: ProjectId, period: Period, hours: i64) {
        self.store.state().entries.push(TimeEntry {
            id: Uuid::new_v4(),
            company_id: self.id,
            user_id,
            project_id: Some(project_id),
            kind: TimeEntryKind::Work,
            started_at: Utc.with_ymd_and_hms(period.year, period.month, 10, 9, 0, 0).unwrap(),
            duration_minutes: hours * 60,
        });
    }

    pub fn services(&self) -> Services {
        Services::new(self.store.clone())
    }
}
