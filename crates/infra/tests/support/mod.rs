//! Shared helpers for the SQLite integration tests.
//!
//! `TestDb` owns a migrated database in a temporary directory. The seeding
//! helpers write the rows other subsystems own (users, projects, entries,
//! revenues) with plain SQL, since the costs engine only reads them.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use costclose_core::{
    ClosingService, InternalCostService, MonthlySalaryService, OverheadService, PeriodLocks,
};
use costclose_domain::constants::NON_PRODUCTIVE_CATEGORY;
use costclose_domain::{Actor, CompanyId, Period, ProjectId, UserId, UserRelation};
use costclose_infra::{
    DbManager, SqliteClosingRepository, SqliteCostInputsRepository, SqliteOverheadRepository,
    SqliteSalaryRepository,
};
use rusqlite::params;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

pub fn march() -> Period {
    Period::new(2025, 3).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub struct TestDb {
    _dir: TempDir,
    pub db: Arc<DbManager>,
    pub company: CompanyId,
    pub admin: UserId,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(dir.path().join("costclose.db"), 4).expect("manager created");
        db.run_migrations().expect("migrations run");

        let test_db = Self { _dir: dir, db: Arc::new(db), company: Uuid::new_v4(), admin: Uuid::nil() };
        let admin = test_db.user_with("Admin", UserRelation::Guest, None, None);
        Self { admin, ..test_db }
    }

    pub fn actor(&self) -> Actor {
        Actor::full_admin(self.admin, self.company)
    }

    fn exec(&self, sql: &str, params: impl rusqlite::Params) {
        let conn = self.db.get_connection().expect("connection acquired");
        conn.execute(sql, params).expect("seed statement runs");
    }

    pub fn user(&self, name: &str, salary: Option<Decimal>, hourly: Option<Decimal>) -> UserId {
        self.user_with(name, UserRelation::Employee, salary, hourly)
    }

    pub fn user_with(
        &self,
        name: &str,
        relation: UserRelation,
        salary: Option<Decimal>,
        hourly: Option<Decimal>,
    ) -> UserId {
        let id = Uuid::new_v4();
        self.exec(
            "INSERT INTO users (id, company_id, name, relation, salary, hourly_cost, is_active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
            params![
                id.to_string(),
                self.company.to_string(),
                name,
                relation.as_str(),
                salary.map(|s| s.to_string()),
                hourly.map(|h| h.to_string()),
            ],
        );
        id
    }

    pub fn set_salary(&self, user: UserId, salary: Decimal) {
        self.exec(
            "UPDATE users SET salary = ?2 WHERE id = ?1",
            params![user.to_string(), salary.to_string()],
        );
    }

    pub fn soft_delete_user(&self, user: UserId) {
        self.exec(
            "UPDATE users SET deleted_at = ?2 WHERE id = ?1",
            params![user.to_string(), at(2025, 1, 1, 0).timestamp_millis()],
        );
    }

    pub fn category(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.exec(
            "INSERT INTO project_categories (id, company_id, name) VALUES (?1, ?2, ?3)",
            params![id.to_string(), self.company.to_string(), name],
        );
        id
    }

    pub fn non_productive_category(&self) -> Uuid {
        self.category(NON_PRODUCTIVE_CATEGORY)
    }

    pub fn project(&self, name: &str, category: Option<Uuid>) -> ProjectId {
        let id = Uuid::new_v4();
        self.exec(
            "INSERT INTO projects (id, company_id, name, category_id, is_active)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![
                id.to_string(),
                self.company.to_string(),
                name,
                category.map(|c| c.to_string()),
            ],
        );
        id
    }

    pub fn soft_delete_project(&self, project: ProjectId) {
        self.exec(
            "UPDATE projects SET deleted_at = ?2 WHERE id = ?1",
            params![project.to_string(), at(2025, 1, 1, 0).timestamp_millis()],
        );
    }

    pub fn revenue(&self, project: ProjectId, period: Period, actual: Decimal) {
        self.exec(
            "INSERT INTO project_monthly_revenues (project_id, year, month, actual_revenue)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (project_id, year, month) DO UPDATE SET actual_revenue = excluded.actual_revenue",
            params![project.to_string(), period.year, period.month, actual.to_string()],
        );
    }

    pub fn entry(&self, user: UserId, project: ProjectId, started_at: DateTime<Utc>, minutes: i64) {
        self.exec(
            "INSERT INTO time_entries (id, company_id, user_id, project_id, kind, started_at, duration_minutes)
             VALUES (?1, ?2, ?3, ?4, 'WORK', ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                self.company.to_string(),
                user.to_string(),
                project.to_string(),
                started_at.timestamp_millis(),
                minutes,
            ],
        );
    }

    /// Whole hours on the 10th of the period.
    pub fn hours(&self, user: UserId, project: ProjectId, period: Period, hours: i64) {
        self.entry(user, project, at(period.year, period.month, 10, 9), hours * 60);
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.db.get_connection().expect("connection acquired");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), &[], |row| row.get(0))
            .expect("count query runs")
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            inputs: Arc::new(SqliteCostInputsRepository::new(self.db.clone())),
            salaries: Arc::new(SqliteSalaryRepository::new(self.db.clone())),
            overhead: Arc::new(SqliteOverheadRepository::new(self.db.clone())),
            closings: Arc::new(SqliteClosingRepository::new(self.db.clone())),
        }
    }

    pub fn services(&self) -> Services {
        let repos = self.repositories();
        let locks = Arc::new(PeriodLocks::new());
        let closing = Arc::new(ClosingService::new(
            repos.inputs.clone(),
            repos.salaries.clone(),
            repos.overhead.clone(),
            repos.closings.clone(),
            locks.clone(),
        ));
        Services {
            salaries: MonthlySalaryService::new(
                repos.inputs.clone(),
                repos.salaries.clone(),
                closing.clone(),
                locks.clone(),
            ),
            overhead: OverheadService::new(repos.overhead.clone(), closing.clone(), locks),
            internal: InternalCostService::new(repos.inputs.clone()),
            closing,
        }
    }
}

pub struct Repositories {
    pub inputs: Arc<SqliteCostInputsRepository>,
    pub salaries: Arc<SqliteSalaryRepository>,
    pub overhead: Arc<SqliteOverheadRepository>,
    pub closings: Arc<SqliteClosingRepository>,
}

pub struct Services {
    pub closing: Arc<ClosingService>,
    pub salaries: MonthlySalaryService,
    pub overhead: OverheadService,
    pub internal: InternalCostService,
}
