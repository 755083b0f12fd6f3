//! SQLite-backed read access to users, projects, time entries and revenues.
//!
//! These tables belong to other subsystems; the costs engine only reads
//! them. Time entries are selected with a half-open `[start, end)` predicate
//! on `started_at` so the `(company_id, started_at)` index stays usable.

use std::sync::Arc;

use async_trait::async_trait;
use costclose_common::storage::SqliteConnection;
use costclose_core::CostInputsRepository;
use costclose_domain::{
    CompanyId, MonthRange, Period, Project, ProjectCategory, ProjectMonthlyRevenue,
    Result as DomainResult, TimeEntry, User, UserId,
};
use rusqlite::{Row, ToSql};

use super::columns::{
    enum_at, instant_at, int_to_bool, millis, opt_decimal_at, opt_instant_at, opt_uuid_at,
    period_at, uuid_at,
};
use super::manager::DbManager;
use crate::errors::map_storage_error;

/// Read side of users, projects, time entries and revenue.
pub struct SqliteCostInputsRepository {
    db: Arc<DbManager>,
}

impl SqliteCostInputsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn select_users(
        conn: &SqliteConnection,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> DomainResult<Vec<User>> {
        conn.query_map(sql, params, map_user_row).map_err(map_storage_error)
    }
}

#[async_trait]
impl CostInputsRepository for SqliteCostInputsRepository {
    async fn list_users(&self, company_id: CompanyId) -> DomainResult<Vec<User>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| Self::select_users(conn, USERS_BY_COMPANY_SQL, &[&company]))
            .await
    }

    async fn find_user(&self, company_id: CompanyId, user_id: UserId) -> DomainResult<Option<User>> {
        let (company, user) = (company_id.to_string(), user_id.to_string());
        self.db
            .run_blocking(move |conn| {
                let mut users = Self::select_users(conn, USER_BY_ID_SQL, &[&company, &user])?;
                Ok(users.pop())
            })
            .await
    }

    async fn list_projects(&self, company_id: CompanyId) -> DomainResult<Vec<Project>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(PROJECTS_BY_COMPANY_SQL, &[&company], map_project_row)
                    .map_err(map_storage_error)
            })
            .await
    }

    async fn list_categories(&self, company_id: CompanyId) -> DomainResult<Vec<ProjectCategory>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(CATEGORIES_BY_COMPANY_SQL, &[&company], |row| {
                    Ok(ProjectCategory {
                        id: uuid_at(row, 0)?,
                        company_id: uuid_at(row, 1)?,
                        name: row.get(2)?,
                    })
                })
                .map_err(map_storage_error)
            })
            .await
    }

    async fn list_time_entries(
        &self,
        company_id: CompanyId,
        range: MonthRange,
    ) -> DomainResult<Vec<TimeEntry>> {
        let company = company_id.to_string();
        let (start, end) = (millis(range.start), millis(range.end));
        self.db
            .run_blocking(move |conn| {
                conn.query_map(TIME_ENTRIES_IN_RANGE_SQL, &[&company, &start, &end], map_entry_row)
                    .map_err(map_storage_error)
            })
            .await
    }

    async fn list_revenues(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<ProjectMonthlyRevenue>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(
                    REVENUES_BY_PERIOD_SQL,
                    &[&company, &period.year, &period.month],
                    |row| {
                        Ok(ProjectMonthlyRevenue {
                            project_id: uuid_at(row, 0)?,
                            period: period_at(row, 1)?,
                            estimated_revenue: opt_decimal_at(row, 3)?,
                            actual_revenue: opt_decimal_at(row, 4)?,
                        })
                    },
                )
                .map_err(map_storage_error)
            })
            .await
    }
}

const USERS_BY_COMPANY_SQL: &str = "SELECT id, company_id, name, relation, salary, hourly_cost,
        is_active, deleted_at
    FROM users
    WHERE company_id = ?1
    ORDER BY name, id";

const USER_BY_ID_SQL: &str = "SELECT id, company_id, name, relation, salary, hourly_cost,
        is_active, deleted_at
    FROM users
    WHERE company_id = ?1 AND id = ?2";

const PROJECTS_BY_COMPANY_SQL: &str = "SELECT id, company_id, name, category_id, is_active
    FROM projects
    WHERE company_id = ?1 AND deleted_at IS NULL
    ORDER BY name, id";

const CATEGORIES_BY_COMPANY_SQL: &str = "SELECT id, company_id, name
    FROM project_categories
    WHERE company_id = ?1
    ORDER BY name";

const TIME_ENTRIES_IN_RANGE_SQL: &str = "SELECT id, company_id, user_id, project_id, kind,
        started_at, duration_minutes
    FROM time_entries
    WHERE company_id = ?1 AND started_at >= ?2 AND started_at < ?3
    ORDER BY started_at";

const REVENUES_BY_PERIOD_SQL: &str = "SELECT r.project_id, r.year, r.month, r.estimated_revenue,
        r.actual_revenue
    FROM project_monthly_revenues r
    JOIN projects p ON p.id = r.project_id
    WHERE p.company_id = ?1 AND r.year = ?2 AND r.month = ?3";

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        relation: enum_at(row, 3)?,
        salary: opt_decimal_at(row, 4)?,
        hourly_cost: opt_decimal_at(row, 5)?,
        is_active: int_to_bool(row.get(6)?),
        deleted_at: opt_instant_at(row, 7)?,
    })
}

fn map_project_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        name: row.get(2)?,
        category_id: opt_uuid_at(row, 3)?,
        is_active: int_to_bool(row.get(4)?),
    })
}

fn map_entry_row(row: &Row<'_>) -> rusqlite::Result<TimeEntry> {
    Ok(TimeEntry {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        project_id: opt_uuid_at(row, 3)?,
        kind: enum_at(row, 4)?,
        started_at: instant_at(row, 5)?,
        duration_minutes: row.get(6)?,
    })
}
