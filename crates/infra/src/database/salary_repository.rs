//! SQLite-backed implementation of the `SalaryRepository` port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use costclose_core::SalaryRepository;
use costclose_domain::{
    CompanyId, CostCloseError, MonthlyUserSalary, Period, Result as DomainResult, UserId,
};
use rust_decimal::Decimal;
use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use super::columns::{decimal_at, instant_at, millis, money_text, opt_decimal_at, period_at, uuid_at};
use super::manager::DbManager;
use crate::errors::{map_sql_error, map_storage_error};

/// Monthly salary extras.
pub struct SqliteSalaryRepository {
    db: Arc<DbManager>,
}

impl SqliteSalaryRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalaryRepository for SqliteSalaryRepository {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<MonthlyUserSalary>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(
                    SALARIES_BY_PERIOD_SQL,
                    &[&company, &period.year, &period.month],
                    map_salary_row,
                )
                .map_err(map_storage_error)
            })
            .await
    }

    async fn find_by_id(
        &self,
        company_id: CompanyId,
        id: Uuid,
    ) -> DomainResult<Option<MonthlyUserSalary>> {
        let (company, id) = (company_id.to_string(), id.to_string());
        self.db
            .run_blocking(move |conn| {
                conn.query_row_optional(SALARY_BY_ID_SQL, &[&company, &id], map_salary_row)
                    .map_err(map_storage_error)
            })
            .await
    }

    async fn upsert_extras(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        period: Period,
        extras: Decimal,
    ) -> DomainResult<MonthlyUserSalary> {
        self.db
            .run_blocking(move |conn| {
                let (company, user) = (company_id.to_string(), user_id.to_string());
                conn.execute(
                    SALARY_UPSERT_SQL,
                    params![
                        Uuid::now_v7().to_string(),
                        company,
                        user,
                        period.year,
                        period.month,
                        money_text(extras),
                        millis(Utc::now()),
                    ],
                )
                .map_err(map_sql_error)?;

                debug!(%user_id, %period, "salary extras upserted");
                conn.query_row_optional(
                    SALARY_BY_USER_PERIOD_SQL,
                    &[&company, &user, &period.year, &period.month],
                    map_salary_row,
                )
                .map_err(map_storage_error)?
                .ok_or_else(|| {
                    CostCloseError::Internal(format!("salary row for {user_id} vanished after upsert"))
                })
            })
            .await
    }

    async fn delete(&self, company_id: CompanyId, id: Uuid) -> DomainResult<bool> {
        let (company, id) = (company_id.to_string(), id.to_string());
        self.db
            .run_blocking(move |conn| {
                let removed = conn
                    .execute(
                        "DELETE FROM monthly_user_salaries WHERE company_id = ?1 AND id = ?2",
                        params![company, id],
                    )
                    .map_err(map_sql_error)?;
                Ok(removed > 0)
            })
            .await
    }
}

const SALARIES_BY_PERIOD_SQL: &str = "SELECT id, company_id, user_id, year, month, extras,
        base_salary_snapshot, updated_at
    FROM monthly_user_salaries
    WHERE company_id = ?1 AND year = ?2 AND month = ?3";

const SALARY_BY_ID_SQL: &str = "SELECT id, company_id, user_id, year, month, extras,
        base_salary_snapshot, updated_at
    FROM monthly_user_salaries
    WHERE company_id = ?1 AND id = ?2";

const SALARY_BY_USER_PERIOD_SQL: &str = "SELECT id, company_id, user_id, year, month, extras,
        base_salary_snapshot, updated_at
    FROM monthly_user_salaries
    WHERE company_id = ?1 AND user_id = ?2 AND year = ?3 AND month = ?4";

// The snapshot column is owned by the close commit and left untouched here.
const SALARY_UPSERT_SQL: &str = "INSERT INTO monthly_user_salaries (
        id, company_id, user_id, year, month, extras, base_salary_snapshot, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7)
    ON CONFLICT (company_id, user_id, year, month)
    DO UPDATE SET extras = excluded.extras, updated_at = excluded.updated_at";

pub(crate) fn map_salary_row(row: &Row<'_>) -> rusqlite::Result<MonthlyUserSalary> {
    Ok(MonthlyUserSalary {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        period: period_at(row, 3)?,
        extras: decimal_at(row, 5)?,
        base_salary_snapshot: opt_decimal_at(row, 6)?,
        updated_at: instant_at(row, 7)?,
    })
}
