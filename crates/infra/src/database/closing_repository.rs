//! SQLite-backed implementation of the `ClosingRepository` port.
//!
//! A close commit runs inside a single `BEGIN IMMEDIATE` transaction: the
//! write lock is taken before the version and the inputs stamp are re-read,
//! so a concurrent writer either finishes first (and the commit fails with
//! `Conflict`) or waits until the commit is durable.

use std::sync::Arc;

use async_trait::async_trait;
use costclose_core::ClosingRepository;
use costclose_domain::{
    money::round_money, CloseCommit, ClosingStatus, CompanyId, CostCloseError, InputsStamp,
    MonthlyClosing, Period, ProjectMonthlyDistribution, ReopenRecord, Result as DomainResult,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::columns::{
    decimal_at, enum_at, instant_at, millis, money_text, opt_decimal_at, opt_instant_at,
    opt_uuid_at, period_at, uuid_at,
};
use super::manager::DbManager;
use crate::errors::{map_sql_error, map_storage_error};

/// Closings and their distributions, committed in one transaction.
pub struct SqliteClosingRepository {
    db: Arc<DbManager>,
}

impl SqliteClosingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClosingRepository for SqliteClosingRepository {
    async fn find(&self, company_id: CompanyId, period: Period) -> DomainResult<Option<MonthlyClosing>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| select_closing(conn, &company, period).map_err(map_sql_error))
            .await
    }

    async fn list_distributions(
        &self,
        closing_id: Uuid,
    ) -> DomainResult<Vec<ProjectMonthlyDistribution>> {
        let closing = closing_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(DISTRIBUTIONS_BY_CLOSING_SQL, &[&closing], map_distribution_row)
                    .map_err(map_storage_error)
            })
            .await
    }

    async fn commit_close(&self, commit: CloseCommit) -> DomainResult<MonthlyClosing> {
        self.db
            .run_blocking(move |conn| {
                let company = commit.company_id.to_string();
                let period = commit.period;
                let tx = conn.immediate_transaction().map_err(map_storage_error)?;

                let current = tx
                    .query_row(
                        CLOSING_VERSION_SQL,
                        params![company, period.year, period.month],
                        |row| Ok((uuid_at(row, 0)?, row.get::<_, i64>(1)?)),
                    )
                    .optional()
                    .map_err(map_sql_error)?;
                if current.map(|(_, version)| version) != commit.expected_version {
                    return Err(CostCloseError::Conflict(format!(
                        "closing {period} changed concurrently"
                    )));
                }
                if !stamp_matches(&tx, &company, period, &commit.stamp)? {
                    return Err(CostCloseError::Conflict(format!(
                        "inputs of {period} changed since the preview"
                    )));
                }

                for snapshot in &commit.salary_snapshots {
                    tx.execute(
                        SNAPSHOT_UPSERT_SQL,
                        params![
                            Uuid::now_v7().to_string(),
                            company,
                            snapshot.user_id.to_string(),
                            period.year,
                            period.month,
                            money_text(snapshot.base_salary),
                            millis(commit.closed_at),
                        ],
                    )
                    .map_err(map_sql_error)?;
                }

                let totals = &commit.totals;
                let closing_id = match current {
                    Some((id, version)) => {
                        tx.execute(
                            CLOSING_CLOSE_UPDATE_SQL,
                            params![
                                id.to_string(),
                                ClosingStatus::Closed.to_string(),
                                money_text(totals.total_salaries),
                                money_text(totals.total_overhead),
                                money_text(totals.total_non_productive),
                                money_text(totals.total_revenue),
                                commit.closed_by.to_string(),
                                millis(commit.closed_at),
                                version + 1,
                            ],
                        )
                        .map_err(map_sql_error)?;
                        id
                    }
                    None => {
                        let id = Uuid::now_v7();
                        tx.execute(
                            CLOSING_INSERT_SQL,
                            params![
                                id.to_string(),
                                company,
                                period.year,
                                period.month,
                                ClosingStatus::Closed.to_string(),
                                money_text(totals.total_salaries),
                                money_text(totals.total_overhead),
                                money_text(totals.total_non_productive),
                                money_text(totals.total_revenue),
                                commit.closed_by.to_string(),
                                millis(commit.closed_at),
                            ],
                        )
                        .map_err(map_sql_error)?;
                        id
                    }
                };

                tx.execute(
                    "DELETE FROM project_monthly_distributions WHERE closing_id = ?1",
                    params![closing_id.to_string()],
                )
                .map_err(map_sql_error)?;
                for line in &commit.distributions {
                    tx.execute(
                        DISTRIBUTION_INSERT_SQL,
                        params![
                            Uuid::now_v7().to_string(),
                            closing_id.to_string(),
                            line.project_id.to_string(),
                            money_text(line.project_revenue),
                            money_text(line.revenue_share_percent),
                            money_text(line.distributed_salaries),
                            money_text(line.distributed_overhead),
                            money_text(line.distributed_non_productive),
                            money_text(line.total_distributed),
                        ],
                    )
                    .map_err(map_sql_error)?;
                }

                let closing = select_closing(&tx, &company, period)
                    .map_err(map_sql_error)?
                    .ok_or_else(|| {
                        CostCloseError::Internal(format!("closing {period} vanished during commit"))
                    })?;
                tx.commit().map_err(map_sql_error)?;

                info!(
                    %period,
                    version = closing.version,
                    distributions = commit.distributions.len(),
                    "month closed"
                );
                Ok(closing)
            })
            .await
    }

    async fn reopen(&self, record: ReopenRecord) -> DomainResult<MonthlyClosing> {
        self.db
            .run_blocking(move |conn| {
                let company = record.company_id.to_string();
                let period = record.period;
                let tx = conn.immediate_transaction().map_err(map_storage_error)?;

                let closing = select_closing(&tx, &company, period)
                    .map_err(map_sql_error)?
                    .ok_or_else(|| CostCloseError::NotFound(format!("no closing for {period}")))?;
                if closing.version != record.expected_version {
                    return Err(CostCloseError::Conflict(format!(
                        "closing {period} changed concurrently"
                    )));
                }

                tx.execute(
                    CLOSING_REOPEN_SQL,
                    params![
                        closing.id.to_string(),
                        ClosingStatus::Reopened.to_string(),
                        record.reopened_by.to_string(),
                        millis(record.reopened_at),
                        record.reason,
                        closing.version + 1,
                    ],
                )
                .map_err(map_sql_error)?;

                let reopened = select_closing(&tx, &company, period)
                    .map_err(map_sql_error)?
                    .ok_or_else(|| {
                        CostCloseError::Internal(format!("closing {period} vanished during reopen"))
                    })?;
                tx.commit().map_err(map_sql_error)?;

                debug!(%period, version = reopened.version, "closing row reopened");
                Ok(reopened)
            })
            .await
    }
}

fn select_closing(
    conn: &Connection,
    company: &str,
    period: Period,
) -> rusqlite::Result<Option<MonthlyClosing>> {
    conn.query_row(
        CLOSING_BY_PERIOD_SQL,
        params![company, period.year, period.month],
        map_closing_row,
    )
    .optional()
}

/// Re-read every input captured in `stamp` and compare.
fn stamp_matches(
    conn: &Connection,
    company: &str,
    period: Period,
    stamp: &InputsStamp,
) -> DomainResult<bool> {
    for revenue in &stamp.revenues {
        let current = conn
            .query_row(
                REVENUE_STAMP_SQL,
                params![revenue.project_id.to_string(), period.year, period.month],
                |row| opt_decimal_at(row, 0),
            )
            .optional()
            .map_err(map_sql_error)?
            .flatten();
        if current != revenue.actual_revenue {
            debug!(project_id = %revenue.project_id, "revenue changed since preview");
            return Ok(false);
        }
    }

    let mut stmt = conn.prepare(OVERHEAD_AMOUNTS_SQL).map_err(map_sql_error)?;
    let amounts = stmt
        .query_map(params![company, period.year, period.month], |row| decimal_at(row, 0))
        .map_err(map_sql_error)?
        .collect::<rusqlite::Result<Vec<Decimal>>>()
        .map_err(map_sql_error)?;
    if round_money(amounts.into_iter().sum()) != stamp.overhead_total {
        debug!("overhead total changed since preview");
        return Ok(false);
    }

    for salary in &stamp.salaries {
        let user = salary.user_id.to_string();
        let base = conn
            .query_row(USER_SALARY_SQL, params![user], |row| opt_decimal_at(row, 0))
            .optional()
            .map_err(map_sql_error)?
            .flatten();
        let extras = conn
            .query_row(
                SALARY_EXTRAS_SQL,
                params![company, user, period.year, period.month],
                |row| decimal_at(row, 0),
            )
            .optional()
            .map_err(map_sql_error)?
            .unwrap_or_default();
        if base != salary.base_salary || extras != salary.extras {
            debug!(user_id = %salary.user_id, "salary changed since preview");
            return Ok(false);
        }
    }

    Ok(true)
}

const CLOSING_BY_PERIOD_SQL: &str = "SELECT id, company_id, year, month, status, total_salaries,
        total_overhead, total_non_productive, total_revenue, closed_by, closed_at,
        reopened_by, reopened_at, reopen_reason, version, updated_at
    FROM monthly_closings
    WHERE company_id = ?1 AND year = ?2 AND month = ?3";

const CLOSING_VERSION_SQL: &str = "SELECT id, version FROM monthly_closings
    WHERE company_id = ?1 AND year = ?2 AND month = ?3";

const CLOSING_INSERT_SQL: &str = "INSERT INTO monthly_closings (
        id, company_id, year, month, status, total_salaries, total_overhead,
        total_non_productive, total_revenue, closed_by, closed_at, version, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?11)";

const CLOSING_CLOSE_UPDATE_SQL: &str = "UPDATE monthly_closings
    SET status = ?2, total_salaries = ?3, total_overhead = ?4, total_non_productive = ?5,
        total_revenue = ?6, closed_by = ?7, closed_at = ?8, reopened_by = NULL,
        reopened_at = NULL, reopen_reason = NULL, version = ?9, updated_at = ?8
    WHERE id = ?1";

const CLOSING_REOPEN_SQL: &str = "UPDATE monthly_closings
    SET status = ?2, reopened_by = ?3, reopened_at = ?4, reopen_reason = ?5, version = ?6,
        updated_at = ?4
    WHERE id = ?1";

const SNAPSHOT_UPSERT_SQL: &str = "INSERT INTO monthly_user_salaries (
        id, company_id, user_id, year, month, extras, base_salary_snapshot, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, '0', ?6, ?7)
    ON CONFLICT (company_id, user_id, year, month)
    DO UPDATE SET base_salary_snapshot = excluded.base_salary_snapshot";

const DISTRIBUTION_INSERT_SQL: &str = "INSERT INTO project_monthly_distributions (
        id, closing_id, project_id, project_revenue, revenue_share_percent,
        distributed_salaries, distributed_overhead, distributed_non_productive, total_distributed
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const DISTRIBUTIONS_BY_CLOSING_SQL: &str = "SELECT d.id, d.closing_id, d.project_id, p.name,
        d.project_revenue, d.revenue_share_percent, d.distributed_salaries,
        d.distributed_overhead, d.distributed_non_productive, d.total_distributed
    FROM project_monthly_distributions d
    JOIN projects p ON p.id = d.project_id
    WHERE d.closing_id = ?1
    ORDER BY p.name, p.id";

const REVENUE_STAMP_SQL: &str = "SELECT actual_revenue FROM project_monthly_revenues
    WHERE project_id = ?1 AND year = ?2 AND month = ?3";

const OVERHEAD_AMOUNTS_SQL: &str = "SELECT amount FROM monthly_overhead_costs
    WHERE company_id = ?1 AND year = ?2 AND month = ?3";

const USER_SALARY_SQL: &str = "SELECT salary FROM users WHERE id = ?1";

const SALARY_EXTRAS_SQL: &str = "SELECT extras FROM monthly_user_salaries
    WHERE company_id = ?1 AND user_id = ?2 AND year = ?3 AND month = ?4";

fn map_closing_row(row: &Row<'_>) -> rusqlite::Result<MonthlyClosing> {
    Ok(MonthlyClosing {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        period: period_at(row, 2)?,
        status: enum_at(row, 4)?,
        total_salaries: opt_decimal_at(row, 5)?,
        total_overhead: opt_decimal_at(row, 6)?,
        total_non_productive: opt_decimal_at(row, 7)?,
        total_revenue: opt_decimal_at(row, 8)?,
        closed_by: opt_uuid_at(row, 9)?,
        closed_at: opt_instant_at(row, 10)?,
        reopened_by: opt_uuid_at(row, 11)?,
        reopened_at: opt_instant_at(row, 12)?,
        reopen_reason: row.get(13)?,
        version: row.get(14)?,
        updated_at: instant_at(row, 15)?,
    })
}

fn map_distribution_row(row: &Row<'_>) -> rusqlite::Result<ProjectMonthlyDistribution> {
    Ok(ProjectMonthlyDistribution {
        id: uuid_at(row, 0)?,
        closing_id: uuid_at(row, 1)?,
        project_id: uuid_at(row, 2)?,
        project_name: row.get(3)?,
        project_revenue: decimal_at(row, 4)?,
        revenue_share_percent: decimal_at(row, 5)?,
        distributed_salaries: decimal_at(row, 6)?,
        distributed_overhead: decimal_at(row, 7)?,
        distributed_non_productive: decimal_at(row, 8)?,
        total_distributed: decimal_at(row, 9)?,
    })
}
