//! SQLite-backed implementation of the `OverheadRepository` port.

use std::sync::Arc;

use async_trait::async_trait;
use costclose_core::OverheadRepository;
use costclose_domain::{CompanyId, CostCloseError, MonthlyOverheadCost, Period, Result as DomainResult};
use rusqlite::{params, Row};
use tracing::debug;
use uuid::Uuid;

use super::columns::{decimal_at, instant_at, millis, money_text, opt_date_at, period_at, uuid_at};
use super::manager::DbManager;
use crate::errors::{map_sql_error, map_storage_error};

/// Monthly overhead line items.
pub struct SqliteOverheadRepository {
    db: Arc<DbManager>,
}

impl SqliteOverheadRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OverheadRepository for SqliteOverheadRepository {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<MonthlyOverheadCost>> {
        let company = company_id.to_string();
        self.db
            .run_blocking(move |conn| {
                conn.query_map(
                    OVERHEAD_BY_PERIOD_SQL,
                    &[&company, &period.year, &period.month],
                    map_overhead_row,
                )
                .map_err(map_storage_error)
            })
            .await
    }

    async fn find_by_id(
        &self,
        company_id: CompanyId,
        id: Uuid,
    ) -> DomainResult<Option<MonthlyOverheadCost>> {
        let (company, id) = (company_id.to_string(), id.to_string());
        self.db
            .run_blocking(move |conn| {
                conn.query_row_optional(OVERHEAD_BY_ID_SQL, &[&company, &id], map_overhead_row)
                    .map_err(map_storage_error)
            })
            .await
    }

    async fn insert(&self, item: MonthlyOverheadCost) -> DomainResult<()> {
        self.db
            .run_blocking(move |conn| {
                conn.execute(
                    OVERHEAD_INSERT_SQL,
                    params![
                        item.id.to_string(),
                        item.company_id.to_string(),
                        item.period.year,
                        item.period.month,
                        item.concept,
                        money_text(item.amount),
                        item.date.map(|d| d.to_string()),
                        item.created_by.to_string(),
                        millis(item.updated_at),
                    ],
                )
                .map_err(map_sql_error)?;
                debug!(overhead_id = %item.id, period = %item.period, "overhead item inserted");
                Ok(())
            })
            .await
    }

    async fn update(&self, item: MonthlyOverheadCost) -> DomainResult<()> {
        self.db
            .run_blocking(move |conn| {
                let changed = conn
                    .execute(
                        OVERHEAD_UPDATE_SQL,
                        params![
                            item.id.to_string(),
                            item.company_id.to_string(),
                            item.period.year,
                            item.period.month,
                            item.concept,
                            money_text(item.amount),
                            item.date.map(|d| d.to_string()),
                            millis(item.updated_at),
                        ],
                    )
                    .map_err(map_sql_error)?;
                if changed == 0 {
                    return Err(CostCloseError::NotFound(format!("overhead item {}", item.id)));
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, company_id: CompanyId, id: Uuid) -> DomainResult<bool> {
        let (company, id) = (company_id.to_string(), id.to_string());
        self.db
            .run_blocking(move |conn| {
                let removed = conn
                    .execute(
                        "DELETE FROM monthly_overhead_costs WHERE company_id = ?1 AND id = ?2",
                        params![company, id],
                    )
                    .map_err(map_sql_error)?;
                Ok(removed > 0)
            })
            .await
    }
}

const OVERHEAD_BY_PERIOD_SQL: &str = "SELECT id, company_id, year, month, concept, amount, date,
        created_by, updated_at
    FROM monthly_overhead_costs
    WHERE company_id = ?1 AND year = ?2 AND month = ?3
    ORDER BY date IS NULL, date, concept, id";

const OVERHEAD_BY_ID_SQL: &str = "SELECT id, company_id, year, month, concept, amount, date,
        created_by, updated_at
    FROM monthly_overhead_costs
    WHERE company_id = ?1 AND id = ?2";

const OVERHEAD_INSERT_SQL: &str = "INSERT INTO monthly_overhead_costs (
        id, company_id, year, month, concept, amount, date, created_by, updated_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

// created_by is fixed at insert time.
const OVERHEAD_UPDATE_SQL: &str = "UPDATE monthly_overhead_costs
    SET year = ?3, month = ?4, concept = ?5, amount = ?6, date = ?7, updated_at = ?8
    WHERE id = ?1 AND company_id = ?2";

fn map_overhead_row(row: &Row<'_>) -> rusqlite::Result<MonthlyOverheadCost> {
    Ok(MonthlyOverheadCost {
        id: uuid_at(row, 0)?,
        company_id: uuid_at(row, 1)?,
        period: period_at(row, 2)?,
        concept: row.get(4)?,
        amount: decimal_at(row, 5)?,
        date: opt_date_at(row, 6)?,
        created_by: uuid_at(row, 7)?,
        updated_at: instant_at(row, 8)?,
    })
}
