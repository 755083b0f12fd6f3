//! Application context - dependency injection container

use std::sync::Arc;

use costclose_core::{
    ClosingService, InternalCostService, MonthlySalaryService, OverheadService, PeriodLocks,
};
use costclose_domain::{Config, Result};
use costclose_infra::{
    DbManager, SqliteClosingRepository, SqliteCostInputsRepository, SqliteOverheadRepository,
    SqliteSalaryRepository,
};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthReport};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub closing: Arc<ClosingService>,
    pub salaries: MonthlySalaryService,
    pub overhead: OverheadService,
    pub internal_costs: InternalCostService,
}

impl AppContext {
    /// Open the configured database, apply the schema and wire the services.
    ///
    /// # Errors
    /// Fails when the pool cannot be created or migrations fail.
    pub fn new_with_config(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;
        info!(db_path = %db.path().display(), "database ready");
        Ok(Self::from_db(config, db))
    }

    /// Wire the services over an already migrated database.
    pub fn from_db(config: Config, db: Arc<DbManager>) -> Self {
        let inputs = Arc::new(SqliteCostInputsRepository::new(Arc::clone(&db)));
        let salary_repo = Arc::new(SqliteSalaryRepository::new(Arc::clone(&db)));
        let overhead_repo = Arc::new(SqliteOverheadRepository::new(Arc::clone(&db)));
        let closings = Arc::new(SqliteClosingRepository::new(Arc::clone(&db)));
        // Shared by every service that mutates a month.
        let locks = Arc::new(PeriodLocks::new());

        let closing = Arc::new(ClosingService::new(
            inputs.clone(),
            salary_repo.clone(),
            overhead_repo.clone(),
            closings,
            locks.clone(),
        ));
        let salaries =
            MonthlySalaryService::new(inputs.clone(), salary_repo, closing.clone(), locks.clone());
        let overhead = OverheadService::new(overhead_repo, closing.clone(), locks);
        let internal_costs = InternalCostService::new(inputs);

        Self { config, db, closing, salaries, overhead, internal_costs }
    }

    /// Probe the database pool.
    pub fn health_check(&self) -> HealthReport {
        let pool = self.db.health_check();
        let database = if pool.healthy {
            ComponentHealth::healthy("database")
        } else {
            ComponentHealth::unhealthy(
                "database",
                pool.message.unwrap_or_else(|| "database unavailable".to_string()),
            )
        };
        HealthReport::from_database(
            database.with_connections(pool.active_connections, pool.max_connections),
        )
    }
}
