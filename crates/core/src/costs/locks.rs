//! Per-period mutual exclusion inside one process.
//!
//! Close, reopen and the salary/overhead mutations of the same company
//! month run one at a time. Cross-process races are caught later by the
//! version and inputs checks of the commit.

use std::sync::Arc;

use costclose_domain::{CompanyId, Period};
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// One company month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey {
    pub company_id: CompanyId,
    pub period: Period,
}

type Registry = DashMap<PeriodKey, Arc<Mutex<()>>>;

/// Registry of per-(company, month) async mutexes. Entries live only while
/// a guard holds them or a task waits on them.
#[derive(Debug, Default)]
pub struct PeriodLocks {
    locks: Arc<Registry>,
}

/// Held lock on one company month. Released on drop.
#[derive(Debug)]
pub struct PeriodGuard {
    key: PeriodKey,
    registry: Arc<Registry>,
    guard: OwnedMutexGuard<()>,
}

impl PeriodGuard {
    /// Company the locked month belongs to.
    pub fn company_id(&self) -> CompanyId {
        self.key.company_id
    }

    /// The locked month.
    pub fn period(&self) -> Period {
        self.key.period
    }
}

impl Drop for PeriodGuard {
    fn drop(&mut self) {
        // The map and this guard hold the only references: nobody waits.
        let mutex = OwnedMutexGuard::mutex(&self.guard);
        let evicted = self
            .registry
            .remove_if(&self.key, |_, entry| {
                Arc::ptr_eq(entry, mutex) && Arc::strong_count(entry) == 2
            })
            .is_some();
        trace!(
            company_id = %self.key.company_id,
            period = %self.key.period,
            evicted,
            "period lock released"
        );
    }
}

impl PeriodLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one company month.
    pub async fn lock(&self, company_id: CompanyId, period: Period) -> PeriodGuard {
        let key = PeriodKey { company_id, period };
        let mutex = self.locks.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let guard = mutex.lock_owned().await;
        trace!(%company_id, %period, "period lock acquired");
        PeriodGuard { key, registry: Arc::clone(&self.locks), guard }
    }

    /// Lock two months of the same company in a fixed order. Returns a
    /// single guard when both are the same month.
    pub async fn lock_pair(
        &self,
        company_id: CompanyId,
        first: Period,
        second: Period,
    ) -> Vec<PeriodGuard> {
        if first == second {
            return vec![self.lock(company_id, first).await];
        }
        let (low, high) = if first < second { (first, second) } else { (second, first) };
        let low_guard = self.lock(company_id, low).await;
        let high_guard = self.lock(company_id, high).await;
        vec![low_guard, high_guard]
    }

    /// Number of months currently held or awaited.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
