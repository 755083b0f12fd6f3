//! Integration tests for the SQLite repositories.

mod support;

use chrono::{NaiveDate, Utc};
use costclose_core::{ClosingRepository, CostInputsRepository, OverheadRepository, SalaryRepository};
use costclose_domain::{
    CloseCommit, ClosingStatus, ClosingTotals, CostCloseError, DistributionLine, InputsStamp,
    MonthlyOverheadCost, Period, ProjectId, ReopenRecord, RevenueStamp, SalarySnapshot,
    SalaryStamp, UserId,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use support::{at, march, TestDb};

fn line(project_id: ProjectId, name: &str, revenue: Decimal, share: Decimal, salaries: Decimal) -> DistributionLine {
    DistributionLine {
        project_id,
        project_name: name.to_string(),
        project_revenue: revenue,
        revenue_share_percent: share,
        distributed_salaries: salaries,
        distributed_overhead: Decimal::ZERO,
        distributed_non_productive: Decimal::ZERO,
        total_distributed: salaries,
        internal_cost: Decimal::ZERO,
    }
}

/// Two projects (App 3000, Web 1000) and one salaried user.
struct ClosableMonth {
    db: TestDb,
    ana: UserId,
    web: ProjectId,
    app: ProjectId,
}

impl ClosableMonth {
    fn new() -> Self {
        let db = TestDb::new();
        let ana = db.user("Ana", Some(dec!(1000)), None);
        let web = db.project("Web", None);
        let app = db.project("App", None);
        db.revenue(web, march(), dec!(1000));
        db.revenue(app, march(), dec!(3000));
        Self { db, ana, web, app }
    }

    fn stamp(&self, extras: Decimal) -> InputsStamp {
        InputsStamp {
            revenues: vec![
                RevenueStamp { project_id: self.app, actual_revenue: Some(dec!(3000)) },
                RevenueStamp { project_id: self.web, actual_revenue: Some(dec!(1000)) },
            ],
            overhead_total: Decimal::ZERO,
            salaries: vec![SalaryStamp { user_id: self.ana, base_salary: Some(dec!(1000)), extras }],
        }
    }

    fn commit(&self, expected_version: Option<i64>, stamp: InputsStamp) -> CloseCommit {
        CloseCommit {
            company_id: self.db.company,
            period: march(),
            expected_version,
            totals: ClosingTotals {
                total_salaries: dec!(1000),
                total_overhead: Decimal::ZERO,
                total_non_productive: Decimal::ZERO,
                total_revenue: dec!(4000),
            },
            closed_by: self.db.admin,
            closed_at: Utc::now(),
            salary_snapshots: vec![SalarySnapshot { user_id: self.ana, base_salary: dec!(1000) }],
            distributions: vec![
                line(self.app, "App", dec!(3000), dec!(75), dec!(750)),
                line(self.web, "Web", dec!(1000), dec!(25), dec!(250)),
            ],
            stamp,
        }
    }

    fn reopen(&self, expected_version: i64, reason: &str) -> ReopenRecord {
        ReopenRecord {
            company_id: self.db.company,
            period: march(),
            expected_version,
            reopened_by: self.db.admin,
            reopened_at: Utc::now(),
            reason: reason.to_string(),
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn inputs_are_scoped_to_company_and_month() {
    let db = TestDb::new();
    let ana = db.user("Ana", Some(dec!(3000)), Some(dec!(20)));
    let zed = db.user("Zed", None, None);
    db.soft_delete_user(zed);
    let non_productive = db.non_productive_category();
    let web = db.project("Web", None);
    let old = db.project("Old", None);
    db.soft_delete_project(old);
    db.project("Internal", Some(non_productive));

    db.entry(ana, web, at(2025, 2, 28, 23), 15);
    db.entry(ana, web, at(2025, 3, 1, 0), 60);
    db.entry(ana, web, at(2025, 3, 31, 23), 30);
    db.entry(ana, web, at(2025, 4, 1, 0), 45);
    db.revenue(web, march(), dec!(1000));
    db.revenue(web, Period::new(2025, 4).unwrap(), dec!(5));

    let other = TestDb::new();
    other.user("Ana", Some(dec!(1)), None);

    let repos = db.repositories();

    let users = repos.inputs.list_users(db.company).await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Admin", "Ana", "Zed"]);
    assert_eq!(users[1].salary, Some(dec!(3000)));
    assert_eq!(users[1].hourly_cost, Some(dec!(20)));
    assert!(users[2].deleted_at.is_some());

    let projects = repos.inputs.list_projects(db.company).await.unwrap();
    let names: Vec<&str> = projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Internal", "Web"]);

    let categories = repos.inputs.list_categories(db.company).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert!(categories[0].is_non_productive());

    let entries = repos.inputs.list_time_entries(db.company, march().range()).await.unwrap();
    assert_eq!(entries.iter().map(|e| e.duration_minutes).sum::<i64>(), 90);

    let revenues = repos.inputs.list_revenues(db.company, march()).await.unwrap();
    assert_eq!(revenues.len(), 1);
    assert_eq!(revenues[0].actual_revenue, Some(dec!(1000)));

    assert!(repos.inputs.find_user(other.company, ana).await.unwrap().is_none());
    assert!(repos.inputs.find_user(db.company, ana).await.unwrap().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn salary_extras_upsert_keeps_one_row_per_month() {
    let db = TestDb::new();
    let ana = db.user("Ana", Some(dec!(1000)), None);
    let repos = db.repositories();

    let first = repos.salaries.upsert_extras(db.company, ana, march(), dec!(100)).await.unwrap();
    let second = repos.salaries.upsert_extras(db.company, ana, march(), dec!(150.50)).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.extras, dec!(150.50));
    assert_eq!(second.base_salary_snapshot, None);

    assert_eq!(repos.salaries.list_for_period(db.company, march()).await.unwrap().len(), 1);
    let april = Period::new(2025, 4).unwrap();
    assert!(repos.salaries.list_for_period(db.company, april).await.unwrap().is_empty());

    assert!(repos.salaries.find_by_id(Uuid::new_v4(), first.id).await.unwrap().is_none());
    assert!(repos.salaries.delete(db.company, first.id).await.unwrap());
    assert!(!repos.salaries.delete(db.company, first.id).await.unwrap());
    assert_eq!(db.count("monthly_user_salaries"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn overhead_items_can_move_between_months() {
    let db = TestDb::new();
    let repos = db.repositories();
    let item = MonthlyOverheadCost {
        id: Uuid::now_v7(),
        company_id: db.company,
        period: march(),
        concept: "Rent".into(),
        amount: dec!(1200.00),
        date: NaiveDate::from_ymd_opt(2025, 3, 5),
        created_by: db.admin,
        updated_at: Utc::now(),
    };
    repos.overhead.insert(item.clone()).await.unwrap();

    let listed = repos.overhead.list_for_period(db.company, march()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].concept, "Rent");
    assert_eq!(listed[0].date, item.date);

    let april = Period::new(2025, 4).unwrap();
    let moved = MonthlyOverheadCost {
        period: april,
        date: NaiveDate::from_ymd_opt(2025, 4, 2),
        amount: dec!(1300),
        ..item.clone()
    };
    repos.overhead.update(moved).await.unwrap();
    assert!(repos.overhead.list_for_period(db.company, march()).await.unwrap().is_empty());
    let found = repos.overhead.find_by_id(db.company, item.id).await.unwrap().unwrap();
    assert_eq!(found.period, april);
    assert_eq!(found.amount, dec!(1300));
    assert_eq!(found.created_by, db.admin);

    let ghost = MonthlyOverheadCost { id: Uuid::now_v7(), ..item.clone() };
    assert!(matches!(repos.overhead.update(ghost).await, Err(CostCloseError::NotFound(_))));

    assert!(repos.overhead.delete(db.company, item.id).await.unwrap());
    assert!(!repos.overhead.delete(db.company, item.id).await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn close_reopen_and_reclose_bump_the_version() {
    let month = ClosableMonth::new();
    let repos = month.db.repositories();

    let closed = repos.closings.commit_close(month.commit(None, month.stamp(Decimal::ZERO))).await.unwrap();
    assert_eq!(closed.status, ClosingStatus::Closed);
    assert_eq!(closed.version, 1);
    assert_eq!(closed.total_revenue, Some(dec!(4000)));
    assert_eq!(closed.closed_by, Some(month.db.admin));

    let rows = repos.closings.list_distributions(closed.id).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.project_name.as_str()).collect();
    assert_eq!(names, vec!["App", "Web"]);
    assert_eq!(rows[0].distributed_salaries, dec!(750));
    assert_eq!(rows[1].revenue_share_percent, dec!(25));

    let snapshots = repos.salaries.list_for_period(month.db.company, march()).await.unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].base_salary_snapshot, Some(dec!(1000)));
    assert_eq!(snapshots[0].extras, Decimal::ZERO);

    let reopened = repos.closings.reopen(month.reopen(1, "late invoice")).await.unwrap();
    assert_eq!(reopened.status, ClosingStatus::Reopened);
    assert_eq!(reopened.version, 2);
    assert_eq!(reopened.reopen_reason.as_deref(), Some("late invoice"));
    assert!(matches!(
        repos.closings.reopen(month.reopen(1, "again")).await,
        Err(CostCloseError::Conflict(_))
    ));

    let reclosed =
        repos.closings.commit_close(month.commit(Some(2), month.stamp(Decimal::ZERO))).await.unwrap();
    assert_eq!(reclosed.id, closed.id);
    assert_eq!(reclosed.version, 3);
    assert_eq!(reclosed.status, ClosingStatus::Closed);
    assert_eq!(reclosed.reopened_by, None);
    assert_eq!(reclosed.reopened_at, None);
    assert_eq!(reclosed.reopen_reason, None);
    assert_eq!(month.db.count("project_monthly_distributions"), 2);
    assert_eq!(month.db.count("monthly_user_salaries"), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_keeps_existing_extras() {
    let month = ClosableMonth::new();
    let repos = month.db.repositories();
    repos.salaries.upsert_extras(month.db.company, month.ana, march(), dec!(200)).await.unwrap();

    repos.closings.commit_close(month.commit(None, month.stamp(dec!(200)))).await.unwrap();

    let rows = repos.salaries.list_for_period(month.db.company, march()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].extras, dec!(200));
    assert_eq!(rows[0].base_salary_snapshot, Some(dec!(1000)));
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_version_is_rejected_without_writes() {
    let month = ClosableMonth::new();
    let repos = month.db.repositories();
    repos.closings.commit_close(month.commit(None, month.stamp(Decimal::ZERO))).await.unwrap();

    let err = repos.closings.commit_close(month.commit(None, month.stamp(Decimal::ZERO))).await;
    assert!(matches!(err, Err(CostCloseError::Conflict(_))));

    let closing = repos.closings.find(month.db.company, march()).await.unwrap().unwrap();
    assert_eq!(closing.version, 1);
    assert_eq!(month.db.count("project_monthly_distributions"), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn changed_inputs_abort_the_commit() {
    let month = ClosableMonth::new();
    let repos = month.db.repositories();
    let stamp = month.stamp(Decimal::ZERO);

    month.db.revenue(month.web, march(), dec!(1200));
    let err = repos.closings.commit_close(month.commit(None, stamp.clone())).await;
    assert!(matches!(err, Err(CostCloseError::Conflict(_))));
    assert!(repos.closings.find(month.db.company, march()).await.unwrap().is_none());
    assert_eq!(month.db.count("monthly_user_salaries"), 0);

    month.db.revenue(month.web, march(), dec!(1000));
    month.db.set_salary(month.ana, dec!(1100));
    let err = repos.closings.commit_close(month.commit(None, stamp.clone())).await;
    assert!(matches!(err, Err(CostCloseError::Conflict(_))));

    month.db.set_salary(month.ana, dec!(1000));
    repos
        .overhead
        .insert(MonthlyOverheadCost {
            id: Uuid::now_v7(),
            company_id: month.db.company,
            period: march(),
            concept: "Rent".into(),
            amount: dec!(10),
            date: None,
            created_by: month.db.admin,
            updated_at: Utc::now(),
        })
        .await
        .unwrap();
    let err = repos.closings.commit_close(month.commit(None, stamp)).await;
    assert!(matches!(err, Err(CostCloseError::Conflict(_))));
    assert_eq!(month.db.count("monthly_closings"), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn reopen_of_unknown_month_is_not_found() {
    let month = ClosableMonth::new();
    let repos = month.db.repositories();
    assert!(matches!(
        repos.closings.reopen(month.reopen(1, "why")).await,
        Err(CostCloseError::NotFound(_))
    ));
}
