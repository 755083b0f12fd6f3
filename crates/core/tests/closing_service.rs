//! Closing lifecycle against the in-memory store.

mod support;

use std::collections::HashSet;

use costclose_domain::constants::{OVERHEAD_CHANGED_REOPEN_REASON, REOPENED_WARNING};
use costclose_domain::{
    Actor, ClosingStatus, CostCloseError, NewOverheadCost, Period, ProjectMonthlyDistribution,
    ProjectScope, ValidationErrorCode,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::{march, Company};

/// Ana: 2000, 75h on Web and 25h on App. Bruno: 1000, no hours.
fn standard_company() -> (Company, uuid::Uuid, uuid::Uuid) {
    let company = Company::new();
    let ana = company.user("Ana", Some(dec!(2000)), Some(dec!(15)));
    company.user("Bruno", Some(dec!(1000)), None);
    let web = company.project("Web", None);
    let app = company.project("App", None);
    company.revenue(web, march(), dec!(3000));
    company.revenue(app, march(), dec!(1000));
    company.hours(ana, web, march(), 75);
    company.hours(ana, app, march(), 25);
    (company, web, app)
}

fn comparable(rows: &[ProjectMonthlyDistribution]) -> Vec<(String, Decimal, Decimal, Decimal)> {
    rows.iter()
        .map(|r| {
            (r.project_name.clone(), r.revenue_share_percent, r.distributed_salaries, r.total_distributed)
        })
        .collect()
}

#[tokio::test]
async fn preview_reports_totals_and_shares() {
    let (company, _, _) = standard_company();
    let services = company.services();

    let preview =
        services.closing.preview(company.id, march(), &ProjectScope::All).await.unwrap();

    assert!(preview.can_close, "{:?}", preview.errors);
    assert_eq!(preview.status, ClosingStatus::Open);
    assert_eq!(preview.totals.total_salaries, dec!(3000));
    assert_eq!(preview.totals.total_non_productive, dec!(1000));
    assert_eq!(preview.totals.total_revenue, dec!(4000));
    assert_eq!(preview.non_productive.idle_salaries, dec!(1000));

    let app = &preview.distributions[0];
    assert_eq!(app.project_name, "App");
    assert_eq!(app.revenue_share_percent, dec!(25));
    assert_eq!(app.distributed_salaries, dec!(750));
    assert_eq!(app.distributed_non_productive, dec!(250));
    assert_eq!(app.total_distributed, dec!(1000));
    // 25h at 2000 / 100h
    assert_eq!(app.internal_cost, dec!(500));
}

#[tokio::test]
async fn close_persists_distribution_and_totals() {
    let (company, _, _) = standard_company();
    let services = company.services();

    let view = services.closing.close(&company.actor(), march()).await.unwrap();

    assert_eq!(view.status, ClosingStatus::Closed);
    let closing = view.closing.expect("closing row");
    assert_eq!(closing.total_salaries, Some(dec!(3000)));
    assert_eq!(closing.total_non_productive, Some(dec!(1000)));
    assert_eq!(closing.closed_by, Some(company.admin));
    assert_eq!(closing.version, 1);
    assert_eq!(view.distributions.len(), 2);

    let status = services.closing.status(company.id, march(), &ProjectScope::All).await.unwrap();
    assert_eq!(comparable(&status.distributions), comparable(&view.distributions));
}

#[tokio::test]
async fn never_closed_month_is_open() {
    let company = Company::new();
    let services = company.services();

    let view = services.closing.status(company.id, march(), &ProjectScope::All).await.unwrap();
    assert_eq!(view.status, ClosingStatus::Open);
    assert!(view.closing.is_none());
    assert!(view.distributions.is_empty());
}

#[tokio::test]
async fn missing_revenue_blocks_close_until_set() {
    let company = Company::new();
    company.user("Ana", Some(dec!(1000)), None);
    let web = company.project("Web", None);
    let services = company.services();

    let preview =
        services.closing.preview(company.id, march(), &ProjectScope::All).await.unwrap();
    let codes: Vec<_> = preview.errors.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![ValidationErrorCode::MissingRevenue]);
    assert_eq!(preview.errors[0].project_id, Some(web));

    let err = services.closing.close(&company.actor(), march()).await.unwrap_err();
    match err {
        CostCloseError::ClosingBlocked { errors, .. } => assert_eq!(errors.len(), 1),
        other => panic!("expected ClosingBlocked, got {other:?}"),
    }
    assert!(company.store.state().closings.is_empty());

    company.revenue(web, march(), dec!(500));
    let view = services.closing.close(&company.actor(), march()).await.unwrap();
    assert_eq!(view.status, ClosingStatus::Closed);
}

#[tokio::test]
async fn zero_total_revenue_splits_equally_and_blocks() {
    let company = Company::new();
    company.user("Ana", Some(dec!(900)), None);
    for name in ["A", "B", "C"] {
        let id = company.project(name, None);
        company.revenue(id, march(), Decimal::ZERO);
    }
    let services = company.services();

    let preview =
        services.closing.preview(company.id, march(), &ProjectScope::All).await.unwrap();
    assert!(!preview.can_close);
    assert!(preview.errors.iter().any(|e| e.code == ValidationErrorCode::ZeroRevenue));
    assert!(preview.distributions.iter().all(|d| d.revenue_share_percent == dec!(33.33)));
}

#[tokio::test]
async fn non_productive_hours_are_pooled() {
    let company = Company::new();
    let ana = company.user("Ana", Some(dec!(500)), None);
    let np = company.non_productive_category();
    let internal = company.project("Internal", Some(np));
    let web = company.project("Web", None);
    company.revenue(web, march(), dec!(100));
    company.hours(ana, internal, march(), 10);
    company.hours(ana, web, march(), 90);
    let services = company.services();

    let preview =
        services.closing.preview(company.id, march(), &ProjectScope::All).await.unwrap();
    // cost hour 5, 10h non-productive
    assert_eq!(preview.non_productive.hours_cost, dec!(50));
    assert_eq!(preview.totals.total_non_productive, dec!(50));
    assert_eq!(preview.distributions.len(), 1);
    assert_eq!(preview.distributions[0].distributed_non_productive, dec!(50));
}

#[tokio::test]
async fn closing_twice_is_rejected() {
    let (company, _, _) = standard_company();
    let services = company.services();

    services.closing.close(&company.actor(), march()).await.unwrap();
    let err = services.closing.close(&company.actor(), march()).await.unwrap_err();
    assert!(matches!(err, CostCloseError::InvalidInput(_)));
}

#[tokio::test]
async fn concurrent_closes_commit_once() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let actor = company.actor();

    let (first, second) = tokio::join!(
        services.closing.close(&actor, march()),
        services.closing.close(&actor, march())
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let state = company.store.state();
    assert_eq!(state.closings.len(), 1);
    assert_eq!(state.closings[0].version, 1);
    assert_eq!(state.distributions.len(), 2);
}

#[tokio::test]
async fn reopen_requires_reason_and_existing_close() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let actor = company.actor();

    let err = services.closing.reopen(&actor, march(), "  ").await.unwrap_err();
    assert!(matches!(err, CostCloseError::InvalidInput(_)));

    let err = services.closing.reopen(&actor, march(), "fix revenue").await.unwrap_err();
    assert!(matches!(err, CostCloseError::NotFound(_)));

    services.closing.close(&actor, march()).await.unwrap();
    let view = services.closing.reopen(&actor, march(), "fix revenue").await.unwrap();
    let closing = view.closing.unwrap();
    assert_eq!(closing.status, ClosingStatus::Reopened);
    assert_eq!(closing.reopen_reason.as_deref(), Some("fix revenue"));
    assert_eq!(closing.reopened_by, Some(company.admin));
    // Previous distribution stays visible until the next close
    assert_eq!(view.distributions.len(), 2);
}

#[tokio::test]
async fn reclose_with_unchanged_inputs_is_idempotent() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let actor = company.actor();

    let first = services.closing.close(&actor, march()).await.unwrap();
    services.closing.reopen(&actor, march(), "double check").await.unwrap();
    let second = services.closing.close(&actor, march()).await.unwrap();

    assert_eq!(comparable(&first.distributions), comparable(&second.distributions));
    let (a, b) = (first.closing.unwrap(), second.closing.unwrap());
    assert_eq!(a.id, b.id);
    assert_eq!(b.version, 3);
    assert_eq!(b.reopened_by, None);
    assert_eq!(b.reopened_at, None);
    assert_eq!(b.reopen_reason, None);
    assert_eq!(company.store.state().distributions.len(), 2);
}

#[tokio::test]
async fn closed_salary_view_uses_snapshot_until_reclosed() {
    let company = Company::new();
    let ana = company.user("Ana", Some(dec!(2000)), None);
    let web = company.project("Web", None);
    company.revenue(web, march(), dec!(100));
    let services = company.services();
    let actor = company.actor();

    services.closing.close(&actor, march()).await.unwrap();
    company.set_salary(ana, Some(dec!(2500)));

    let lines = services.salaries.list(company.id, march()).await.unwrap();
    assert_eq!(lines[0].base_salary, Some(dec!(2000)));
    assert!(lines[0].from_snapshot);

    services.closing.reopen(&actor, march(), "raise").await.unwrap();
    let lines = services.salaries.list(company.id, march()).await.unwrap();
    assert_eq!(lines[0].base_salary, Some(dec!(2500)));
    assert!(!lines[0].from_snapshot);

    let view = services.closing.close(&actor, march()).await.unwrap();
    assert_eq!(view.closing.unwrap().total_salaries, Some(dec!(2500)));
    let lines = services.salaries.list(company.id, march()).await.unwrap();
    assert_eq!(lines[0].base_salary, Some(dec!(2500)));
}

#[tokio::test]
async fn editing_overhead_after_close_reopens_with_warning() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let actor = company.actor();
    services.closing.close(&actor, march()).await.unwrap();

    let created = services
        .overhead
        .create(
            &actor,
            NewOverheadCost {
                year: 2025,
                month: 3,
                concept: "Rent".into(),
                amount: dec!(400),
                date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.warning.as_deref(), Some(REOPENED_WARNING));

    let view = services.closing.status(company.id, march(), &ProjectScope::All).await.unwrap();
    assert_eq!(view.status, ClosingStatus::Reopened);
    let closing = view.closing.unwrap();
    assert_eq!(closing.reopen_reason.as_deref(), Some(OVERHEAD_CHANGED_REOPEN_REASON));
    assert_eq!(closing.reopened_by, Some(company.admin));

    // Already reopened: no second warning
    let warning = services.overhead.delete(&actor, created.value.id).await.unwrap();
    assert!(warning.is_none());
}

#[tokio::test]
async fn editing_another_month_leaves_closing_alone() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let actor = company.actor();
    services.closing.close(&actor, march()).await.unwrap();

    let created = services
        .overhead
        .create(
            &actor,
            NewOverheadCost {
                year: 2025,
                month: 4,
                concept: "Rent".into(),
                amount: dec!(400),
                date: None,
            },
        )
        .await
        .unwrap();
    assert!(created.warning.is_none());
    assert_eq!(
        services.closing.current_status(company.id, march()).await.unwrap(),
        ClosingStatus::Closed
    );
}

#[tokio::test]
async fn scoped_callers_see_only_their_projects() {
    let (company, web, _) = standard_company();
    let services = company.services();
    let scope = ProjectScope::Only(HashSet::from([web]));
    let scoped = Actor { scope: scope.clone(), ..company.actor() };

    let preview = services.closing.preview(company.id, march(), &scope).await.unwrap();
    assert_eq!(preview.distributions.len(), 1);
    assert_eq!(preview.distributions[0].project_id, web);
    // Totals still cover every project
    assert_eq!(preview.totals.total_revenue, dec!(4000));

    let view = services.closing.close(&scoped, march()).await.unwrap();
    assert_eq!(view.distributions.len(), 1);
    assert_eq!(company.store.state().distributions.len(), 2);
}

#[tokio::test]
async fn periods_are_independent() {
    let (company, _, _) = standard_company();
    let services = company.services();
    let april = Period::new(2025, 4).unwrap();

    services.closing.close(&company.actor(), march()).await.unwrap();
    let preview = services.closing.preview(company.id, april, &ProjectScope::All).await.unwrap();
    assert_eq!(preview.status, ClosingStatus::Open);
    assert!(preview
        .errors
        .iter()
        .all(|e| e.code == ValidationErrorCode::MissingRevenue));
}
