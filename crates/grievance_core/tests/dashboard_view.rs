use grievance_core::{
    Category, DashboardView, FetchOutcome, Grievance, GrievanceServiceError, GrievanceStatus,
    PersistenceCause, PersistenceError, PersistenceOp, Priority, StatusFilter,
};
use uuid::Uuid;

fn grievance(title: &str, status: GrievanceStatus, created_at: i64) -> Grievance {
    Grievance {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: "details".to_string(),
        category: Category::Utilities,
        priority: Priority::Medium,
        state: "Goa".to_string(),
        location: "Panaji".to_string(),
        status,
        anonymous: false,
        user_id: "u1".to_string(),
        user_email: "u1@example.com".to_string(),
        created_at,
        updated_at: created_at,
    }
}

fn unavailable() -> GrievanceServiceError {
    PersistenceError::new(PersistenceCause::Unavailable, PersistenceOp::Load).into()
}

#[test]
fn fresh_view_reports_no_submissions_once_loaded() {
    let mut view = DashboardView::new();
    let outcome = view.refresh(|| Ok(Vec::new()));

    assert!(matches!(outcome, FetchOutcome::Applied { count: 0 }));
    assert!(!view.is_loading());
    assert_eq!(view.empty_message(), Some("No grievances submitted yet."));
}

#[test]
fn loading_view_shows_no_placeholder() {
    let mut view = DashboardView::new();
    let _ticket = view.begin_fetch();

    assert!(view.is_loading());
    assert_eq!(view.empty_message(), None);
}

#[test]
fn result_after_unmount_is_discarded() {
    let mut view = DashboardView::new();
    let ticket = view.begin_fetch();
    view.unmount();

    let rows = vec![grievance("Leak", GrievanceStatus::Pending, 1)];
    let outcome = view.apply_fetch(ticket, Ok(rows));
    assert!(matches!(outcome, FetchOutcome::Discarded));
    assert!(view.items().is_empty());
    assert!(!view.is_mounted());
}

#[test]
fn stale_ticket_is_discarded_in_favor_of_newer_fetch() {
    let mut view = DashboardView::new();
    let older = view.begin_fetch();
    let newer = view.begin_fetch();

    let applied = view.apply_fetch(newer, Ok(vec![grievance("New", GrievanceStatus::Pending, 2)]));
    assert!(matches!(applied, FetchOutcome::Applied { count: 1 }));

    let late = view.apply_fetch(older, Ok(vec![grievance("Old", GrievanceStatus::Pending, 1)]));
    assert!(matches!(late, FetchOutcome::Discarded));
    assert_eq!(view.items()[0].title, "New");
}

#[test]
fn failed_fetch_keeps_previous_rows() {
    let mut view = DashboardView::new();
    view.refresh(|| Ok(vec![grievance("Leak", GrievanceStatus::Pending, 1)]));

    let outcome = view.refresh(|| Err(unavailable()));
    match outcome {
        FetchOutcome::Failed(err) => assert_eq!(
            err.user_message(),
            "Service unavailable. Please check your internet connection."
        ),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(view.items().len(), 1);
    assert!(!view.is_loading());
}

#[test]
fn controls_narrow_visible_rows_but_not_stats() {
    let mut view = DashboardView::new();
    view.refresh(|| {
        Ok(vec![
            grievance("Leak on 5th", GrievanceStatus::Resolved, 3),
            grievance("Leak on 2nd", GrievanceStatus::Pending, 2),
            grievance("No water", GrievanceStatus::InProgress, 1),
        ])
    });

    view.set_search("leak");
    view.set_status_filter(StatusFilter::Only(GrievanceStatus::Pending));
    let visible = view.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].title, "Leak on 2nd");

    let stats = view.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.closed, 0);

    view.set_status_filter(StatusFilter::Only(GrievanceStatus::Closed));
    assert_eq!(
        view.empty_message(),
        Some("No grievances found matching your criteria.")
    );
}
