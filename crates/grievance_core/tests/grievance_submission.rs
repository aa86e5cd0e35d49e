use grievance_core::db::open_db_in_memory;
use grievance_core::{
    Category, Grievance, GrievanceDraft, GrievanceId, GrievanceRepository, GrievanceService,
    GrievanceServiceError, GrievanceStatus, PersistenceCause, Priority, RepoResult,
    RequiredField, SessionUser, SqliteGrievanceRepository, SubmissionError, ValidatedGrievance,
};
use std::cell::Cell;

/// Counts calls and refuses to persist anything.
#[derive(Default)]
struct CountingRepository {
    calls: Cell<usize>,
}

impl GrievanceRepository for CountingRepository {
    fn create_grievance(&self, _record: &ValidatedGrievance) -> RepoResult<GrievanceId> {
        self.calls.set(self.calls.get() + 1);
        Ok(uuid::Uuid::new_v4())
    }

    fn list_for_user(&self, _user_id: &str) -> RepoResult<Vec<Grievance>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }

    fn list_all(&self) -> RepoResult<Vec<Grievance>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Vec::new())
    }

    fn get_grievance(&self, _id: GrievanceId) -> RepoResult<Option<Grievance>> {
        self.calls.set(self.calls.get() + 1);
        Ok(None)
    }

    fn update_status(&self, id: GrievanceId, _status: GrievanceStatus) -> RepoResult<Grievance> {
        self.calls.set(self.calls.get() + 1);
        Err(grievance_core::RepoError::NotFound(id))
    }
}

fn pothole() -> GrievanceDraft {
    GrievanceDraft {
        title: "Pothole".to_string(),
        description: "Large pothole".to_string(),
        category: Some(Category::Infrastructure),
        state: "Telangana".to_string(),
        location: "Main St".to_string(),
        ..GrievanceDraft::default()
    }
}

#[test]
fn pothole_scenario_is_pending_and_visible_only_to_owner() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = GrievanceService::new(SqliteGrievanceRepository::new(&conn));
    let u1 = SessionUser::citizen("u1", "u1@example.com");
    let u2 = SessionUser::citizen("u2", "u2@example.com");

    let id = service.submit(Some(&u1), &pothole()).expect("submit grievance");

    let mine = service.list_mine(Some(&u1)).expect("list own grievances");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, id);
    assert_eq!(mine[0].status, GrievanceStatus::Pending);
    assert_eq!(mine[0].user_id, "u1");
    assert_eq!(mine[0].priority, Priority::Medium);
    assert!(!mine[0].anonymous);

    let theirs = service.list_mine(Some(&u2)).expect("list own grievances");
    assert!(theirs.iter().all(|grievance| grievance.id != id));
}

#[test]
fn every_missing_required_field_blocks_the_gateway() {
    let blanks: [(RequiredField, fn(&mut GrievanceDraft)); 5] = [
        (RequiredField::Title, |draft| draft.title.clear()),
        (RequiredField::Description, |draft| draft.description.clear()),
        (RequiredField::Category, |draft| draft.category = None),
        (RequiredField::State, |draft| draft.state = " ".to_string()),
        (RequiredField::Location, |draft| draft.location.clear()),
    ];
    let user = SessionUser::citizen("u1", "u1@example.com");

    for (field, blank) in blanks {
        let repo = CountingRepository::default();
        let service = GrievanceService::new(&repo);
        let mut draft = pothole();
        blank(&mut draft);

        let err = service.submit(Some(&user), &draft).expect_err("submission must fail");
        match err {
            GrievanceServiceError::Submission(SubmissionError::Validation(inner)) => {
                assert_eq!(inner.missing, vec![field]);
            }
            other => panic!("unexpected error for {field:?}: {other}"),
        }
        assert_eq!(repo.calls.get(), 0, "gateway touched for {field:?}");
    }
}

#[test]
fn submission_without_session_is_rejected_before_persistence() {
    let repo = CountingRepository::default();
    let service = GrievanceService::new(&repo);

    let err = service.submit(None, &pothole()).expect_err("submission must fail");
    assert!(matches!(
        err,
        GrievanceServiceError::Submission(SubmissionError::AuthRequired)
    ));
    assert_eq!(
        err.user_message(),
        "You must be logged in to submit a grievance."
    );
    assert_eq!(repo.calls.get(), 0);
}

#[test]
fn persist_rejects_a_session_that_changed_after_validation() {
    let repo = CountingRepository::default();
    let service = GrievanceService::new(&repo);
    let u1 = SessionUser::citizen("u1", "u1@example.com");
    let u2 = SessionUser::citizen("u2", "u2@example.com");

    let validated = service.prepare(Some(&u1), &pothole()).expect("valid draft");
    for session in [None, Some(&u2)] {
        let err = service.persist(session, &validated).expect_err("persist must fail");
        match err {
            GrievanceServiceError::Persistence(inner) => {
                assert_eq!(inner.cause, PersistenceCause::Unauthenticated);
                assert_eq!(
                    inner.user_message(),
                    "Authentication required. Please log in again."
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(repo.calls.get(), 0);
}

#[test]
fn successive_submissions_get_increasing_created_at() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = GrievanceService::new(SqliteGrievanceRepository::new(&conn));
    let user = SessionUser::citizen("u1", "u1@example.com");

    let ids = (0..5)
        .map(|_| service.submit(Some(&user), &pothole()).expect("submit grievance"))
        .collect::<Vec<_>>();

    let mine = service.list_mine(Some(&user)).expect("list own grievances");
    let listed_ids = mine.iter().map(|grievance| grievance.id).collect::<Vec<_>>();
    let expected = ids.iter().rev().copied().collect::<Vec<_>>();
    assert_eq!(listed_ids, expected);
    assert!(mine
        .windows(2)
        .all(|pair| pair[0].created_at > pair[1].created_at));
}

#[test]
fn explicit_priority_and_anonymous_flag_are_stored() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = GrievanceService::new(SqliteGrievanceRepository::new(&conn));
    let user = SessionUser::citizen("u1", "u1@example.com");

    let mut draft = pothole();
    draft.priority = Some(Priority::High);
    draft.anonymous = true;
    draft.attachments = vec!["photo.jpg".to_string()];
    let id = service.submit(Some(&user), &draft).expect("submit grievance");

    let stored = service.get(Some(&user), id).expect("read grievance").expect("grievance present");
    assert_eq!(stored.priority, Priority::High);
    assert!(stored.anonymous);
    assert_eq!(stored.user_email, "u1@example.com");
    assert_eq!(stored.submitter_label(), "Anonymous");
    assert_eq!(stored.created_at, stored.updated_at);
}

#[test]
fn citizens_cannot_read_other_citizens_records() {
    let conn = open_db_in_memory().expect("open in-memory db");
    let service = GrievanceService::new(SqliteGrievanceRepository::new(&conn));
    let u1 = SessionUser::citizen("u1", "u1@example.com");
    let u2 = SessionUser::citizen("u2", "u2@example.com");
    let admin = SessionUser::admin("a1", "admin@example.com");

    let id = service.submit(Some(&u1), &pothole()).expect("submit grievance");

    let err = service.get(Some(&u2), id).expect_err("read must fail");
    assert!(matches!(
        err,
        GrievanceServiceError::Persistence(ref inner)
            if inner.cause == PersistenceCause::PermissionDenied
    ));
    assert!(service.get(Some(&admin), id).expect("read grievance").is_some());
}
