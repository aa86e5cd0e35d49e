use grievance_core::{Category, Grievance, GrievanceStatus, Priority};
use uuid::Uuid;

fn sample(anonymous: bool) -> Grievance {
    Grievance {
        id: Uuid::parse_str("11111111-2222-4333-8444-555555555555").expect("parse uuid"),
        title: "Streetlight out".to_string(),
        description: "Dark corner near the school".to_string(),
        category: Category::PublicSafety,
        priority: Priority::High,
        state: "Kerala".to_string(),
        location: "MG Road".to_string(),
        status: GrievanceStatus::InProgress,
        anonymous,
        user_id: "u1".to_string(),
        user_email: "resident@example.in".to_string(),
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_360_000,
    }
}

#[test]
fn serialization_uses_collection_field_names() {
    let grievance = sample(false);
    let json = serde_json::to_value(&grievance).expect("serialize grievance");

    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["category"], "Public Safety");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["status"], "in-progress");
    assert_eq!(json["userId"], "u1");
    assert_eq!(json["userEmail"], "resident@example.in");
    assert_eq!(json["createdAt"], 1_700_000_000_000_i64);

    let decoded: Grievance = serde_json::from_value(json).expect("deserialize grievance");
    assert_eq!(decoded, grievance);
}

#[test]
fn rejected_status_deserializes_as_closed() {
    let mut json = serde_json::to_value(sample(false)).expect("serialize grievance");
    json["status"] = serde_json::Value::from("rejected");
    let decoded: Grievance = serde_json::from_value(json).expect("deserialize grievance");
    assert_eq!(decoded.status, GrievanceStatus::Closed);
}

#[test]
fn anonymous_records_mask_submitter() {
    assert_eq!(sample(true).submitter_label(), "Anonymous");
    assert_eq!(sample(false).submitter_label(), "resident@example.in");
}

#[test]
fn short_id_keeps_first_eight_characters() {
    assert_eq!(sample(false).short_id(), "11111111");
}

#[test]
fn lifecycle_allows_only_forward_moves() {
    use GrievanceStatus::*;

    assert!(Pending.can_transition_to(InProgress));
    assert!(Pending.can_transition_to(Resolved));
    assert!(Pending.can_transition_to(Closed));
    assert!(InProgress.can_transition_to(Resolved));
    assert!(InProgress.can_transition_to(Closed));

    assert!(!Pending.can_transition_to(Pending));
    assert!(!InProgress.can_transition_to(Pending));
    for terminal in [Resolved, Closed] {
        assert!(terminal.is_terminal());
        for next in GrievanceStatus::ALL {
            assert!(!terminal.can_transition_to(next));
        }
    }
}
