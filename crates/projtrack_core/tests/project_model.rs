use chrono::{TimeZone, Utc};
use projtrack_core::Project;
use uuid::Uuid;

#[test]
fn project_new_sets_defaults() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let project = Project::new("Site", "Ground works", "North yard", start, start, 5000.0);

    assert!(!project.id.is_nil());
    assert!(!project.is_completed);
    assert_eq!(project.title, "Site");
    assert_eq!(project.budget, 5000.0);
}

#[test]
fn project_ids_are_unique() {
    let now = Utc::now();
    let a = Project::new("a", "", "", now, now, 0.0);
    let b = Project::new("a", "", "", now, now, 0.0);

    assert_ne!(a.id, b.id);
}

#[test]
fn project_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let project = Project::with_id(
        id,
        "Site",
        "Ground works",
        "North yard",
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 1, 31, 17, 30, 0).unwrap(),
        5000.0,
    );

    let json = serde_json::to_value(&project).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["title"], "Site");
    assert_eq!(json["location"], "North yard");
    assert_eq!(json["start_date"], "2025-01-01T08:00:00Z");
    assert_eq!(json["end_date"], "2025-01-31T17:30:00Z");
    assert_eq!(json["budget"], 5000.0);
    assert_eq!(json["is_completed"], false);

    let decoded: Project = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, project);
}

#[test]
fn missing_completion_flag_defaults_to_false() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "title": "Legacy",
        "description": "",
        "location": "",
        "start_date": "2025-01-01T00:00:00Z",
        "end_date": "2025-01-02T00:00:00Z",
        "budget": 1.5
    });

    let project: Project = serde_json::from_value(value).unwrap();
    assert!(!project.is_completed);
}
