mod test_utils;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use test_utils::test_router;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let response = test_router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let response = test_router()
        .oneshot(Request::get("/api/nonsense").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_without_identity_is_forbidden() {
    let response = test_router()
        .oneshot(
            Request::post("/api/assignments")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "shift_id": Uuid::new_v4() }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

fn template_payload(cap: i32, quantity: i32) -> String {
    json!({
        "branch_id": Uuid::new_v4(),
        "name": "Morning",
        "start_time": "08:00:00",
        "end_time": "16:00:00",
        "max_staff_allowed": cap,
        "employment_type": "ANY",
        "role_requirements": [
            { "role_id": Uuid::new_v4(), "quantity": quantity, "required": true, "notes": null }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn template_creation_requires_manager_role() {
    let response = test_router()
        .oneshot(
            Request::post("/api/templates")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "staff")
                .body(Body::from(template_payload(4, 2)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_quantity_over_cap_is_rejected_with_detail() {
    let response = test_router()
        .oneshot(
            Request::post("/api/templates")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "manager")
                .body(Body::from(template_payload(2, 3)))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("requires 3, max staff is 2"));
}

#[tokio::test]
async fn ad_hoc_draft_without_times_is_rejected() {
    let response = test_router()
        .oneshot(
            Request::post("/api/shifts")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "manager")
                .body(Body::from(
                    json!({
                        "branch_id": Uuid::new_v4(),
                        "date": "2024-06-10"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("start_time"));
}

#[tokio::test]
async fn attendance_is_recorded_by_managers_only() {
    // The assignee checking themselves in is refused before anything is loaded.
    for action in ["check-in", "check-out"] {
        let response = test_router()
            .oneshot(
                Request::post(format!("/api/assignments/{}/{}", Uuid::new_v4(), action))
                    .header("x-staff-id", Uuid::new_v4().to_string())
                    .header("x-staff-role", "staff")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{action}");
    }
}

#[tokio::test]
async fn staff_mirror_upsert_requires_manager_role() {
    let response = test_router()
        .oneshot(
            Request::put("/api/staff")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "staff")
                .body(Body::from(
                    json!({
                        "id": Uuid::new_v4(),
                        "branch_id": Uuid::new_v4(),
                        "display_name": "Sam",
                        "employment_type": "CASUAL",
                        "is_active": true
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn inverted_closure_range_is_rejected() {
    let response = test_router()
        .oneshot(
            Request::post("/api/closures")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "manager")
                .body(Body::from(
                    json!({
                        "branch_id": null,
                        "start_date": "2024-12-26",
                        "end_date": "2024-12-24",
                        "reason": "inverted"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn inverted_template_window_is_rejected() {
    let response = test_router()
        .oneshot(
            Request::post("/api/templates")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-staff-id", Uuid::new_v4().to_string())
                .header("x-staff-role", "manager")
                .body(Body::from(
                    json!({
                        "branch_id": Uuid::new_v4(),
                        "name": "Backwards",
                        "start_time": "16:00:00",
                        "end_time": "08:00:00",
                        "employment_type": "ANY"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
