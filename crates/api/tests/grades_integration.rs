//! Integration tests for grades.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, parse_response_body, session_cookie};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn grade_row(id: Uuid, estudiante_id: Uuid, materia: &str, nota: f64, peso: f64, docente_id: Uuid) -> Value {
    json!({
        "id": id,
        "estudiante_id": estudiante_id,
        "materia": materia,
        "tipo_evaluacion": "parcial",
        "fecha": "2025-05-02",
        "peso": peso,
        "nota": nota,
        "observaciones": null,
        "docente_id": docente_id
    })
}

#[tokio::test]
async fn test_create_grade_takes_teacher_from_session() {
    let (app, upstream) = create_test_app().await;
    let docente_id = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();
    upstream.on(
        Method::POST,
        "/rest/v1/calificaciones",
        201,
        json!([grade_row(Uuid::new_v4(), estudiante_id, "Matemática", 8.0, 1.0, docente_id)]),
    );

    let cookie = session_cookie(docente_id, "docente");
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/calificaciones",
            json!({
                "estudiante_id": estudiante_id,
                "materia": " Matemática ",
                "nota": 8.0,
                "peso": 1.0
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let inserts = upstream.requests_to(Method::POST, "/rest/v1/calificaciones");
    let sent = inserts[0].json();
    assert_eq!(sent[0]["docente_id"], docente_id.to_string());
    assert_eq!(sent[0]["materia"], "Matemática");
}

#[tokio::test]
async fn test_create_grade_out_of_range() {
    let (app, upstream) = create_test_app().await;
    let cookie = session_cookie(Uuid::new_v4(), "docente");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/calificaciones",
            json!({"estudiante_id": Uuid::new_v4(), "materia": "Historia", "nota": 11.0}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "La nota debe estar entre 0 y 10");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_teacher_cannot_edit_another_teachers_grade() {
    let (app, upstream) = create_test_app().await;
    let grade_id = Uuid::new_v4();
    upstream.on_query(
        Method::GET,
        "/rest/v1/calificaciones",
        &format!("id=eq.{}", grade_id),
        200,
        json!([grade_row(grade_id, Uuid::new_v4(), "Lengua", 5.0, 1.0, Uuid::new_v4())]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "docente");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/calificaciones/{}", grade_id),
            json!({"nota": 9.0}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(upstream
        .requests_to(Method::PATCH, "/rest/v1/calificaciones")
        .is_empty());
}

#[tokio::test]
async fn test_list_grades_for_student_includes_weighted_averages() {
    let (app, upstream) = create_test_app().await;
    let estudiante_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();
    upstream.on(
        Method::GET,
        "/rest/v1/calificaciones",
        200,
        json!([
            grade_row(Uuid::new_v4(), estudiante_id, "Matemática", 8.0, 1.0, docente_id),
            grade_row(Uuid::new_v4(), estudiante_id, "Matemática", 6.0, 3.0, docente_id),
            grade_row(Uuid::new_v4(), estudiante_id, "Biología", 9.0, 1.0, docente_id)
        ]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(get_request(
            &format!("/api/calificaciones?estudiante_id={}", estudiante_id),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["calificaciones"].as_array().unwrap().len(), 3);

    let materias = body["materias"].as_array().unwrap();
    let matematica = materias
        .iter()
        .find(|m| m["materia"] == "Matemática")
        .unwrap();
    assert_eq!(matematica["promedio"], 6.5);
}

#[tokio::test]
async fn test_teacher_updates_own_grade() {
    let (app, upstream) = create_test_app().await;
    let grade_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();
    upstream.on_query(
        Method::GET,
        "/rest/v1/calificaciones",
        &format!("id=eq.{}", grade_id),
        200,
        json!([grade_row(grade_id, estudiante_id, "Lengua", 5.0, 1.0, docente_id)]),
    );
    upstream.on(
        Method::PATCH,
        "/rest/v1/calificaciones",
        200,
        json!([grade_row(grade_id, estudiante_id, "Lengua", 7.5, 1.0, docente_id)]),
    );

    let cookie = session_cookie(docente_id, "docente");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/calificaciones/{}", grade_id),
            json!({"nota": 7.5}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["calificacion"]["nota"], 7.5);

    let patches = upstream.requests_to(Method::PATCH, "/rest/v1/calificaciones");
    assert_eq!(patches.len(), 1);
    assert!(patches[0].query.contains(&format!("id=eq.{}", grade_id)));
    assert_eq!(patches[0].json()["nota"], 7.5);
}

#[tokio::test]
async fn test_update_missing_grade_returns_404() {
    let (app, upstream) = create_test_app().await;

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/calificaciones/{}", Uuid::new_v4()),
            json!({"nota": 6.0}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(upstream
        .requests_to(Method::PATCH, "/rest/v1/calificaciones")
        .is_empty());
}

#[tokio::test]
async fn test_direction_deletes_any_grade() {
    let (app, upstream) = create_test_app().await;
    let grade_id = Uuid::new_v4();
    upstream.on_query(
        Method::GET,
        "/rest/v1/calificaciones",
        &format!("id=eq.{}", grade_id),
        200,
        json!([grade_row(grade_id, Uuid::new_v4(), "Historia", 4.0, 2.0, Uuid::new_v4())]),
    );
    upstream.on(
        Method::DELETE,
        "/rest/v1/calificaciones",
        200,
        json!([{"id": grade_id}]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/calificaciones/{}", grade_id),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["id"], grade_id.to_string());
    let deletes = upstream.requests_to(Method::DELETE, "/rest/v1/calificaciones");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].query.contains(&format!("id=eq.{}", grade_id)));
}

#[tokio::test]
async fn test_teacher_cannot_delete_another_teachers_grade() {
    let (app, upstream) = create_test_app().await;
    let grade_id = Uuid::new_v4();
    upstream.on_query(
        Method::GET,
        "/rest/v1/calificaciones",
        &format!("id=eq.{}", grade_id),
        200,
        json!([grade_row(grade_id, Uuid::new_v4(), "Historia", 4.0, 2.0, Uuid::new_v4())]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "docente");
    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/calificaciones/{}", grade_id),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(upstream
        .requests_to(Method::DELETE, "/rest/v1/calificaciones")
        .is_empty());
}
