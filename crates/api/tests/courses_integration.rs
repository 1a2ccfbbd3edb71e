//! Integration tests for course management and membership rules.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, parse_response_body, profile_row, session_cookie};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

fn course_row(id: Uuid, nombre: &str) -> serde_json::Value {
    json!({"id": id, "nombre": nombre, "descripcion": null, "anio_lectivo": 2025})
}

#[tokio::test]
async fn test_add_student_already_in_another_course() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let otro_curso = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "2do B")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=eq.{}", estudiante_id),
        200,
        json!([profile_row(estudiante_id, "estudiante")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos_estudiantes",
        &format!("estudiante_id=eq.{}", estudiante_id),
        200,
        json!([{"curso_id": otro_curso, "estudiante_id": estudiante_id}]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/cursos/{}/estudiantes", curso_id),
            json!({"estudiante_id": estudiante_id}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "El estudiante ya pertenece a otro curso");
    assert!(upstream
        .requests_to(Method::POST, "/rest/v1/cursos_estudiantes")
        .is_empty());
}

#[tokio::test]
async fn test_add_student_inserts_membership() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "2do B")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=eq.{}", estudiante_id),
        200,
        json!([profile_row(estudiante_id, "estudiante")]),
    );
    upstream.on(Method::POST, "/rest/v1/cursos_estudiantes", 201, json!([]));

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/cursos/{}/estudiantes", curso_id),
            json!({"estudiante_id": estudiante_id}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let inserts = upstream.requests_to(Method::POST, "/rest/v1/cursos_estudiantes");
    assert_eq!(inserts.len(), 1);
    assert_eq!(
        inserts[0].json(),
        json!([{"curso_id": curso_id, "estudiante_id": estudiante_id}])
    );
    assert_eq!(inserts[0].header("prefer"), Some("return=minimal"));
}

#[tokio::test]
async fn test_add_non_student_profile_is_rejected() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "1ro A")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=eq.{}", docente_id),
        200,
        json!([profile_row(docente_id, "docente")]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "administrador");
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/cursos/{}/estudiantes", curso_id),
            json!({"estudiante_id": docente_id}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(upstream
        .requests_to(Method::POST, "/rest/v1/cursos_estudiantes")
        .is_empty());
}

#[tokio::test]
async fn test_course_write_forbidden_for_teacher() {
    let (app, upstream) = create_test_app().await;
    let cookie = session_cookie(Uuid::new_v4(), "docente");

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/cursos",
            json!({"nombre": "3ro C", "anio_lectivo": 2025}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "forbidden");
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_list_courses_for_teacher() {
    let (app, upstream) = create_test_app().await;
    upstream.on(
        Method::GET,
        "/rest/v1/cursos",
        200,
        json!([course_row(Uuid::new_v4(), "1ro A"), course_row(Uuid::new_v4(), "1ro B")]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "docente");
    let response = app
        .oneshot(get_request("/api/cursos?anio_lectivo=2025", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["cursos"].as_array().unwrap().len(), 2);

    let calls = upstream.requests_to(Method::GET, "/rest/v1/cursos");
    assert!(calls[0].query.contains("anio_lectivo=eq.2025"));
    assert!(calls[0].query.contains("order=anio_lectivo.desc,nombre.asc"));
}

#[tokio::test]
async fn test_delete_missing_course_returns_404() {
    let (app, _upstream) = create_test_app().await;
    let cookie = session_cookie(Uuid::new_v4(), "directivo");

    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/cursos/{}", Uuid::new_v4()),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_course_with_members() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "1ro A")]),
    );
    upstream.on(
        Method::GET,
        "/rest/v1/cursos_estudiantes",
        200,
        json!([{"curso_id": curso_id, "estudiante_id": estudiante_id}]),
    );
    upstream.on(
        Method::GET,
        "/rest/v1/cursos_docentes",
        200,
        json!([{"curso_id": curso_id, "docente_id": docente_id}]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=in.({})", estudiante_id),
        200,
        json!([profile_row(estudiante_id, "estudiante")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=in.({})", docente_id),
        200,
        json!([profile_row(docente_id, "docente")]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(get_request(&format!("/api/cursos/{}", curso_id), Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["curso"]["id"], curso_id.to_string());
    assert_eq!(body["curso"]["nombre"], "1ro A");
    assert_eq!(body["curso"]["estudiantes"][0]["id"], estudiante_id.to_string());
    assert_eq!(body["curso"]["docentes"][0]["id"], docente_id.to_string());
}

#[tokio::test]
async fn test_get_missing_course_returns_404() {
    let (app, _upstream) = create_test_app().await;

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(get_request(&format!("/api/cursos/{}", Uuid::new_v4()), Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_teacher_twice_is_conflict() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "3ro C")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=eq.{}", docente_id),
        200,
        json!([profile_row(docente_id, "docente")]),
    );
    upstream.on(
        Method::POST,
        "/rest/v1/cursos_docentes",
        409,
        json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"cursos_docentes_pkey\""
        }),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/cursos/{}/docentes", curso_id),
            json!({"docente_id": docente_id}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "El docente ya está asignado a este curso");
    let inserts = upstream.requests_to(Method::POST, "/rest/v1/cursos_docentes");
    assert_eq!(
        inserts[0].json(),
        json!([{"curso_id": curso_id, "docente_id": docente_id}])
    );
}

#[tokio::test]
async fn test_assign_non_teacher_profile_is_rejected() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let perfil_id = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/cursos",
        &format!("id=eq.{}", curso_id),
        200,
        json!([course_row(curso_id, "3ro C")]),
    );
    upstream.on_query(
        Method::GET,
        "/rest/v1/perfiles",
        &format!("id=eq.{}", perfil_id),
        200,
        json!([profile_row(perfil_id, "tutor")]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/cursos/{}/docentes", curso_id),
            json!({"docente_id": perfil_id}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(upstream
        .requests_to(Method::POST, "/rest/v1/cursos_docentes")
        .is_empty());
}

#[tokio::test]
async fn test_remove_student_from_course() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let estudiante_id = Uuid::new_v4();

    upstream.on(
        Method::DELETE,
        "/rest/v1/cursos_estudiantes",
        200,
        json!([{"curso_id": curso_id, "estudiante_id": estudiante_id}]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/cursos/{}/estudiantes/{}", curso_id, estudiante_id),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["perfil_id"], estudiante_id.to_string());

    let deletes = upstream.requests_to(Method::DELETE, "/rest/v1/cursos_estudiantes");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].query.contains(&format!("curso_id=eq.{}", curso_id)));
    assert!(deletes[0]
        .query
        .contains(&format!("estudiante_id=eq.{}", estudiante_id)));
}

#[tokio::test]
async fn test_unassign_teacher_not_assigned_returns_404() {
    let (app, upstream) = create_test_app().await;
    let curso_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/cursos/{}/docentes/{}", curso_id, docente_id),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let deletes = upstream.requests_to(Method::DELETE, "/rest/v1/cursos_docentes");
    assert_eq!(deletes.len(), 1);
    assert!(deletes[0].query.contains(&format!("docente_id=eq.{}", docente_id)));
}
