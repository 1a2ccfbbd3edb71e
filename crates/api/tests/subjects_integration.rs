//! Integration tests for subjects and their association tables.

mod common;

use axum::http::{Method, StatusCode};
use common::{create_test_app, get_request, json_request, parse_response_body, session_cookie};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

#[tokio::test]
async fn test_create_subject_writes_deduplicated_links() {
    let (app, upstream) = create_test_app().await;
    let materia_id = Uuid::new_v4();
    let curso_id = Uuid::new_v4();
    let docente_id = Uuid::new_v4();

    upstream.on(
        Method::POST,
        "/rest/v1/materias",
        201,
        json!([{"id": materia_id, "nombre": "Matemática", "descripcion": null}]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/materias",
            json!({
                "nombre": " Matemática ",
                "curso_ids": [curso_id, curso_id],
                "docente_ids": [docente_id]
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = parse_response_body(response).await;
    assert_eq!(body["materia"]["id"], materia_id.to_string());
    assert_eq!(body["materia"]["curso_ids"], json!([curso_id]));
    assert_eq!(body["materia"]["docente_ids"], json!([docente_id]));

    let row = upstream.requests_to(Method::POST, "/rest/v1/materias");
    assert_eq!(row[0].json()[0]["nombre"], "Matemática");

    let courses = upstream.requests_to(Method::POST, "/rest/v1/materias_cursos");
    assert_eq!(courses.len(), 1);
    assert_eq!(
        courses[0].json(),
        json!([{"materia_id": materia_id, "curso_id": curso_id}])
    );
    assert_eq!(
        upstream
            .requests_to(Method::POST, "/rest/v1/materias_docentes")
            .len(),
        1
    );
    assert!(upstream
        .requests_to(Method::POST, "/rest/v1/materias_responsables")
        .is_empty());
}

#[tokio::test]
async fn test_update_subject_replaces_teacher_list() {
    let (app, upstream) = create_test_app().await;
    let materia_id = Uuid::new_v4();
    let nuevo_docente = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/materias",
        &format!("id=eq.{}", materia_id),
        200,
        json!([{
            "id": materia_id,
            "nombre": "Historia",
            "descripcion": null,
            "materias_cursos": [],
            "materias_docentes": [{"docente_id": nuevo_docente}],
            "materias_responsables": []
        }]),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/materias/{}", materia_id),
            json!({"docente_ids": [nuevo_docente]}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["materia"]["docente_ids"], json!([nuevo_docente]));

    // Only the links change; the row itself is not patched.
    assert!(upstream
        .requests_to(Method::PATCH, "/rest/v1/materias")
        .is_empty());

    let cleared = upstream.requests_to(Method::DELETE, "/rest/v1/materias_docentes");
    assert_eq!(cleared.len(), 1);
    assert!(cleared[0]
        .query
        .contains(&format!("materia_id=eq.{}", materia_id)));

    let written = upstream.requests_to(Method::POST, "/rest/v1/materias_docentes");
    assert_eq!(
        written[0].json(),
        json!([{"materia_id": materia_id, "docente_id": nuevo_docente}])
    );
    assert!(upstream
        .requests_to(Method::DELETE, "/rest/v1/materias_cursos")
        .is_empty());
}

#[tokio::test]
async fn test_update_subject_without_changes_is_rejected() {
    let (app, upstream) = create_test_app().await;

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/materias/{}", Uuid::new_v4()),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_list_subjects_for_teacher_without_links() {
    let (app, upstream) = create_test_app().await;
    let docente_id = Uuid::new_v4();

    let cookie = session_cookie(Uuid::new_v4(), "docente");
    let response = app
        .oneshot(get_request(
            &format!("/api/materias?docente_id={}", docente_id),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["materias"], json!([]));

    let links = upstream.requests_to(Method::GET, "/rest/v1/materias_docentes");
    assert_eq!(links.len(), 1);
    assert!(links[0]
        .query
        .contains(&format!("docente_id=eq.{}", docente_id)));
    assert!(upstream
        .requests_to(Method::GET, "/rest/v1/materias")
        .is_empty());
}

#[tokio::test]
async fn test_delete_subject_requires_direction() {
    let (app, upstream) = create_test_app().await;

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::DELETE,
            &format!("/api/materias/{}", Uuid::new_v4()),
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(upstream.requests().is_empty());
}

#[tokio::test]
async fn test_failed_link_write_removes_created_subject() {
    let (app, upstream) = create_test_app().await;
    let materia_id = Uuid::new_v4();

    upstream.on(
        Method::POST,
        "/rest/v1/materias",
        201,
        json!([{"id": materia_id, "nombre": "Química", "descripcion": null}]),
    );
    upstream.on(
        Method::POST,
        "/rest/v1/materias_docentes",
        409,
        json!({"code": "23503", "message": "violates foreign key constraint \"materias_docentes_docente_id_fkey\""}),
    );

    let cookie = session_cookie(Uuid::new_v4(), "preceptor");
    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/materias",
            json!({
                "nombre": "Química",
                "curso_ids": [Uuid::new_v4()],
                "docente_ids": [Uuid::new_v4()]
            }),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Courses were linked before the teacher insert failed; both go away
    // together with the row.
    for table in ["materias_cursos", "materias_docentes", "materias_responsables"] {
        let cleared = upstream.requests_to(Method::DELETE, &format!("/rest/v1/{}", table));
        assert_eq!(cleared.len(), 1, "{}", table);
        assert!(cleared[0]
            .query
            .contains(&format!("materia_id=eq.{}", materia_id)));
    }
    let removed = upstream.requests_to(Method::DELETE, "/rest/v1/materias");
    assert_eq!(removed.len(), 1);
    assert!(removed[0].query.contains(&format!("id=eq.{}", materia_id)));
}

#[tokio::test]
async fn test_failed_link_replacement_restores_previous_teachers() {
    let (app, upstream) = create_test_app().await;
    let materia_id = Uuid::new_v4();
    let docente_anterior = Uuid::new_v4();
    let docente_inexistente = Uuid::new_v4();

    upstream.on_query(
        Method::GET,
        "/rest/v1/materias",
        &format!("id=eq.{}", materia_id),
        200,
        json!([{
            "id": materia_id,
            "nombre": "Geografía",
            "descripcion": null,
            "materias_cursos": [],
            "materias_docentes": [{"docente_id": docente_anterior}],
            "materias_responsables": []
        }]),
    );
    upstream.on(
        Method::POST,
        "/rest/v1/materias_docentes",
        409,
        json!({"code": "23503", "message": "violates foreign key constraint \"materias_docentes_docente_id_fkey\""}),
    );

    let cookie = session_cookie(Uuid::new_v4(), "directivo");
    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/materias/{}", materia_id),
            json!({"docente_ids": [docente_inexistente]}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let writes = upstream.requests_to(Method::POST, "/rest/v1/materias_docentes");
    assert_eq!(writes.len(), 2);
    assert_eq!(
        writes[0].json(),
        json!([{"materia_id": materia_id, "docente_id": docente_inexistente}])
    );
    assert_eq!(
        writes[1].json(),
        json!([{"materia_id": materia_id, "docente_id": docente_anterior}])
    );
    assert_eq!(
        upstream
            .requests_to(Method::DELETE, "/rest/v1/materias_docentes")
            .len(),
        2
    );
    assert!(upstream
        .requests_to(Method::DELETE, "/rest/v1/materias")
        .is_empty());
}
