use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use persistence::{build_http_client, PostgrestClient, StorageClient};
use shared::session::SessionCodec;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_session,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    accounts, attendance, auth, courses, dashboards, enrollments, grades, health, materials, news,
    subjects,
};
use crate::services::CookieHelper;

/// Multipart framing overhead allowed on top of the file bytes.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: PostgrestClient,
    pub storage: StorageClient,
    pub sessions: Arc<SessionCodec>,
    pub cookies: CookieHelper,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = build_http_client(&config.supabase)?;
        let sessions = SessionCodec::with_leeway(
            &config.session.secret,
            config.session.ttl_secs,
            config.session.leeway_secs,
        )?;

        Ok(Self {
            db: PostgrestClient::new(http.clone(), &config.supabase),
            storage: StorageClient::new(http, &config.supabase),
            sessions: Arc::new(sessions),
            cookies: CookieHelper::new(&config.session),
            rate_limiter: RateLimiterState::new(
                config.security.rate_limit_per_minute,
                config.security.trust_forwarded_for,
            )
            .map(Arc::new),
            config: Arc::new(config),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    // Credentialed requests (the session cookie) need explicit origins.
    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_app(config: Config) -> anyhow::Result<Router> {
    let state = AppState::new(config)?;
    let config = state.config.clone();

    let upload_limit = DefaultBodyLimit::max(
        config.storage.max_upload_bytes * config.storage.max_documents.max(1)
            + MULTIPART_SLACK_BYTES,
    );

    // Routes behind the session cookie. Role checks happen per handler
    // against the allow-lists in `middleware::rbac`.
    let protected_routes = Router::new()
        .route("/api/auth/session", get(auth::session))
        // Accounts
        .route(
            "/api/cuentas",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/api/cuentas/:id",
            patch(accounts::update_account).delete(accounts::delete_account),
        )
        // Courses
        .route(
            "/api/cursos",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/api/cursos/:id",
            get(courses::get_course)
                .patch(courses::update_course)
                .delete(courses::delete_course),
        )
        .route(
            "/api/cursos/:id/estudiantes",
            get(courses::list_course_students).post(courses::add_student),
        )
        .route(
            "/api/cursos/:id/estudiantes/:estudiante_id",
            delete(courses::remove_student),
        )
        .route("/api/cursos/:id/docentes", post(courses::assign_teacher))
        .route(
            "/api/cursos/:id/docentes/:docente_id",
            delete(courses::unassign_teacher),
        )
        // Subjects
        .route(
            "/api/materias",
            get(subjects::list_subjects).post(subjects::create_subject),
        )
        .route(
            "/api/materias/:id",
            patch(subjects::update_subject).delete(subjects::delete_subject),
        )
        // Attendance
        .route(
            "/api/asistencias",
            get(attendance::list_attendance).post(attendance::save_attendance),
        )
        // Grades
        .route(
            "/api/calificaciones",
            get(grades::list_grades).post(grades::create_grade),
        )
        .route(
            "/api/calificaciones/:id",
            patch(grades::update_grade).delete(grades::delete_grade),
        )
        // Enrollment review
        .route("/api/inscripciones", get(enrollments::list_enrollments))
        .route(
            "/api/inscripciones/:id",
            get(enrollments::get_enrollment)
                .patch(enrollments::update_enrollment)
                .delete(enrollments::delete_enrollment),
        )
        // News
        .route("/api/noticias", get(news::list_news).post(news::create_news))
        .route("/api/noticias/:id", delete(news::delete_news))
        // Materials
        .route(
            "/api/materiales",
            post(materials::upload_material).layer(upload_limit.clone()),
        )
        // Dashboards
        .route("/api/estudiante/resumen", get(dashboards::student_overview))
        .route("/api/tutor/resumen", get(dashboards::tutor_summary))
        .route("/api/docente/resumen", get(dashboards::teacher_overview))
        .route("/api/admin/estadisticas", get(dashboards::admin_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    // Public write routes, rate limited per client.
    let limited_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/inscripciones",
            post(enrollments::submit_enrollment).layer(upload_limit),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Ok(Router::new()
        .merge(public_routes)
        .merge(limited_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state))
}
