//! Integration tests for the contact listing and CSV template endpoints.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::{body_json, body_text, build_test_app, get};

async fn seed_contacts(pool: &PgPool, count: usize) {
    for i in 0..count {
        sqlx::query("INSERT INTO contacts (nombre, apellido, email) VALUES ($1, $2, $3)")
            .bind(format!("Persona{i}"))
            .bind(format!("Apellido{i}"))
            .bind(format!("persona{i}@ejemplo.es"))
            .execute(pool)
            .await
            .expect("seed contact");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_contacts_empty_store(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/v1/contactos").await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total"], 0);
    assert!(data["contacts"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_contacts_paginates(pool: PgPool) {
    seed_contacts(&pool, 5).await;
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/contactos?limit=2&offset=2").await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["total"], 5);
    assert_eq!(data["limit"], 2);
    assert_eq!(data["offset"], 2);
    assert_eq!(data["contacts"].as_array().unwrap().len(), 2);

    // Out-of-range limits clamp instead of failing.
    let response = get(app, "/api/v1/contactos?limit=9999&offset=0").await;
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["limit"], 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn template_download_has_csv_headers(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/v1/contactos/import/plantilla").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"plantilla_contactos.csv\""
    );

    let body = body_text(response).await;
    assert!(body.starts_with("nombre,apellido,email,telefono"));
}
