//! Add-product form.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use viafitness_integration_tests::{TestApp, location};

fn product_form(retail_price: &str) -> Form {
    Form::new()
        .text("name", "leggingSuplex")
        .text("quantity", "12")
        .text("color", "Preto")
        .text("size", "M")
        .text("wholesale_price", "45")
        .text("retail_price", retail_price.to_string())
        .text("reference", "LEG-001")
        .part(
            "photo",
            Part::bytes(vec![0xFF, 0xD8, 0xFF])
                .file_name("legging.jpg")
                .mime_str("image/jpeg")
                .unwrap(),
        )
}

async fn post_product(app: &TestApp, form: Form) -> reqwest::Response {
    app.client
        .post(app.at("/admin/products/new"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_anonymous_redirected_to_login() {
    let app = TestApp::spawn().await;
    let response = app
        .no_redirect
        .get(app.at("/admin/products/new"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_regular_user_forbidden() {
    let app = TestApp::spawn().await;
    app.login_as("eva", false).await;

    let response = app.client.get(app.at("/admin/products/new")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_product(&app, product_form("89.90")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.backend.product_uploads().is_empty());
}

#[tokio::test]
async fn test_superuser_sees_form_and_menu_entry() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;

    let body = app.page("/admin/products/new").await;
    assert!(body.contains(r#"enctype="multipart/form-data""#));
    assert!(body.contains(r#"href="/admin/products/new">Adicionar produto"#));
}

#[tokio::test]
async fn test_empty_form_shows_every_field_error() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;
    let before = app.backend.requests();

    let body = post_product(&app, Form::new().text("name", ""))
        .await
        .text()
        .await
        .unwrap();

    for message in [
        "A foto do produto é obrigatória.",
        "Nome do produto é obrigatório.",
        "A quantidade deve ser maior que 0.",
        "Preço de atacado é obrigatório e deve ser um número válido.",
        "Preço de varejo é obrigatório e deve ser um número válido.",
        "Referência é obrigatória.",
    ] {
        assert!(body.contains(message), "missing: {message}");
    }
    assert_eq!(app.backend.requests(), before);
}

#[tokio::test]
async fn test_non_image_photo_rejected() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;

    let form = Form::new()
        .text("name", "top")
        .text("quantity", "1")
        .text("wholesale_price", "1")
        .text("retail_price", "2")
        .text("reference", "R")
        .part(
            "photo",
            Part::bytes(b"%PDF".to_vec())
                .file_name("ficha.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        );
    let body = post_product(&app, form).await.text().await.unwrap();
    assert!(body.contains("A foto do produto é obrigatória."));
    assert!(body.contains(r#"value="top""#));
    assert!(app.backend.product_uploads().is_empty());
}

#[tokio::test]
async fn test_add_product_posts_multipart_and_refreshes_list() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;
    assert!(!app.page("/").await.contains("Legging Suplex"));

    let body = post_product(&app, product_form("89,9"))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Produto adicionado com sucesso!"));

    let uploads = app.backend.product_uploads();
    assert_eq!(uploads.len(), 1);
    let upload = &uploads[0];
    assert_eq!(upload["retail_price"], "89.90");
    assert_eq!(upload["wholesale_price"], "45.00");
    assert_eq!(upload["quantity"], "12");
    assert_eq!(upload["photo"], "legging.jpg");

    let home = app.page("/").await;
    assert!(home.contains("Legging Suplex"));
    assert!(home.contains("R$ 89,90"));
}

#[tokio::test]
async fn test_expired_token_clears_session() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;
    app.backend.expire_tokens();

    let body = post_product(&app, product_form("89.90"))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Sessão expirada. Faça login novamente para continuar."));

    let response = app.no_redirect.get(app.at("/profile")).send().await.unwrap();
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_backend_failure_message() {
    let app = TestApp::spawn().await;
    app.login_as("root", true).await;
    app.backend.set_failing(true);

    let body = post_product(&app, product_form("89.90"))
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("Erro ao adicionar o produto. Tente novamente."));
}
