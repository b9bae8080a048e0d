//! Product cards, card interactions, banner and theme.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use viafitness_integration_tests::{TestApp, location};

async fn select(app: &TestApp, id: u64, action: &str) -> reqwest::Response {
    app.submit(&format!("/products/{id}/select"), &[("action", action)])
        .await
}

#[tokio::test]
async fn test_cards_render_title_price_and_sizes() {
    let app = TestApp::spawn().await;
    app.backend
        .add_product("leggingSuplex", "89.90", &["/media/products/legging.png"]);

    let home = app.page("/").await;
    assert!(home.contains("Legging Suplex"));
    assert!(home.contains("R$ 89,90"));
    assert!(home.contains(&format!("{}/media/products/legging.png", app.backend.url)));
    for size in ["P", "M", "G", "GG"] {
        assert!(home.contains(&format!(r#"value="size:{size}""#)));
    }
}

#[tokio::test]
async fn test_quantity_changes_total() {
    let app = TestApp::spawn().await;
    let id = app.backend.add_product("topFitness", "89.90", &[]);

    select(&app, id, "dec").await;
    assert!(app.page("/").await.contains("R$ 89,90"));

    let response = select(&app, id, "inc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let home = response.text().await.unwrap();
    assert!(home.contains("R$ 179,80"));
    assert!(home.contains(r#"name="quantity" min="1" max="99" value="2""#));

    app.submit(
        &format!("/products/{id}/select"),
        &[("action", "set"), ("quantity", "5")],
    )
    .await;
    assert!(app.page("/").await.contains("R$ 449,50"));

    app.submit(
        &format!("/products/{id}/select"),
        &[("action", "set"), ("quantity", "150")],
    )
    .await;
    assert!(app.page("/").await.contains("R$ 449,50"));
}

#[tokio::test]
async fn test_select_redirects_to_card() {
    let app = TestApp::spawn().await;
    let id = app.backend.add_product("shortCiclista", "59.90", &[]);

    let response = app
        .submit_no_redirect(&format!("/products/{id}/select"), &[("action", "favorite")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/#product-{id}"));
    assert!(app.page("/").await.contains("Favorito"));

    select(&app, id, "favorite").await;
    assert!(app.page("/").await.contains("Favoritar"));
}

#[tokio::test]
async fn test_size_selection() {
    let app = TestApp::spawn().await;
    let id = app.backend.add_product("macacao", "129.90", &[]);

    let home = select(&app, id, "size:gg").await.text().await.unwrap();
    assert!(home.contains(r#"class="size selected">GG<"#));
    assert!(!home.contains(r#"class="size selected">P<"#));
}

#[tokio::test]
async fn test_image_carousel_wraps() {
    let app = TestApp::spawn().await;
    let id = app.backend.add_product(
        "conjuntoDry",
        "149.90",
        &["/media/products/a.png", "/media/products/b.png"],
    );
    let main = |name: &str| format!(r#"class="main-image" src="{}/media/products/{name}""#, app.backend.url);

    assert!(app.page("/").await.contains(&main("a.png")));

    let home = select(&app, id, "next").await.text().await.unwrap();
    assert!(home.contains(&main("b.png")));

    let home = select(&app, id, "next").await.text().await.unwrap();
    assert!(home.contains(&main("a.png")));

    let home = select(&app, id, "prev").await.text().await.unwrap();
    assert!(home.contains(&main("b.png")));

    let home = select(&app, id, "image:0").await.text().await.unwrap();
    assert!(home.contains(&main("a.png")));
}

#[tokio::test]
async fn test_selections_are_per_product() {
    let app = TestApp::spawn().await;
    let first = app.backend.add_product("top", "10.00", &[]);
    app.backend.add_product("short", "20.00", &[]);

    let home = select(&app, first, "inc").await.text().await.unwrap();
    assert!(home.contains("R$ 20,00"));
    assert!(home.contains(r#"value="1""#));
    assert!(home.contains(r#"value="2""#));
}

#[tokio::test]
async fn test_bad_select_requests() {
    let app = TestApp::spawn().await;
    let id = app.backend.add_product("top", "10.00", &[]);

    let response = select(&app, id, "dance").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = select(&app, 999, "inc").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_list_failure_still_renders() {
    let app = TestApp::spawn().await;
    app.backend.set_failing(true);

    let response = app.client.get(app.at("/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Erro ao carregar os produtos"));
}

#[tokio::test]
async fn test_banner_navigation_wraps() {
    let app = TestApp::spawn().await;

    let home = app.page("/").await;
    assert!(home.contains("/static/img/banner-1.svg"));
    assert!(home.contains(r#"href="/?banner=1""#));

    let home = app.page("/?banner=1").await;
    assert!(home.contains("/static/img/banner-2.svg"));
    assert!(home.contains(r#"class="banner-next" href="/?banner=0""#));
}

#[tokio::test]
async fn test_theme_toggle_returns_to_page() {
    let app = TestApp::spawn().await;
    assert!(app.page("/").await.contains("/static/img/logo-light.svg"));

    let response = app
        .submit_no_redirect("/theme", &[("return_to", "/?banner=1")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/?banner=1");

    let home = app.page("/").await;
    assert!(home.contains(r#"data-theme="dark""#));
    assert!(home.contains("/static/img/logo-dark.svg"));

    let response = app
        .submit_no_redirect("/theme", &[("return_to", "//evil.example")])
        .await;
    assert_eq!(location(&response), "/");
    assert!(app.page("/").await.contains(r#"data-theme="light""#));
}
