//! Home page: banner carousel and product cards.
//!
//! Card interactions are plain form posts. Each one updates the
//! [`ProductSelection`] kept in the session and redirects back to the card.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use viafitness_core::{
    ProductId, ProductSelection, SelectionAction, Size, format_product_title, next_index,
    previous_index,
};

use crate::api::Product;
use crate::error::{AppError, Result};
use crate::messages;
use crate::models::{ProductSelections, keys};
use crate::state::AppState;
use crate::views::{Layout, LayoutView};

/// Banner images, in carousel order.
const BANNERS: [&str; 2] = ["/static/img/banner-1.svg", "/static/img/banner-2.svg"];

/// Banner carousel position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerView {
    pub image: &'static str,
    pub position: usize,
    pub count: usize,
    pub previous: usize,
    pub next: usize,
}

impl BannerView {
    fn at(index: usize) -> Self {
        let position = index % BANNERS.len();
        Self {
            image: BANNERS.get(position).copied().unwrap_or_default(),
            position,
            count: BANNERS.len(),
            previous: previous_index(position, BANNERS.len()),
            next: next_index(position, BANNERS.len()),
        }
    }
}

/// Thumbnail in a card carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailView {
    pub index: usize,
    pub url: String,
    pub active: bool,
}

/// Size button on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeView {
    pub label: &'static str,
    pub selected: bool,
}

/// Product card display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCardView {
    pub id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub thumbnails: Vec<ThumbnailView>,
    pub sizes: Vec<SizeView>,
    pub quantity: u8,
    pub total: String,
    pub favorited: bool,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl ProductCardView {
    fn new(product: &Product, selection: ProductSelection, state: &AppState) -> Self {
        let urls: Vec<String> = product
            .images()
            .into_iter()
            .filter_map(|image| state.api().media_url(image))
            .collect();
        let visible = selection.visible_image(urls.len());

        Self {
            id: product.id,
            title: format_product_title(&product.name),
            image: urls.get(visible).cloned(),
            thumbnails: urls
                .iter()
                .enumerate()
                .map(|(index, url)| ThumbnailView {
                    index,
                    url: url.clone(),
                    active: index == visible,
                })
                .collect(),
            sizes: Size::ALL
                .iter()
                .map(|&size| SizeView {
                    label: size.label(),
                    selected: selection.size == Some(size),
                })
                .collect(),
            quantity: selection.quantity.get(),
            total: product.price().times(selection.quantity).display(),
            favorited: selection.favorited,
            color: non_blank(product.color.as_deref()),
            size: non_blank(product.size.as_deref()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: LayoutView,
    pub banner: BannerView,
    pub products: Vec<ProductCardView>,
    pub error: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct HomeQuery {
    #[serde(default)]
    pub banner: usize,
}

/// Display the banner and the product cards.
///
/// A product list failure still renders the page, with a message in place
/// of the cards.
#[instrument(skip(state, session, layout))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    Layout(layout): Layout,
    Query(query): Query<HomeQuery>,
) -> Result<impl IntoResponse> {
    let selections = load_selections(&session).await;

    let (products, error) = match state.api().products().await {
        Ok(products) => (
            products
                .iter()
                .map(|p| ProductCardView::new(p, selections.get(p.id), &state))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products");
            (Vec::new(), Some(messages::PRODUCTS_ERROR))
        }
    };

    Ok(HomeTemplate {
        layout,
        banner: BannerView::at(query.banner),
        products,
        error,
    })
}

/// Card interaction form. `action` is the pressed button's value.
#[derive(Debug, Deserialize)]
pub struct SelectForm {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Apply one card interaction and return to the card.
#[instrument(skip(state, session, form))]
pub async fn select(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<SelectForm>,
) -> Result<impl IntoResponse> {
    let action = SelectionAction::parse(&form.action, form.quantity.as_deref())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::debug!(?action, "Card interaction");

    let products = state.api().products().await?;
    let product = products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut selections = load_selections(&session).await;
    let mut selection = selections.get(id);
    selection.apply(action, product.images().len());
    selections.set(id, selection);
    session.insert(keys::PRODUCT_SELECTIONS, &selections).await?;

    Ok(Redirect::to(&format!("/#product-{id}")))
}

async fn load_selections(session: &Session) -> ProductSelections {
    session
        .get(keys::PRODUCT_SELECTIONS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_wraps() {
        let banner = BannerView::at(0);
        assert_eq!(banner.previous, BANNERS.len() - 1);
        assert_eq!(banner.next, 1);

        let banner = BannerView::at(BANNERS.len());
        assert_eq!(banner.position, 0);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" Preto ")), Some("Preto".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
