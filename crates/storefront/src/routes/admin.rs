//! Add-product form for superusers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Response},
};
use tracing::instrument;

use viafitness_core::{ProductDraft, ProductField, ProductFieldErrors};

use crate::api::{ApiError, ApiErrorKind};
use crate::error::{Result, add_breadcrumb};
use crate::messages;
use crate::middleware::{RequireSuperuser, SessionExpired};
use crate::routes::upload::UploadForm;
use crate::state::AppState;
use crate::views::{Layout, LayoutView};

/// Per-input validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrorsView {
    pub photo: Option<&'static str>,
    pub name: Option<&'static str>,
    pub quantity: Option<&'static str>,
    pub wholesale_price: Option<&'static str>,
    pub retail_price: Option<&'static str>,
    pub reference: Option<&'static str>,
}

impl From<&ProductFieldErrors> for FieldErrorsView {
    fn from(errors: &ProductFieldErrors) -> Self {
        Self {
            photo: errors.get(ProductField::Photo),
            name: errors.get(ProductField::Name),
            quantity: errors.get(ProductField::Quantity),
            wholesale_price: errors.get(ProductField::WholesalePrice),
            retail_price: errors.get(ProductField::RetailPrice),
            reference: errors.get(ProductField::Reference),
        }
    }
}

/// Add-product page template.
#[derive(Template, WebTemplate)]
#[template(path = "add_product.html")]
pub struct AddProductTemplate {
    pub layout: LayoutView,
    pub draft: ProductDraft,
    pub errors: FieldErrorsView,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

impl AddProductTemplate {
    fn new(layout: LayoutView, draft: ProductDraft) -> Self {
        Self {
            layout,
            draft,
            errors: FieldErrorsView::default(),
            error: None,
            success: None,
        }
    }
}

/// Display the empty form.
pub async fn new_product(
    RequireSuperuser(_auth): RequireSuperuser,
    Layout(layout): Layout,
) -> impl IntoResponse {
    AddProductTemplate::new(layout, ProductDraft::default())
}

/// Validate the form and send the product to the API.
///
/// A rejected token clears the session but keeps the visitor on the form
/// with the expiry message.
#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    RequireSuperuser(auth): RequireSuperuser,
    Layout(layout): Layout,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = UploadForm::read(multipart).await?;
    let photo = form.take_file("photo").filter(|u| u.is_image());
    let draft = ProductDraft {
        name: form.text("name"),
        quantity: form.text("quantity"),
        color: form.text("color"),
        size: form.text("size"),
        wholesale_price: form.text("wholesale_price"),
        retail_price: form.text("retail_price"),
        reference: form.text("reference"),
        has_photo: photo.is_some(),
    };

    let product = match draft.validate() {
        Ok(product) => product,
        Err(errors) => {
            tracing::debug!(count = errors.len(), "Product form rejected");
            let mut page = AddProductTemplate::new(layout, draft);
            page.errors = FieldErrorsView::from(&errors);
            return Ok(page.into_response());
        }
    };
    let Some(photo) = photo else {
        let mut page = AddProductTemplate::new(layout, draft);
        page.errors.photo = Some(ProductField::Photo.message());
        return Ok(page.into_response());
    };

    match state.api().add_product(&auth.token, &product, photo).await {
        Ok(()) => {
            add_breadcrumb("product", "Added product", Some(&[("name", product.name.as_str())]));
            tracing::info!(name = %product.name, "Product added");
            let mut page = AddProductTemplate::new(layout, ProductDraft::default());
            page.success = Some(messages::PRODUCT_ADDED);
            Ok(page.into_response())
        }
        Err(ApiError::Unauthorized) => {
            tracing::info!("Token rejected while adding a product");
            let mut page = AddProductTemplate::new(layout, draft);
            page.layout.user = None;
            page.layout.is_superuser = false;
            page.error = Some(messages::SESSION_EXPIRED);
            let mut response = page.into_response();
            response.extensions_mut().insert(SessionExpired);
            Ok(response)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add product");
            let mut page = AddProductTemplate::new(layout, draft);
            page.error = Some(product_error_message(&e));
            Ok(page.into_response())
        }
    }
}

fn product_error_message(err: &ApiError) -> &'static str {
    match err.kind() {
        ApiErrorKind::Validation => messages::INVALID_DATA,
        ApiErrorKind::Network => messages::CONNECTION_ERROR,
        ApiErrorKind::Auth | ApiErrorKind::Other => messages::PRODUCT_ERROR,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_error_messages() {
        assert_eq!(
            product_error_message(&ApiError::Validation("{}".to_string())),
            "Dados inválidos. Verifique as informações."
        );
        assert_eq!(
            product_error_message(&ApiError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            }),
            "Erro ao adicionar o produto. Tente novamente."
        );
    }

    #[test]
    fn test_field_errors_view() {
        let errors = ProductDraft::default().validate().unwrap_err();
        let view = FieldErrorsView::from(&errors);
        assert_eq!(view.name, Some("Nome do produto é obrigatório."));
        assert_eq!(view.photo, Some("A foto do produto é obrigatória."));
    }
}
