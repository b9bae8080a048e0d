//! Profile page: account data, avatar and the address book.
//!
//! Mutations redirect back to `/profile` with a `?success=` or `?error=`
//! code. The CEP lookup and a rejected add-address form re-render the page
//! directly so the typed values survive.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use viafitness_core::{
    Address, AddressBook, AddressBookError, AddressDraft, AddressDraftError, AddressId,
};

use crate::api::{ApiError, ApiErrorKind};
use crate::cep::CepLookupError;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::messages;
use crate::middleware::{AuthSession, RequireAuth, set_session_user};
use crate::routes::upload::UploadForm;
use crate::services::{AddressError, AddressService};
use crate::state::AppState;
use crate::views::{Layout, LayoutView};

/// Account data from `GET /profile/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub username: String,
    pub email: String,
    pub initials: String,
    pub avatar_url: Option<String>,
}

/// One saved address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressView {
    pub id: AddressId,
    pub summary: String,
    pub postal_code: String,
    pub complement: String,
    pub cpf: Option<String>,
    pub is_default: bool,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            summary: address.summary(),
            postal_code: address.postal_code_display(),
            complement: address.complement.clone(),
            cpf: address.cpf.clone().filter(|c| !c.is_empty()),
            is_default: address.is_default,
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub layout: LayoutView,
    pub profile: ProfileView,
    pub addresses: Vec<AddressView>,
    pub can_add: bool,
    pub max_addresses: usize,
    /// Values of the add-address form.
    pub draft: AddressDraft,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

/// Query parameters carrying the outcome of a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Load everything the profile page shows and render it.
///
/// A new avatar URL is copied into the session so the header follows.
async fn render_profile(
    state: &AppState,
    session: &Session,
    auth: &AuthSession,
    mut layout: LayoutView,
    draft: AddressDraft,
    error: Option<String>,
    success: Option<&'static str>,
) -> Result<Response> {
    let api = state.api();
    let profile = api.profile(&auth.token).await?;
    let avatar_url = match api.avatar(&auth.token).await {
        Ok(url) => url,
        Err(ApiError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };
    let book = AddressService::new(api, &auth.token).load().await?;

    if auth.user.avatar_url != avatar_url {
        let mut user = auth.user.clone();
        user.avatar_url.clone_from(&avatar_url);
        set_session_user(session, &user).await?;
        if let Some(header) = layout.user.as_mut() {
            header.avatar_url.clone_from(&avatar_url);
        }
    }

    let display_name = if auth.user.name.is_empty() {
        profile.username.as_str()
    } else {
        auth.user.name.as_str()
    };

    Ok(ProfileTemplate {
        layout,
        profile: ProfileView {
            initials: viafitness_core::initials(display_name),
            username: profile.username,
            email: profile.email,
            avatar_url,
        },
        addresses: book.iter().map(AddressView::from).collect(),
        can_add: !book.is_full(),
        max_addresses: AddressBook::MAX_ADDRESSES,
        draft,
        error,
        success,
    }
    .into_response())
}

/// Display the profile page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Layout(layout): Layout,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let error = query
        .error
        .as_deref()
        .and_then(messages::error_message)
        .map(str::to_string);
    let success = query.success.as_deref().and_then(messages::success_message);

    render_profile(
        &state,
        &session,
        &auth,
        layout,
        AddressDraft::default(),
        error,
        success,
    )
    .await
}

/// Fill the address form from the CEP typed into it.
#[instrument(skip_all)]
pub async fn lookup_cep(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Layout(layout): Layout,
    Form(mut draft): Form<AddressDraft>,
) -> Result<Response> {
    let error = match state.cep().lookup_input(&draft.postal_code).await {
        Ok(found) => {
            draft.postal_code = found.cep.formatted();
            draft.street = found.street;
            draft.neighborhood = found.neighborhood;
            draft.city = found.city;
            draft.state = found.state;
            None
        }
        Err(e) => {
            if matches!(
                e,
                CepLookupError::Http(_) | CepLookupError::Status(_) | CepLookupError::Url(_)
            ) {
                tracing::warn!(error = ?e, "CEP lookup failed");
            }
            Some(e.to_string())
        }
    };

    render_profile(&state, &session, &auth, layout, draft, error, None).await
}

/// Validate and save a new address.
#[instrument(skip_all)]
pub async fn add_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    Layout(layout): Layout,
    Form(draft): Form<AddressDraft>,
) -> Result<Response> {
    let address = match draft.validate() {
        Ok(address) => address,
        Err(e) => {
            return render_profile(
                &state,
                &session,
                &auth,
                layout,
                draft,
                Some(draft_error_message(e)),
                None,
            )
            .await;
        }
    };

    match AddressService::new(state.api(), &auth.token)
        .add(address)
        .await
    {
        Ok(book) => {
            add_breadcrumb("address", "Added address", None);
            tracing::info!(count = book.len(), "Address added");
            Ok(Redirect::to("/profile?success=address_added").into_response())
        }
        Err(AddressError::Api(ApiError::Unauthorized)) => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to add address");
            let message = address_error_message(&e);
            render_profile(
                &state,
                &session,
                &auth,
                layout,
                draft,
                Some(message.to_string()),
                None,
            )
            .await
        }
    }
}

/// Make an address the default one.
#[instrument(skip(state, auth))]
pub async fn set_default_address(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    let result = AddressService::new(state.api(), &auth.token)
        .set_default(id)
        .await;
    finish_mutation(result, "address_default")
}

/// Remove an address.
#[instrument(skip(state, auth))]
pub async fn remove_address(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<Redirect> {
    let result = AddressService::new(state.api(), &auth.token)
        .remove(id)
        .await;
    finish_mutation(result, "address_removed")
}

fn finish_mutation(
    result: std::result::Result<AddressBook, AddressError>,
    success: &str,
) -> Result<Redirect> {
    match result {
        Ok(_) => Ok(Redirect::to(&format!("/profile?success={success}"))),
        Err(AddressError::Api(ApiError::Unauthorized)) => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Address update failed");
            Ok(Redirect::to(&format!(
                "/profile?error={}",
                address_error_code(&e)
            )))
        }
    }
}

fn address_error_code(err: &AddressError) -> &'static str {
    match err {
        AddressError::Rule(AddressBookError::LimitReached) => "address_limit",
        AddressError::Rule(AddressBookError::NotFound(_)) | AddressError::Api(ApiError::NotFound) => {
            "address_not_found"
        }
        AddressError::Api(e) if e.kind() == ApiErrorKind::Network => "connection",
        AddressError::Api(_) => "address",
    }
}

fn address_error_message(err: &AddressError) -> &'static str {
    messages::error_message(address_error_code(err)).unwrap_or(messages::ADDRESS_ERROR)
}

fn draft_error_message(err: AddressDraftError) -> String {
    err.to_string()
}

/// Replace the avatar with an uploaded image.
#[instrument(skip_all)]
pub async fn upload_avatar(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(auth): RequireAuth,
    multipart: Multipart,
) -> Result<Redirect> {
    let mut form = UploadForm::read(multipart).await?;
    let Some(upload) = form.take_file("avatar").filter(|u| u.is_image()) else {
        return Ok(Redirect::to("/profile?error=avatar_type"));
    };

    match state.api().upload_avatar(&auth.token, upload).await {
        Ok(avatar_url) => {
            let mut user = auth.user;
            user.avatar_url = avatar_url;
            set_session_user(&session, &user).await?;
            Ok(Redirect::to("/profile?success=avatar"))
        }
        Err(ApiError::Unauthorized) => Err(AppError::SessionExpired),
        Err(e) => {
            tracing::warn!(error = %e, "Avatar upload failed");
            Ok(Redirect::to("/profile?error=avatar"))
        }
    }
}

#[cfg(test)]
mod tests {
    use viafitness_core::AddressField;

    use super::*;

    #[test]
    fn test_error_codes_have_messages() {
        let errors = [
            AddressError::Rule(AddressBookError::LimitReached),
            AddressError::Rule(AddressBookError::NotFound(AddressId::new(9))),
            AddressError::Api(ApiError::Validation(String::new())),
        ];
        for err in &errors {
            assert!(messages::error_message(address_error_code(err)).is_some());
        }
        assert_eq!(
            address_error_message(&errors[0]),
            "Limite de 3 endereços atingido"
        );
    }

    #[test]
    fn test_draft_error_message() {
        assert_eq!(
            draft_error_message(AddressDraftError::Missing(AddressField::Street)),
            "O campo Rua é obrigatório"
        );
    }
}
