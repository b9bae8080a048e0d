//! User-facing messages.
//!
//! Redirects carry a short code in `?error=` or `?success=`; pages turn it
//! back into text with [`error_message`] and [`success_message`].

pub const CONNECTION_ERROR: &str = "Erro ao conectar ao servidor. Tente novamente.";
pub const INVALID_CREDENTIALS: &str = "Credenciais incorretas. Tente novamente!";
pub const LOGIN_SUCCESS: &str = "Logado com Sucesso ! Aguarde";
pub const REDIRECTING: &str = "Aguarde, você será redirecionado ao lobby de compras";
pub const REGISTER_ERROR: &str = "Erro ao registrar o usuário";
pub const REGISTER_SUCCESS: &str = "Registrado com sucesso!";
pub const SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente para continuar.";
pub const INVALID_DATA: &str = "Dados inválidos. Verifique as informações.";
pub const PRODUCT_ADDED: &str = "Produto adicionado com sucesso!";
pub const PRODUCT_ERROR: &str = "Erro ao adicionar o produto. Tente novamente.";
pub const MISSING_LOGIN_FIELDS: &str = "Preencha o email e a senha.";
pub const MISSING_REGISTER_FIELDS: &str = "Preencha todos os campos.";
pub const INVALID_EMAIL: &str = "Informe um email válido.";
pub const ADDRESS_ADDED: &str = "Endereço adicionado.";
pub const ADDRESS_REMOVED: &str = "Endereço removido.";
pub const ADDRESS_DEFAULT: &str = "Endereço padrão atualizado.";
pub const ADDRESS_ERROR: &str = "Erro ao salvar o endereço. Tente novamente.";
pub const AVATAR_UPDATED: &str = "Avatar atualizado com sucesso!";
pub const AVATAR_ERROR: &str = "Erro ao atualizar o avatar";
pub const AVATAR_NOT_IMAGE: &str = "Envie um arquivo de imagem.";
pub const PRODUCTS_ERROR: &str = "Erro ao carregar os produtos. Tente novamente.";

/// Message for an `?error=` code.
#[must_use]
pub fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "session_expired" => Some(SESSION_EXPIRED),
        "connection" => Some(CONNECTION_ERROR),
        "address" => Some(ADDRESS_ERROR),
        "address_limit" => Some("Limite de 3 endereços atingido"),
        "address_not_found" => Some("Endereço não encontrado"),
        "avatar" => Some(AVATAR_ERROR),
        "avatar_type" => Some(AVATAR_NOT_IMAGE),
        _ => None,
    }
}

/// Message for a `?success=` code.
#[must_use]
pub fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "address_added" => Some(ADDRESS_ADDED),
        "address_removed" => Some(ADDRESS_REMOVED),
        "address_default" => Some(ADDRESS_DEFAULT),
        "avatar" => Some(AVATAR_UPDATED),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use viafitness_core::AddressBookError;

    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(error_message("session_expired"), Some(SESSION_EXPIRED));
        assert_eq!(error_message("nope"), None);
        assert_eq!(success_message("avatar"), Some(AVATAR_UPDATED));
    }

    #[test]
    fn test_limit_message_matches_core() {
        assert_eq!(
            error_message("address_limit").map(str::to_owned),
            Some(AddressBookError::LimitReached.to_string())
        );
    }
}
