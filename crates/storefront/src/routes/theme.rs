//! Light/dark theme toggle.

use axum::{Form, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::models::keys;

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    #[serde(default)]
    pub return_to: String,
}

/// Flip the session's dark mode flag and go back to the page the toggle
/// was pressed on.
pub async fn toggle(session: Session, Form(form): Form<ThemeForm>) -> Result<Redirect> {
    let dark_mode: bool = session.get(keys::DARK_MODE).await?.unwrap_or(false);
    session.insert(keys::DARK_MODE, !dark_mode).await?;
    Ok(Redirect::to(local_path(&form.return_to)))
}

/// `target` when it is a path on this site, `/` otherwise.
fn local_path(target: &str) -> &str {
    let is_local = target.starts_with('/')
        && !target.starts_with("//")
        && !target.contains('\\')
        && !target.chars().any(char::is_control);
    if is_local { target } else { "/" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("/profile"), "/profile");
        assert_eq!(local_path("/?banner=1"), "/?banner=1");
        assert_eq!(local_path(""), "/");
        assert_eq!(local_path("//evil.example"), "/");
        assert_eq!(local_path("https://evil.example"), "/");
        assert_eq!(local_path("/\\evil.example"), "/");
    }
}
