// ABOUTME: Secret resolution from environment variables
// ABOUTME: Checked before any network activity, with a distinct message per variable

use crate::{Error, Result};
use std::env;

pub const INTEGRATION_TOKEN_VAR: &str = "NOTION_INTEGRATION_TOKEN";
pub const SESSION_TOKEN_VAR: &str = "NOTION_TOKEN";
const DEV_MODE_VAR: &str = "NOTEDOWN_ENV";

/// The two credentials a run needs: the integration token drives database
/// queries, the session token drives zipped page exports.
#[derive(Debug)]
pub struct Secrets {
    pub integration_token: String,
    pub session_token: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var(INTEGRATION_TOKEN_VAR).ok(),
            env::var(SESSION_TOKEN_VAR).ok(),
        )
    }

    fn from_vars(integration: Option<String>, session: Option<String>) -> Result<Self> {
        let integration_token = integration.filter(|t| !t.is_empty()).ok_or_else(|| {
            Error::Config(format!(
                "Provide {} env variable. See https://developers.notion.com/docs to know how to create an integration",
                INTEGRATION_TOKEN_VAR
            ))
        })?;

        let session_token = session.filter(|t| !t.is_empty()).ok_or_else(|| {
            Error::Config(format!(
                "Provide {} env variable (the notion.so token_v2 session cookie)",
                SESSION_TOKEN_VAR
            ))
        })?;

        Ok(Secrets {
            integration_token,
            session_token,
        })
    }
}

/// Development mode also syncs unpublished posts for local preview.
pub fn dev_mode() -> bool {
    env::var(DEV_MODE_VAR).as_deref() == Ok("development")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vars_both_present() {
        let secrets =
            Secrets::from_vars(Some("secret_abc".into()), Some("v02:token".into())).unwrap();
        assert_eq!(secrets.integration_token, "secret_abc");
        assert_eq!(secrets.session_token, "v02:token");
    }

    #[test]
    fn test_from_vars_missing_integration_token() {
        let err = Secrets::from_vars(None, Some("v02:token".into())).unwrap_err();
        assert!(err.to_string().contains(INTEGRATION_TOKEN_VAR));
    }

    #[test]
    fn test_from_vars_missing_session_token() {
        let err = Secrets::from_vars(Some("secret_abc".into()), None).unwrap_err();
        assert!(err.to_string().contains(SESSION_TOKEN_VAR));
    }

    #[test]
    fn test_from_vars_empty_counts_as_missing() {
        let err = Secrets::from_vars(Some(String::new()), Some("v02:token".into())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
