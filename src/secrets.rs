use helpdesk_api::Credentials;

use crate::error::AppError;

/// Builds run credentials from the login plus either an API token or a password. Nothing is persisted.
pub fn resolve_credentials(
    user: Option<&str>,
    password: Option<&str>,
    api_token: Option<&str>,
) -> Result<Credentials, AppError> {
    let user = user
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Config("an agent login is required (--user or HELPDESK_USER)".into()))?;

    let credentials = match (non_empty(api_token), non_empty(password)) {
        (Some(token), _) => Credentials::api_token(user, token)?,
        (None, Some(password)) => Credentials::new(user, password)?,
        (None, None) => {
            return Err(AppError::Config(
                "a password or API token is required (HELPDESK_PASSWORD or HELPDESK_TOKEN)".into(),
            ))
        }
    };
    Ok(credentials)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::resolve_credentials;

    #[test]
    fn token_takes_the_token_identity() {
        let creds = resolve_credentials(Some("agent@example.com"), None, Some("tok")).unwrap();
        assert_eq!(creds.identity(), "agent@example.com/token");
        assert_eq!(creds.secret(), "tok");
    }

    #[test]
    fn password_is_used_verbatim() {
        let creds = resolve_credentials(Some(" agent@example.com "), Some("pw"), None).unwrap();
        assert_eq!(creds.identity(), "agent@example.com");
        assert_eq!(creds.secret(), "pw");
    }

    #[test]
    fn missing_pieces_are_configuration_errors() {
        assert!(resolve_credentials(None, Some("pw"), None).is_err());
        assert!(resolve_credentials(Some("agent@example.com"), None, None).is_err());
        assert!(resolve_credentials(Some("agent@example.com"), Some(""), Some("")).is_err());
    }
}
