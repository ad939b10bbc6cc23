use anyhow::{Context, Result, anyhow};
use url::Url;

/// Reject URLs that do not name a database; sqlx would otherwise connect to
/// the login role's default database.
pub fn validate_database_url(raw: &str) -> Result<()> {
    let url = Url::parse(raw).context("invalid PostgreSQL URL")?;
    let name = url.path().trim_start_matches('/');
    if name.is_empty() {
        return Err(anyhow!("database URL must include database name"));
    }
    Ok(())
}

/// URL with the password masked, for logs.
pub fn redacted_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.into()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_database_name() {
        assert!(validate_database_url("postgres://user@localhost:5432/wayfare").is_ok());
        assert!(validate_database_url("postgres://user@localhost:5432").is_err());
        assert!(validate_database_url("not a url").is_err());
    }

    #[test]
    fn masks_password() {
        let redacted = redacted_database_url("postgres://wayfare:secret@db:5432/wayfare");
        assert_eq!(redacted, "postgres://wayfare:***@db:5432/wayfare");
        assert!(!redacted.contains("secret"));
    }
}
