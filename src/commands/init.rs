use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its subdirectories and an initial `config.json`, and stores the
/// service token when one is given.
///
/// # Arguments
/// - `home` - The directory that will be the root of the home directory, e.g. `$HOME/fieldsales`
/// - `service_url` - The base URL of the field-visit service. May be empty.
/// - `branch` - The branch label printed on quotations.
/// - `token` - A bearer token for the field-visit service.
///
/// # Errors
/// - Returns an error if any file operations fail or the service URL is not a URL.
pub async fn init(
    home: &Path,
    service_url: &str,
    branch: Option<&str>,
    token: Option<&str>,
) -> Result<Out<()>> {
    let config = Config::create(home, service_url, branch)
        .await
        .context("Unable to create the home directory and config")
        .pub_result(ErrorType::Config)?;
    if let Some(token) = token {
        config.save_token(token).await.pub_result(ErrorType::Io)?;
    }
    Ok(format!(
        "Successfully created the fieldsales directory at {}. Put logo.png and signature.png in {}",
        config.root().display(),
        config.assets().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TokenFile;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_with_token() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("fs");
        let out = init(&home, "https://visits.example.com", Some("Goa"), Some("t0k"))
            .await
            .unwrap();
        assert!(out.message().contains("Successfully created"));

        let config = Config::load(&home).await.unwrap();
        assert_eq!(config.branch_label(), "Goa");
        let token = TokenFile::load(config.token_path()).await.unwrap();
        assert_eq!(token.token(), "t0k");
    }

    #[tokio::test]
    async fn test_init_bad_url_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = init(dir.path(), "::not-a-url::", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
