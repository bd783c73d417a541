//! The bearer token used to authenticate against the field-visit service, stored as
//! `$FIELDSALES_HOME/.secrets/token.json`.

use crate::error::Res;
use crate::utils;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// The on-disk shape of the token file.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
struct Token {
    token: String,
}

/// A token file: where it lives and what it holds.
#[derive(Debug, Clone)]
pub(crate) struct TokenFile {
    path: PathBuf,
    data: Token,
}

impl TokenFile {
    pub(crate) fn new(path: impl Into<PathBuf>, token: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data: Token {
                token: token.into(),
            },
        }
    }

    pub(crate) async fn load(path: impl Into<PathBuf>) -> Res<Self> {
        let path = path.into();
        let data: Token = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    /// Loads the token if the file exists. A missing file means the service is used without
    /// authentication.
    pub(crate) async fn load_optional(path: impl Into<PathBuf>) -> Res<Option<Self>> {
        let path = path.into();
        if !path.is_file() {
            debug!("No token file at {}", path.display());
            return Ok(None);
        }
        Ok(Some(Self::load(path).await?))
    }

    /// Writes the token, readable only by the owner on Unix-like systems.
    pub(crate) async fn save(&self) -> Res<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize token")?;
        utils::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .context("Failed to set file permissions")?;
        }
        Ok(())
    }

    pub(crate) fn token(&self) -> &str {
        &self.data.token
    }
}
