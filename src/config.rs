//! Configuration file handling for fieldsales.
//!
//! The configuration file is stored at `$FIELDSALES_HOME/config.json` and contains the field-visit
//! service URL, the branch label printed on quotations, and the locations of the logo, signature
//! and token files.

use crate::api::TokenFile;
use crate::error::Res;
use crate::utils;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "fieldsales";
const CONFIG_VERSION: u8 = 1;
const DEFAULT_BRANCH: &str = "Head Office";
const SECRETS: &str = ".secrets";
const QUOTATIONS: &str = "quotations";
const ASSETS: &str = "assets";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const LOGO_PNG: &str = "logo.png";
const SIGNATURE_PNG: &str = "signature.png";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FIELDSALES_HOME` and from there it loads `$FIELDSALES_HOME/config.json`. It
/// provides paths to other items that are either configurable or are expected in a certain
/// location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    quotations: PathBuf,
    assets: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g.
    ///   `$HOME/fieldsales`
    /// - `service_url` - The base URL of the field-visit service, e.g.
    ///   `https://visits.example.com/api`. May be empty when only quotations are used.
    /// - `branch_label` - The branch printed on quotations. `None` uses "Head Office".
    ///
    /// # Errors
    /// - Returns an error if the service URL is not a URL, in which case nothing is created.
    /// - Returns an error if any file operations fail.
    pub async fn create(
        dir: impl Into<PathBuf>,
        service_url: &str,
        branch_label: Option<&str>,
    ) -> Res<Self> {
        if !service_url.is_empty() {
            Url::parse(service_url)
                .with_context(|| format!("Invalid service URL '{service_url}'"))?;
        }

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the fieldsales home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let quotations = root.join(QUOTATIONS);
        utils::make_dir(&quotations).await?;
        let assets = root.join(ASSETS);
        utils::make_dir(&assets).await?;
        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile {
            service_url: service_url.to_string(),
            branch_label: branch_label.unwrap_or(DEFAULT_BRANCH).to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            quotations,
            assets,
            secrets,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory exists and that the config file exists
    /// - load the config file
    /// - validate that the quotations and secrets directories exist
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Res<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The fieldsales home directory is missing, run 'fieldsales init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            root: root.clone(),
            quotations: root.join(QUOTATIONS),
            assets: root.join(ASSETS),
            secrets: root.join(SECRETS),
            config_path,
            config_file,
        };
        if !config.quotations.is_dir() {
            bail!(
                "The quotations directory is missing '{}'",
                config.quotations.display()
            )
        }
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Where rendered quotation documents are written.
    pub fn quotations(&self) -> &Path {
        &self.quotations
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn service_url(&self) -> &str {
        &self.config_file.service_url
    }

    pub fn branch_label(&self) -> &str {
        &self.config_file.branch_label
    }

    /// Returns the stored `token_path` if it is absolute, otherwise resolves the relative path.
    pub fn token_path(&self) -> PathBuf {
        self.resolve(self.config_file.token_path())
    }

    /// The logo reference embedded in quotations, as a `file://` URI.
    pub fn logo_ref(&self) -> Res<String> {
        file_uri(&self.resolve(self.config_file.logo_path()))
    }

    /// The signature reference embedded in quotations, as a `file://` URI.
    pub fn signature_ref(&self) -> Res<String> {
        file_uri(&self.resolve(self.config_file.signature_path()))
    }

    /// Saves `token` to the token file so that submissions are authenticated.
    pub async fn save_token(&self, token: &str) -> Res<()> {
        TokenFile::new(self.token_path(), token)
            .save()
            .await
            .context("Unable to save the service token")
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

fn file_uri(path: &Path) -> Res<String> {
    Url::from_file_path(path)
        .map(|u| u.to_string())
        .map_err(|_| anyhow::anyhow!("Unable to express '{}' as a URI", path.display()))
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "fieldsales",
///   "config_version": 1,
///   "service_url": "https://visits.example.com/api",
///   "branch_label": "Pune Branch",
///   "logo_path": "assets/logo.png",
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "fieldsales"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the field-visit service
    #[serde(default)]
    service_url: String,

    /// Branch printed on quotations
    #[serde(default = "default_branch")]
    branch_label: String,

    /// Defaults to $FIELDSALES_HOME/assets/logo.png if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logo_path: Option<PathBuf>,

    /// Defaults to $FIELDSALES_HOME/assets/signature.png if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature_path: Option<PathBuf>,

    /// Defaults to $FIELDSALES_HOME/.secrets/token.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            service_url: String::new(),
            branch_label: default_branch(),
            logo_path: None,
            signature_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or belongs to another application.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version == CONFIG_VERSION,
            "Unsupported config_version {} in config file, expected {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn logo_path(&self) -> PathBuf {
        self.logo_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(ASSETS).join(LOGO_PNG))
    }

    fn signature_path(&self) -> PathBuf {
        self.signature_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(ASSETS).join(SIGNATURE_PNG))
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}
