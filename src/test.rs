//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestFieldVisitService;
use crate::Config;
use std::path::PathBuf;
use tempfile::TempDir;
use uuid::Uuid;

/// Test environment that sets up a fieldsales home directory with a Config.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment whose service URL is unique, so the in-memory service state is
    /// not shared with other tests.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("fieldsales");
        let service_url = format!("https://test.invalid/{}", Uuid::new_v4());
        let config = Config::create(&root, &service_url, None).await.unwrap();
        Self { temp_dir, config }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The in-memory service that `Mode::Test` uses for this environment.
    pub fn service(&self) -> TestFieldVisitService {
        TestFieldVisitService::new(self.config.service_url())
    }

    /// A path in the temp dir, outside the home directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `json` to `name` in the temp dir and returns its path.
    pub fn write_json(&self, name: &str, json: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, json).unwrap();
        path
    }
}
