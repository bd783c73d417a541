//! Implements `FieldVisitService` over HTTP using `reqwest`.

use crate::api::{FieldVisitService, Progress, SubmissionReceipt};
use crate::error::Res;
use crate::model::FieldVisitRecord;
use anyhow::{bail, Context};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use url::Url;

/// Creates visits with `POST {base}/field-visits` and uploads each photo with
/// `POST {base}/field-visits/{id}/photos`.
pub(crate) struct HttpFieldVisitService {
    base: Url,
    token: Option<String>,
    client: reqwest::Client,
}

/// The body returned when a visit is created. Some deployments use numeric ids.
#[derive(Debug, Deserialize)]
struct Created {
    id: serde_json::Value,
}

impl HttpFieldVisitService {
    pub(crate) fn new(service_url: &str, token: Option<String>) -> Res<Self> {
        Self::with_client(service_url, token, reqwest::Client::new())
    }

    fn with_client(service_url: &str, token: Option<String>, client: reqwest::Client) -> Res<Self> {
        Ok(Self {
            base: base_url(service_url)?,
            token,
            client,
        })
    }

    fn visits_url(&self) -> Res<Url> {
        self.base
            .join("field-visits")
            .context("Unable to build the field-visits URL")
    }

    fn photos_url(&self, id: &str) -> Res<Url> {
        self.base
            .join(&format!("field-visits/{id}/photos"))
            .with_context(|| format!("Unable to build the photos URL for visit {id}"))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl FieldVisitService for HttpFieldVisitService {
    async fn create_field_visit(
        &mut self,
        record: &FieldVisitRecord,
        photos: &[String],
        mut progress: Progress,
    ) -> Res<SubmissionReceipt> {
        let total = 1 + photos.len();
        progress.report(0);

        // Read every photo before the record is sent; a bad photo must leave nothing stored.
        let mut parts = Vec::with_capacity(photos.len());
        for photo in photos {
            parts.push(photo_part(photo).await?);
        }

        let url = self.visits_url()?;
        trace!("POST {url}");
        let response = self
            .authorize(self.client.post(url))
            .json(record)
            .send()
            .await
            .context("Failed to reach the field-visit service")?;
        let created: Created = ensure_success(response)
            .await?
            .json()
            .await
            .context("Failed to parse the field-visit service response")?;
        let id = match created.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        debug!("Created field visit {id}");
        progress.report_steps(1, total);

        for (ix, part) in parts.into_iter().enumerate() {
            let form = Form::new().part("photo", part);
            let url = self.photos_url(&id)?;
            trace!("POST {url} (photo {})", ix + 1);
            let response = self
                .authorize(self.client.post(url))
                .multipart(form)
                .send()
                .await
                .with_context(|| format!("Failed to upload photo {}", ix + 1))?;
            ensure_success(response).await?;
            progress.report_steps(ix + 2, total);
        }

        Ok(SubmissionReceipt {
            id,
            photos: photos.len(),
        })
    }
}

/// Parses the configured service URL, making sure relative joins land beneath its path.
fn base_url(service_url: &str) -> Res<Url> {
    let trimmed = service_url.trim();
    if trimmed.is_empty() {
        bail!("No service URL is configured, run 'fieldsales init --service-url <URL>'");
    }
    let mut url =
        Url::parse(trimmed).with_context(|| format!("Invalid service URL '{trimmed}'"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Passes successful responses through, and turns anything else into an error carrying the
/// service's own message.
async fn ensure_success(response: Response) -> Res<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{}", service_message(status, &body))
}

/// Picks the most useful message out of an error response.
fn service_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = json.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        format!(
            "The field-visit service responded with {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    } else {
        body.to_string()
    }
}

/// Reads a photo into a multipart part. Photos are local files given as a path or `file://` URI.
async fn photo_part(photo: &str) -> Res<Part> {
    let path = photo_path(photo)?;
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Unable to read photo {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo".to_string());
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_type(&path))
        .context("Invalid photo MIME type")
}

fn photo_path(photo: &str) -> Res<PathBuf> {
    match Url::parse(photo) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| anyhow::anyhow!("Invalid file URI '{photo}'")),
        // A single letter scheme is a Windows drive, not a URI.
        Ok(url) if url.scheme().len() > 1 => {
            bail!("Unsupported photo URI '{photo}', only local files can be uploaded")
        }
        _ => Ok(PathBuf::from(photo)),
    }
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "heic" => "image/heic",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
