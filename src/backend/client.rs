use super::types::{CreateThreadParams, StagedFile, UploadedFile};
use super::{Persist, Upload};
use async_trait::async_trait;
use color_eyre::eyre::{self, WrapErr};
use color_eyre::Result;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;

/// HTTP client for a threads server.
///
/// - `POST /api/uploads` takes a multipart form of `files` and answers with a JSON
///   array of uploaded files.
/// - `POST /api/threads` takes a JSON [`CreateThreadParams`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("failed to build HTTP client")?;
        Ok(Self {
            base_url: parse_endpoint(endpoint)?,
            token,
            client,
        })
    }
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .wrap_err_with(|| format!("invalid path: {path}"))
    }
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl Upload for ApiClient {
    async fn upload(&self, files: Vec<StagedFile>) -> Result<Vec<UploadedFile>> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.name)
                .mime_str(&file.media_type)?;
            form = form.part("files", part);
        }
        let response = self
            .authorize(self.client.post(self.url("/api/uploads")?))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Persist for ApiClient {
    async fn create_thread(&self, params: CreateThreadParams) -> Result<()> {
        let response = self
            .authorize(self.client.post(self.url("/api/threads")?))
            .json(&params)
            .send()
            .await?
            .error_for_status()?;
        log::info!("thread created: {}", response.status());
        Ok(())
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let mut endpoint = endpoint.trim().to_string();
    if endpoint.is_empty() {
        return Err(eyre::eyre!("endpoint is empty"));
    }
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        endpoint = format!("https://{endpoint}");
    }
    // `Url::join` replaces the last segment unless the base ends with a slash
    if !endpoint.ends_with('/') {
        endpoint.push('/');
    }
    Url::parse(&endpoint).wrap_err_with(|| format!("invalid endpoint: {endpoint}"))
}
