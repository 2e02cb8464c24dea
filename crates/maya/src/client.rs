use crate::{MayaError, ProviderConfig, VolumeApi, VolumeList, VolumeRecord, VolumeSpec};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use tracing::{debug, error, info, instrument};
use url::Url;

const YAML_CONTENT_TYPE: &str = "application/yaml";

/// HTTP client for the maya-apiserver volume endpoints.
#[derive(Debug, Clone, Default)]
pub struct MayaClient {
  http: reqwest::Client,
}

impl MayaClient {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_client(http: reqwest::Client) -> Self {
    MayaClient { http }
  }

  async fn send(
    &self,
    url: &Url,
    request: reqwest::RequestBuilder,
  ) -> Result<reqwest::Response, MayaError> {
    request.send().await.map_err(|source| {
      error!(%url, error = %source, "error when connecting to maya-apiserver");
      MayaError::Transport {
        url: url.clone(),
        source,
      }
    })
  }

  async fn read_body(&self, url: &Url, response: reqwest::Response) -> Result<String, MayaError> {
    response.text().await.map_err(|source| {
      error!(%url, error = %source, "unable to read response from maya-apiserver");
      MayaError::Transport {
        url: url.clone(),
        source,
      }
    })
  }
}

fn check_status(url: &Url, status: StatusCode) -> Result<(), MayaError> {
  if status == StatusCode::OK {
    return Ok(());
  }

  error!(%url, %status, "error response from maya-apiserver");
  Err(MayaError::Status {
    url: url.clone(),
    status,
  })
}

fn decode<T: serde::de::DeserializeOwned>(url: &Url, body: &str) -> Result<T, MayaError> {
  serde_json::from_str(body).map_err(|source| {
    error!(%url, error = %source, "unable to decode response from maya-apiserver");
    MayaError::Decode {
      url: url.clone(),
      source,
    }
  })
}

#[async_trait]
impl VolumeApi for MayaClient {
  #[instrument(name = "maya.describe", skip(self, config), fields(url))]
  async fn describe(
    &self,
    config: &ProviderConfig,
    name: &str,
  ) -> Result<Option<VolumeRecord>, MayaError> {
    let url = config.volume_info_url(name)?;
    tracing::Span::current().record("url", &url.as_str());

    let request = self.http.get(url.clone()).timeout(config.timeout());
    let response = self.send(&url, request).await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
      debug!("volume not found");
      return Ok(None);
    }

    check_status(&url, status)?;
    let body = self.read_body(&url, response).await?;
    let record = decode::<VolumeRecord>(&url, &body)?;
    debug!(annotations = ?record.annotations(), "volume details retrieved");
    Ok(Some(record))
  }

  #[instrument(name = "maya.create", skip(self, config, spec), fields(volume = spec.name(), url))]
  async fn create(&self, config: &ProviderConfig, spec: &VolumeSpec) -> Result<(), MayaError> {
    let url = config.volumes_url()?;
    tracing::Span::current().record("url", &url.as_str());

    let yaml = spec.to_yaml()?;
    debug!("volume spec created:\n{}", yaml);

    let request = self
      .http
      .post(url.clone())
      .header(CONTENT_TYPE, YAML_CONTENT_TYPE)
      .body(yaml)
      .timeout(config.timeout());
    let response = self.send(&url, request).await?;
    check_status(&url, response.status())?;

    let body = self.read_body(&url, response).await?;
    info!("volume successfully created:\n{}", body);
    Ok(())
  }

  #[instrument(name = "maya.delete", skip(self, config), fields(url))]
  async fn delete(&self, config: &ProviderConfig, name: &str) -> Result<(), MayaError> {
    let url = config.volume_delete_url(name)?;
    tracing::Span::current().record("url", &url.as_str());

    let request = self.http.get(url.clone()).timeout(config.timeout());
    let response = self.send(&url, request).await?;
    check_status(&url, response.status())?;

    info!("volume deletion successfully initiated");
    Ok(())
  }

  #[instrument(name = "maya.list", skip(self, config), fields(url))]
  async fn list(&self, config: &ProviderConfig) -> Result<Vec<VolumeRecord>, MayaError> {
    let url = config.volumes_url()?;
    tracing::Span::current().record("url", &url.as_str());

    let request = self.http.get(url.clone()).timeout(config.timeout());
    let response = self.send(&url, request).await?;
    check_status(&url, response.status())?;

    let body = self.read_body(&url, response).await?;
    let volumes = decode::<VolumeList>(&url, &body)?.into_items();
    debug!(count = volumes.len(), "volume list retrieved");
    Ok(volumes)
  }
}
