use crate::MayaError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_NAMESPACE: &str = "default";

/// Address and request settings of a maya-apiserver, resolved once per
/// lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
  base: Url,
  namespace: String,
  version: String,
  timeout: Duration,
}

impl ProviderConfig {
  pub fn new(base: Url, namespace: impl Into<String>) -> Self {
    ProviderConfig {
      base,
      namespace: namespace.into(),
      version: DEFAULT_VERSION.to_owned(),
      timeout: DEFAULT_TIMEOUT,
    }
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  #[inline]
  pub fn base(&self) -> &Url {
    &self.base
  }

  /// Namespace the maya-apiserver runs in.
  #[inline]
  pub fn namespace(&self) -> &str {
    &self.namespace
  }

  #[inline]
  pub fn version(&self) -> &str {
    &self.version
  }

  /// Applied to every request; requests are never retried.
  #[inline]
  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  /// `{base}/{version}/volumes`
  pub fn volumes_url(&self) -> Result<Url, MayaError> {
    self.api_url(&[])
  }

  /// `{base}/{version}/volumes/delete/{name}`
  pub fn volume_delete_url(&self, name: &str) -> Result<Url, MayaError> {
    self.api_url(&["delete", name])
  }

  /// `{base}/{version}/volumes/info/{name}`
  pub fn volume_info_url(&self, name: &str) -> Result<Url, MayaError> {
    self.api_url(&["info", name])
  }

  /// Only scheme, host and port of the base address are kept.
  fn api_url(&self, segments: &[&str]) -> Result<Url, MayaError> {
    let version = self.version.trim().trim_matches('/');
    if version.is_empty() {
      return Err(MayaError::InvalidVersion);
    }

    let host = self
      .base
      .host()
      .ok_or_else(|| MayaError::InvalidBase(self.base.to_string()))?;
    let origin = match self.base.port() {
      Some(port) => format!("{}://{}:{}", self.base.scheme(), host, port),
      None => format!("{}://{}", self.base.scheme(), host),
    };

    let mut url = Url::parse(&origin)?;
    url
      .path_segments_mut()
      .map_err(|_| MayaError::InvalidBase(self.base.to_string()))?
      .clear()
      .extend(version.split('/'))
      .push("volumes")
      .extend(segments);

    Ok(url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn config(base: &str) -> ProviderConfig {
    ProviderConfig::new(Url::parse(base).unwrap(), DEFAULT_NAMESPACE)
  }

  #[test]
  fn builds_volume_urls() {
    let config = config("https://default.svc.cluster.local:5656");

    assert_eq!(
      config.volumes_url().unwrap().as_str(),
      "https://default.svc.cluster.local:5656/latest/volumes"
    );
    assert_eq!(
      config.volume_delete_url("pvc-1212").unwrap().as_str(),
      "https://default.svc.cluster.local:5656/latest/volumes/delete/pvc-1212"
    );
    assert_eq!(
      config.volume_info_url("pvc-1212").unwrap().as_str(),
      "https://default.svc.cluster.local:5656/latest/volumes/info/pvc-1212"
    );
  }

  #[test]
  fn drops_path_query_and_credentials_of_base() {
    let config = config("http://user:pw@10.0.0.1:5656/some/path?x=1#frag");

    assert_eq!(
      config.volumes_url().unwrap().as_str(),
      "http://10.0.0.1:5656/latest/volumes"
    );
  }

  #[test_case("" ; "empty")]
  #[test_case("   " ; "whitespace")]
  #[test_case("/" ; "slash")]
  fn rejects_empty_version(version: &str) {
    let config = config("http://10.0.0.1:5656").with_version(version);

    assert!(matches!(config.volumes_url(), Err(MayaError::InvalidVersion)));
    assert!(matches!(
      config.volume_info_url("pvc-1"),
      Err(MayaError::InvalidVersion)
    ));
  }

  #[test_case("latest" => "http://10.0.0.1:5656/latest/volumes/info/pvc-1" ; "plain")]
  #[test_case("/latest" => "http://10.0.0.1:5656/latest/volumes/info/pvc-1" ; "leading slash")]
  #[test_case("v1alpha1" => "http://10.0.0.1:5656/v1alpha1/volumes/info/pvc-1" ; "other version")]
  fn version_segment(version: &str) -> String {
    config("http://10.0.0.1:5656")
      .with_version(version)
      .volume_info_url("pvc-1")
      .unwrap()
      .to_string()
  }

  #[test]
  fn volume_names_are_escaped() {
    let url = config("http://10.0.0.1:5656")
      .volume_delete_url("a/b c")
      .unwrap();

    assert_eq!(url.as_str(), "http://10.0.0.1:5656/latest/volumes/delete/a%2Fb%20c");
  }
}
