use crate::{
  config::{DEFAULT_TIMEOUT, DEFAULT_VERSION},
  ProviderConfig, ResolveError,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_SERVICE: &str = "maya-apiserver-service";
pub const DEFAULT_PORT: u16 = 5656;

/// Finds the maya-apiserver for a lifecycle call.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
  async fn resolve(&self) -> Result<ProviderConfig, ResolveError>;
}

/// Always resolves to the same address.
#[derive(Debug, Clone)]
pub struct StaticEndpoint(ProviderConfig);

impl StaticEndpoint {
  pub fn new(config: ProviderConfig) -> Self {
    StaticEndpoint(config)
  }
}

#[async_trait]
impl EndpointResolver for StaticEndpoint {
  async fn resolve(&self) -> Result<ProviderConfig, ResolveError> {
    Ok(self.0.clone())
  }
}

/// Resolves the maya-apiserver service through cluster DNS on every
/// call, so a recreated service is picked up without a restart.
#[derive(Debug, Clone)]
pub struct ServiceResolver {
  service: String,
  namespace: String,
  port: u16,
  version: String,
  timeout: Duration,
}

impl ServiceResolver {
  pub fn new(namespace: impl Into<String>) -> Self {
    ServiceResolver {
      service: DEFAULT_SERVICE.to_owned(),
      namespace: namespace.into(),
      port: DEFAULT_PORT,
      version: DEFAULT_VERSION.to_owned(),
      timeout: DEFAULT_TIMEOUT,
    }
  }

  pub fn with_service(mut self, service: impl Into<String>) -> Self {
    self.service = service.into();
    self
  }

  pub fn with_port(mut self, port: u16) -> Self {
    self.port = port;
    self
  }

  pub fn with_version(mut self, version: impl Into<String>) -> Self {
    self.version = version.into();
    self
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Fully qualified DNS name of the service.
  pub fn host(&self) -> String {
    format!("{}.{}.svc.cluster.local", self.service, self.namespace)
  }
}

#[async_trait]
impl EndpointResolver for ServiceResolver {
  #[instrument(name = "maya.resolve", skip(self), fields(host))]
  async fn resolve(&self) -> Result<ProviderConfig, ResolveError> {
    let host = self.host();
    tracing::Span::current().record("host", &host.as_str());

    let mut addrs = tokio::net::lookup_host((host.as_str(), self.port))
      .await
      .map_err(|source| ResolveError::Lookup {
        host: host.clone(),
        source,
      })?;
    let addr = addrs
      .next()
      .ok_or_else(|| ResolveError::NoAddress { host: host.clone() })?;

    let base = Url::parse(&format!("http://{}", addr))?;
    debug!(%base, "resolved maya-apiserver");

    Ok(
      ProviderConfig::new(base, self.namespace.clone())
        .with_version(self.version.clone())
        .with_timeout(self.timeout),
    )
  }
}
