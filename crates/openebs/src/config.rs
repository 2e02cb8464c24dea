use crate::{DeletePolicy, LookupPolicy, DEFAULT_DRIVER_NAME};
use clap::Parser;
use csi_proto::Endpoint;
use maya_client::{
  EndpointResolver, ProviderConfig, ServiceResolver, StaticEndpoint, DEFAULT_NAMESPACE,
  DEFAULT_PORT, DEFAULT_SERVICE, DEFAULT_VERSION,
};
use std::{sync::Arc, time::Duration};
use url::Url;

/// OpenEBS CSI controller plugin.
#[derive(Debug, Clone, Parser)]
#[command(name = "openebs-csi", version, about)]
pub struct Config {
  /// CSI endpoint, unix://<path> or tcp://<host>:<port>.
  #[arg(long, env = "CSI_ENDPOINT", default_value = "unix:///csi/csi.sock")]
  pub endpoint: Endpoint,

  /// Identifier of the node this plugin runs on.
  #[arg(long, env = "NODE_ID")]
  pub node_id: String,

  #[arg(long, env = "CSI_DRIVER_NAME", default_value = DEFAULT_DRIVER_NAME)]
  pub driver_name: String,

  /// Namespace the maya-apiserver service lives in.
  #[arg(long, env = "OPENEBS_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
  pub namespace: String,

  /// Fixed maya-apiserver address. Skips service lookup when set.
  #[arg(long, env = "MAYA_API_URL")]
  pub maya_api_url: Option<Url>,

  #[arg(long, env = "MAYA_API_SERVICE", default_value = DEFAULT_SERVICE)]
  pub maya_service: String,

  #[arg(long, env = "MAYA_API_PORT", default_value_t = DEFAULT_PORT)]
  pub maya_port: u16,

  /// Version segment of the maya-apiserver URLs.
  #[arg(long, env = "MAYA_API_VERSION", default_value = DEFAULT_VERSION)]
  pub api_version: String,

  /// Timeout of a single maya-apiserver request, in seconds.
  #[arg(long, env = "MAYA_REQUEST_TIMEOUT", default_value_t = 60)]
  pub request_timeout: u64,

  /// Fail creates when the first volume lookup fails instead of
  /// creating the volume.
  #[arg(long, env = "STRICT_LOOKUP")]
  pub strict_lookup: bool,

  /// Fail deletes when the maya-apiserver rejects them.
  #[arg(long, env = "STRICT_DELETE")]
  pub strict_delete: bool,
}

impl Config {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout)
  }

  pub fn lookup_policy(&self) -> LookupPolicy {
    if self.strict_lookup {
      LookupPolicy::Strict
    } else {
      LookupPolicy::Lenient
    }
  }

  pub fn delete_policy(&self) -> DeletePolicy {
    if self.strict_delete {
      DeletePolicy::Strict
    } else {
      DeletePolicy::BestEffort
    }
  }

  pub fn resolver(&self) -> Arc<dyn EndpointResolver> {
    match &self.maya_api_url {
      Some(url) => Arc::new(StaticEndpoint::new(
        ProviderConfig::new(url.clone(), self.namespace.clone())
          .with_version(self.api_version.clone())
          .with_timeout(self.request_timeout()),
      )),
      None => Arc::new(
        ServiceResolver::new(self.namespace.clone())
          .with_service(self.maya_service.clone())
          .with_port(self.maya_port)
          .with_version(self.api_version.clone())
          .with_timeout(self.request_timeout()),
      ),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  fn parse(args: &[&str]) -> Result<Config, clap::Error> {
    Config::try_parse_from(std::iter::once("openebs-csi").chain(args.iter().copied()))
  }

  #[test]
  fn defaults() {
    let config = parse(&["--node-id", "node-1"]).unwrap();

    assert_eq!(config.endpoint, Endpoint::Unix(PathBuf::from("/csi/csi.sock")));
    assert_eq!(config.driver_name, "openebs-csi.openebs.io");
    assert_eq!(config.maya_service, "maya-apiserver-service");
    assert_eq!(config.maya_port, 5656);
    assert_eq!(config.api_version, "latest");
    assert_eq!(config.request_timeout(), Duration::from_secs(60));
    assert_eq!(config.maya_api_url, None);
    assert_eq!(config.lookup_policy(), LookupPolicy::Lenient);
    assert_eq!(config.delete_policy(), DeletePolicy::BestEffort);
  }

  #[test]
  fn node_id_is_required() {
    // NODE_ID may be set in the environment running the tests.
    if std::env::var_os("NODE_ID").is_none() {
      assert!(parse(&[]).is_err());
    }
  }

  #[test]
  fn rejects_bad_endpoint() {
    assert!(parse(&["--node-id", "node-1", "--endpoint", "http://localhost"]).is_err());
  }

  #[test]
  fn overrides() {
    let config = parse(&[
      "--node-id",
      "node-1",
      "--endpoint",
      "tcp://127.0.0.1:10000",
      "--maya-api-url",
      "http://10.0.0.1:5656",
      "--request-timeout",
      "5",
      "--strict-lookup",
      "--strict-delete",
    ])
    .unwrap();

    assert_eq!(
      config.endpoint,
      Endpoint::Tcp(([127, 0, 0, 1], 10000).into())
    );
    assert_eq!(
      config.maya_api_url.as_ref().map(Url::as_str),
      Some("http://10.0.0.1:5656/")
    );
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.lookup_policy(), LookupPolicy::Strict);
    assert_eq!(config.delete_policy(), DeletePolicy::Strict);
  }

  #[tokio::test]
  async fn static_url_bypasses_service_lookup() {
    let config = parse(&[
      "--node-id",
      "node-1",
      "--maya-api-url",
      "http://10.0.0.1:5656",
      "--namespace",
      "openebs",
    ])
    .unwrap();

    let resolved = config.resolver().resolve().await.unwrap();
    assert_eq!(resolved.namespace(), "openebs");
    assert_eq!(
      resolved.volumes_url().unwrap().as_str(),
      "http://10.0.0.1:5656/latest/volumes"
    );
  }
}
