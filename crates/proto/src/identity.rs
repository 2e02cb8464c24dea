use crate::{proto, utils::Record, ControllerService};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

pub(crate) struct Identity<T: ControllerService>(pub(crate) Arc<T>);

#[async_trait]
impl<T: ControllerService> proto::identity_server::Identity for Identity<T> {
  #[instrument(
    name = "identity.get_plugin_info",
    skip(self, _request),
    fields(name, vendor_version, manifest)
  )]
  async fn get_plugin_info(
    &self,
    _request: tonic::Request<proto::GetPluginInfoRequest>,
  ) -> Result<tonic::Response<proto::GetPluginInfoResponse>, tonic::Status> {
    let name = self.0.name().record_field("name");
    if name.is_empty() {
      return Err(tonic::Status::unavailable("plugin name is not configured"));
    }

    let response = proto::GetPluginInfoResponse {
      name: name.into(),
      vendor_version: self.0.version().record_field("vendor_version").into(),
      manifest: self.0.manifest().record_field("manifest").clone(),
    };

    Ok(tonic::Response::new(response))
  }

  #[instrument(
    name = "identity.get_plugin_capabilities",
    skip(self, _request),
    fields(response)
  )]
  async fn get_plugin_capabilities(
    &self,
    _request: tonic::Request<proto::GetPluginCapabilitiesRequest>,
  ) -> Result<tonic::Response<proto::GetPluginCapabilitiesResponse>, tonic::Status> {
    let capabilities = vec![proto::PluginCapability {
      r#type: Some(proto::plugin_capability::Type::Service(
        proto::plugin_capability::Service {
          r#type: proto::plugin_capability::service::Type::ControllerService.into(),
        },
      )),
    }];

    let response = proto::GetPluginCapabilitiesResponse { capabilities }.record_response();
    Ok(tonic::Response::new(response))
  }

  #[instrument(name = "identity.probe", skip(self, _request), fields(ready))]
  async fn probe(
    &self,
    _request: tonic::Request<proto::ProbeRequest>,
  ) -> Result<tonic::Response<proto::ProbeResponse>, tonic::Status> {
    let response = proto::ProbeResponse {
      ready: Some(self.0.ready().record_field("ready")),
    };

    Ok(tonic::Response::new(response))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    controller::{
      ValidateVolumeCapabilitiesError, ValidateVolumeCapabilitiesRequest,
      ValidateVolumeCapabilitiesResponse,
    },
    proto::identity_server::Identity as _,
    IdentityService,
  };

  struct Plugin {
    ready: bool,
  }

  impl IdentityService for Plugin {
    fn name(&self) -> &str {
      "test.csi.example.com"
    }

    fn version(&self) -> &str {
      "1.2.3"
    }

    fn ready(&self) -> bool {
      self.ready
    }
  }

  #[async_trait]
  impl ControllerService for Plugin {
    async fn validate_volume_capabilities(
      &self,
      _request: ValidateVolumeCapabilitiesRequest,
    ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError> {
      Ok(ValidateVolumeCapabilitiesResponse::NotConfirmed(None))
    }
  }

  fn identity(ready: bool) -> Identity<Plugin> {
    Identity(Arc::new(Plugin { ready }))
  }

  #[tokio::test]
  async fn plugin_info() {
    let response = identity(true)
      .get_plugin_info(tonic::Request::new(proto::GetPluginInfoRequest {}))
      .await
      .expect("plugin info")
      .into_inner();

    assert_eq!(response.name, "test.csi.example.com");
    assert_eq!(response.vendor_version, "1.2.3");
    assert!(response.manifest.is_empty());
  }

  #[tokio::test]
  async fn advertises_controller_service() {
    let response = identity(true)
      .get_plugin_capabilities(tonic::Request::new(
        proto::GetPluginCapabilitiesRequest {},
      ))
      .await
      .expect("capabilities")
      .into_inner();

    assert_eq!(response.capabilities.len(), 1);
    match &response.capabilities[0].r#type {
      Some(proto::plugin_capability::Type::Service(service)) => assert_eq!(
        service.r#type,
        proto::plugin_capability::service::Type::ControllerService as i32
      ),
      other => panic!("unexpected capability {:?}", other),
    }
  }

  #[tokio::test]
  async fn probe_reports_readiness() {
    let response = identity(false)
      .probe(tonic::Request::new(proto::ProbeRequest {}))
      .await
      .expect("probe")
      .into_inner();

    assert_eq!(response.ready, Some(false));
  }
}
