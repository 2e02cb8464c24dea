use crate::Provisioner;
use async_trait::async_trait;
use csi_proto::{
  controller::{
    ControllerCapabilities, CreateVolumeError, CreateVolumeRequest, DeleteVolumeError,
    DeleteVolumeRequest, ListVolumesError, ListVolumesRequest, ListVolumesResponse,
    ValidateVolumeCapabilitiesError, ValidateVolumeCapabilitiesRequest,
    ValidateVolumeCapabilitiesResponse, Volume, VolumeListEntry,
  },
  node::{NodeGetInfoError, NodeGetInfoResponse},
  ControllerService, IdentityService, NodeService,
};
use static_assertions::assert_impl_all;

pub const DEFAULT_DRIVER_NAME: &str = "openebs-csi.openebs.io";

/// The CSI plugin: identity, controller and node services backed by a
/// [`Provisioner`].
pub struct OpenEbsPlugin {
  name: String,
  version: String,
  node_id: String,
  provisioner: Provisioner,
}

assert_impl_all!(OpenEbsPlugin: ControllerService, NodeService);

impl OpenEbsPlugin {
  pub fn new(name: impl Into<String>, node_id: impl Into<String>, provisioner: Provisioner) -> Self {
    OpenEbsPlugin {
      name: name.into(),
      version: env!("CARGO_PKG_VERSION").to_owned(),
      node_id: node_id.into(),
      provisioner,
    }
  }

  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}

impl IdentityService for OpenEbsPlugin {
  #[inline]
  fn name(&self) -> &str {
    &self.name
  }

  #[inline]
  fn version(&self) -> &str {
    &self.version
  }
}

#[async_trait]
impl ControllerService for OpenEbsPlugin {
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::CREATE_DELETE_VOLUME | ControllerCapabilities::LIST_VOLUMES
  }

  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, CreateVolumeError> {
    Ok(
      self
        .provisioner
        .create_volume(&request)
        .await
        .map_err(tonic::Status::from)?,
    )
  }

  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), DeleteVolumeError> {
    self
      .provisioner
      .delete_volume(request.volume_id())
      .await
      .map_err(tonic::Status::from)?;
    Ok(())
  }

  /// Every well-formed request succeeds without a confirmation, there
  /// is no capability matching.
  async fn validate_volume_capabilities(
    &self,
    _request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError> {
    Ok(ValidateVolumeCapabilitiesResponse::NotConfirmed(None))
  }

  async fn list_volumes(
    &self,
    request: ListVolumesRequest,
  ) -> Result<ListVolumesResponse, ListVolumesError> {
    let page = self
      .provisioner
      .list_volumes(request.max_entries(), request.starting_token())
      .await
      .map_err(tonic::Status::from)?;

    let entries = page.volumes.into_iter().map(VolumeListEntry::new).collect();
    Ok(ListVolumesResponse::new(entries, page.next_token))
  }
}

#[async_trait]
impl NodeService for OpenEbsPlugin {
  async fn node_get_info(&self) -> Result<NodeGetInfoResponse, NodeGetInfoError> {
    Ok(NodeGetInfoResponse::new(self.node_id.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::validate::STORAGE_CLASS_PARAMETER;
  use csi_proto::controller::{AccessMode, AccessType, VolumeCapability};
  use maya_client::{
    fake::FakeVolumeApi, ProviderConfig, StaticEndpoint, VolumeRecord,
  };
  use std::sync::Arc;
  use url::Url;

  fn plugin(api: Arc<FakeVolumeApi>) -> OpenEbsPlugin {
    let resolver = StaticEndpoint::new(ProviderConfig::new(
      Url::parse("http://10.0.0.1:5656").unwrap(),
      "default",
    ));
    OpenEbsPlugin::new(
      DEFAULT_DRIVER_NAME,
      "node-1",
      Provisioner::new(api, Arc::new(resolver)),
    )
  }

  #[tokio::test]
  async fn create_errors_keep_their_code() {
    let api = Arc::new(FakeVolumeApi::default());
    api.set_fail_create(true);

    let request = CreateVolumeRequest::new("pvc-1")
      .with_volume_capability(VolumeCapability::new(
        AccessMode::SingleNodeWriter,
        AccessType::Block,
      ))
      .with_parameter(STORAGE_CLASS_PARAMETER, "openebs");

    let err = plugin(api).create_volume(request).await.unwrap_err();
    assert_eq!(tonic::Status::from(err).code(), tonic::Code::Unavailable);
  }

  #[tokio::test]
  async fn delete_succeeds_when_remote_delete_fails() {
    let api = Arc::new(FakeVolumeApi::new(vec![VolumeRecord::new("pvc-1")]));
    api.set_fail_delete(true);

    plugin(api)
      .delete_volume(DeleteVolumeRequest::new("pvc-1"))
      .await
      .expect("delete is best effort");
  }

  #[tokio::test]
  async fn list_maps_entries() {
    let api = Arc::new(FakeVolumeApi::new(vec![
      VolumeRecord::new("pvc-1"),
      VolumeRecord::new("pvc-2"),
    ]));

    let response = plugin(api)
      .list_volumes(ListVolumesRequest::default())
      .await
      .expect("list succeeds");
    assert_eq!(response.entries().len(), 2);
    assert_eq!(response.entries()[1].volume().volume_id(), "pvc-2");
    assert_eq!(response.next_token(), None);
  }

  #[tokio::test]
  async fn node_info_reports_configured_node() {
    let info = plugin(Arc::new(FakeVolumeApi::default()))
      .node_get_info()
      .await
      .expect("node info");
    assert_eq!(info.node_id(), "node-1");
  }

  #[test]
  fn advertises_create_delete_and_list() {
    let capabilities = plugin(Arc::new(FakeVolumeApi::default())).capabilities();
    assert!(capabilities.contains(ControllerCapabilities::CREATE_DELETE_VOLUME));
    assert!(capabilities.contains(ControllerCapabilities::LIST_VOLUMES));
  }
}
