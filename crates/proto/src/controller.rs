mod capabilities;
mod create_volume;
mod delete_volume;
mod list_volumes;
mod validate_volume_capabilities;

use crate::{
  proto,
  utils::{record_request, Record},
  IdentityService,
};
use async_trait::async_trait;
use std::{convert::TryInto, sync::Arc};
use tracing::instrument;

pub use crate::volume::*;
pub use capabilities::*;
pub use create_volume::*;
pub use delete_volume::*;
pub use list_volumes::*;
pub use validate_volume_capabilities::*;

#[async_trait]
pub trait ControllerService: IdentityService {
  /// Get the set of services provided by this controller.
  #[inline]
  fn capabilities(&self) -> ControllerCapabilities {
    ControllerCapabilities::empty()
  }

  /// A Controller Plugin MUST implement this RPC call if it has `CREATE_DELETE_VOLUME`
  /// controller capability.
  ///
  /// This RPC will be called by the CO to provision a new volume on behalf of a user
  /// (to be consumed as either a block device or a mounted filesystem).
  ///
  /// This operation MUST be idempotent.
  ///
  /// If a volume corresponding to the specified volume `name` already exists and is
  /// compatible with the specified `capacity_range`, `volume_capabilities` and
  /// `parameters` in the `CreateVolumeRequest`, the Plugin MUST reply `0 OK` with the
  /// corresponding `CreateVolumeResponse`.
  #[allow(unused_variables)]
  async fn create_volume(&self, request: CreateVolumeRequest) -> Result<Volume, CreateVolumeError> {
    unsupported!("CreateVolume")
  }

  /// A Controller Plugin MUST implement this RPC call if it has CREATE_DELETE_VOLUME capability.
  /// This RPC will be called by the CO to deprovision a volume.
  ///
  /// This operation MUST be idempotent. If a volume corresponding to the specified volume_id
  /// does not exist or the artifacts associated with the volume do not exist anymore, the
  /// Plugin MUST reply 0 OK.
  #[allow(unused_variables)]
  async fn delete_volume(&self, request: DeleteVolumeRequest) -> Result<(), DeleteVolumeError> {
    unsupported!("DeleteVolume")
  }

  /// A Controller Plugin MUST implement this RPC call. This RPC will be called by the
  /// CO to check if a pre-provisioned volume has all the capabilities that the CO wants.
  /// This RPC call SHALL return confirmed only if all the volume capabilities specified
  /// in the request are supported. This operation MUST be idempotent.
  async fn validate_volume_capabilities(
    &self,
    request: ValidateVolumeCapabilitiesRequest,
  ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError>;

  /// A Controller Plugin MUST implement this RPC call if it has LIST_VOLUMES capability.
  /// The Plugin SHALL return the information about all the volumes that it knows about.
  /// If volumes are created and/or deleted while the CO is concurrently paging through
  /// ListVolumes results then it is possible that the CO MAY either witness duplicate
  /// volumes in the list, not witness existing volumes, or both.
  #[allow(unused_variables)]
  async fn list_volumes(
    &self,
    request: ListVolumesRequest,
  ) -> Result<ListVolumesResponse, ListVolumesError> {
    unsupported!("ListVolumes")
  }
}

pub(crate) struct Controller<T: ControllerService>(pub(crate) Arc<T>);

#[async_trait]
impl<T: ControllerService> proto::controller_server::Controller for Controller<T> {
  #[instrument(
    name = "controller.create_volume",
    skip(self, request),
    fields(request, response)
  )]
  async fn create_volume(
    &self,
    request: tonic::Request<proto::CreateVolumeRequest>,
  ) -> Result<tonic::Response<proto::CreateVolumeResponse>, tonic::Status> {
    let request = record_request(request.into_inner().try_into()?);
    let response = self
      .0
      .create_volume(request)
      .await?
      .record_response()
      .try_into()?;
    Ok(tonic::Response::new(response))
  }

  #[instrument(
    name = "controller.delete_volume",
    skip(self, request),
    fields(request)
  )]
  async fn delete_volume(
    &self,
    request: tonic::Request<proto::DeleteVolumeRequest>,
  ) -> Result<tonic::Response<proto::DeleteVolumeResponse>, tonic::Status> {
    let request = record_request(request.into_inner().try_into()?);
    self.0.delete_volume(request).await?;
    let response = proto::DeleteVolumeResponse {};
    Ok(tonic::Response::new(response))
  }

  #[instrument(
    name = "controller.validate_volume_capabilities",
    skip(self, request),
    fields(request, response)
  )]
  async fn validate_volume_capabilities(
    &self,
    request: tonic::Request<proto::ValidateVolumeCapabilitiesRequest>,
  ) -> Result<tonic::Response<proto::ValidateVolumeCapabilitiesResponse>, tonic::Status> {
    let request = record_request(request.into_inner().try_into()?);
    let response = self
      .0
      .validate_volume_capabilities(request)
      .await?
      .record_response()
      .into();
    Ok(tonic::Response::new(response))
  }

  #[instrument(
    name = "controller.list_volumes",
    skip(self, request),
    fields(request, response)
  )]
  async fn list_volumes(
    &self,
    request: tonic::Request<proto::ListVolumesRequest>,
  ) -> Result<tonic::Response<proto::ListVolumesResponse>, tonic::Status> {
    let request = record_request(request.into_inner().try_into()?);
    let response = self
      .0
      .list_volumes(request)
      .await?
      .record_response()
      .try_into()?;
    Ok(tonic::Response::new(response))
  }

  #[instrument(
    name = "controller.controller_get_capabilities",
    skip(self),
    fields(response)
  )]
  async fn controller_get_capabilities(
    &self,
    _: tonic::Request<proto::ControllerGetCapabilitiesRequest>,
  ) -> Result<tonic::Response<proto::ControllerGetCapabilitiesResponse>, tonic::Status> {
    let response = self.0.capabilities().record_response().try_into()?;
    Ok(tonic::Response::new(response))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::proto::controller_server::Controller as _;
  use std::collections::HashMap;

  struct Plugin;

  impl IdentityService for Plugin {
    fn name(&self) -> &str {
      "test.csi.example.com"
    }

    fn version(&self) -> &str {
      "0.0.0"
    }
  }

  #[async_trait]
  impl ControllerService for Plugin {
    fn capabilities(&self) -> ControllerCapabilities {
      ControllerCapabilities::CREATE_DELETE_VOLUME
    }

    async fn create_volume(
      &self,
      request: CreateVolumeRequest,
    ) -> Result<Volume, CreateVolumeError> {
      let mut context = HashMap::new();
      context.insert("lun".to_owned(), "0".to_owned());
      Ok(
        Volume::new(request.name())
          .with_capacity_bytes(request.required_bytes())
          .with_volume_context(context),
      )
    }

    async fn validate_volume_capabilities(
      &self,
      _request: ValidateVolumeCapabilitiesRequest,
    ) -> Result<ValidateVolumeCapabilitiesResponse, ValidateVolumeCapabilitiesError> {
      Ok(ValidateVolumeCapabilitiesResponse::NotConfirmed(None))
    }
  }

  fn controller() -> Controller<Plugin> {
    Controller(Arc::new(Plugin))
  }

  fn block_writer() -> proto::VolumeCapability {
    proto::VolumeCapability {
      access_mode: Some(proto::volume_capability::AccessMode {
        mode: proto::volume_capability::access_mode::Mode::SingleNodeWriter as i32,
      }),
      access_type: Some(proto::volume_capability::AccessType::Block(
        proto::volume_capability::BlockVolume {},
      )),
    }
  }

  #[tokio::test]
  async fn create_volume_round_trips_through_the_plugin() {
    let request = proto::CreateVolumeRequest {
      name: "pvc-1".into(),
      capacity_range: Some(proto::CapacityRange {
        required_bytes: 5_000_000_000,
        limit_bytes: 0,
      }),
      volume_capabilities: vec![block_writer()],
      ..Default::default()
    };

    let response = controller()
      .create_volume(tonic::Request::new(request))
      .await
      .expect("create succeeds")
      .into_inner();

    let volume = response.volume.expect("volume is set");
    assert_eq!(volume.volume_id, "pvc-1");
    assert_eq!(volume.capacity_bytes, 5_000_000_000);
    assert_eq!(volume.volume_context.get("lun").map(|v| &**v), Some("0"));
  }

  #[tokio::test]
  async fn malformed_create_never_reaches_the_plugin() {
    let request = proto::CreateVolumeRequest {
      name: "pvc-1".into(),
      ..Default::default()
    };

    let err = controller()
      .create_volume(tonic::Request::new(request))
      .await
      .unwrap_err();
    assert_eq!(err.code(), tonic::Code::InvalidArgument);
  }

  #[tokio::test]
  async fn default_methods_are_unimplemented() {
    let err = controller()
      .delete_volume(tonic::Request::new(proto::DeleteVolumeRequest {
        volume_id: "pvc-1".into(),
        secrets: HashMap::new(),
      }))
      .await
      .unwrap_err();
    assert_eq!(err.code(), tonic::Code::Unimplemented);

    let err = controller()
      .list_volumes(tonic::Request::new(proto::ListVolumesRequest::default()))
      .await
      .unwrap_err();
    assert_eq!(err.code(), tonic::Code::Unimplemented);
  }

  #[tokio::test]
  async fn reports_plugin_capabilities() {
    let response = controller()
      .controller_get_capabilities(tonic::Request::new(
        proto::ControllerGetCapabilitiesRequest {},
      ))
      .await
      .expect("capabilities")
      .into_inner();
    assert_eq!(response.capabilities.len(), 1);
  }
}
