use super::{CapacityRange, VolumeCapability};
use crate::{proto, secrets::Secrets};
use std::{
  collections::HashMap,
  convert::{TryFrom, TryInto},
};
use thiserror::Error;

#[derive(Debug)]
pub struct CreateVolumeRequest {
  name: String,
  capacity_range: Option<CapacityRange>,
  volume_capabilities: Vec<VolumeCapability>,
  parameters: HashMap<String, String>,
  secrets: Secrets,
}

impl CreateVolumeRequest {
  /// Builds a request for in-process callers. The request carries no
  /// capacity range, capabilities or parameters until they are added.
  pub fn new(name: impl Into<String>) -> Self {
    CreateVolumeRequest {
      name: name.into(),
      capacity_range: None,
      volume_capabilities: Vec::new(),
      parameters: HashMap::new(),
      secrets: Secrets::default(),
    }
  }

  pub fn with_capacity_range(mut self, capacity_range: CapacityRange) -> Self {
    self.capacity_range = Some(capacity_range);
    self
  }

  pub fn with_volume_capability(mut self, volume_capability: VolumeCapability) -> Self {
    self.volume_capabilities.push(volume_capability);
    self
  }

  pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.parameters.insert(key.into(), value.into());
    self
  }

  /// The suggested name for the storage space. This field is
  /// REQUIRED. It serves two purposes:
  /// 1) Idempotency - This name is generated by the CO to achieve
  ///    idempotency. The Plugin SHOULD ensure that multiple
  ///    `CreateVolume` calls for the same name do not result in more
  ///    than one piece of storage provisioned corresponding to that
  ///    name. If a Plugin is unable to enforce idempotency, the CO's
  ///    error recovery logic could result in multiple (unused) volumes
  ///    being provisioned.
  /// 2) Suggested name - Some storage systems allow callers to specify
  ///    an identifier by which to refer to the newly provisioned
  ///    storage. If a storage system supports this, it can optionally
  ///    use this name as the identifier for the new volume.
  #[inline]
  pub fn name(&self) -> &str {
    &self.name
  }

  /// This field is OPTIONAL. This allows the CO to specify the capacity
  /// requirement of the volume to be provisioned. If not specified, the
  /// Plugin MAY choose an implementation-defined capacity range.
  #[inline]
  pub fn capacity_range(&self) -> Option<CapacityRange> {
    self.capacity_range
  }

  /// The requested capacity in bytes, zero when the CO did not ask for
  /// a minimum size.
  #[inline]
  pub fn required_bytes(&self) -> u64 {
    self
      .capacity_range
      .map(|range| range.required_bytes())
      .unwrap_or_default()
  }

  /// The capabilities that the provisioned volume MUST have. SP MUST
  /// provision a volume that will satisfy ALL of the capabilities
  /// specified in this list. Otherwise SP MUST return the appropriate
  /// gRPC error code.
  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }

  /// Plugin specific parameters passed in as opaque key-value pairs.
  /// This field is OPTIONAL. The Plugin is responsible for parsing and
  /// validating these parameters. COs will treat these as opaque.
  #[inline]
  pub fn parameters(&self) -> &HashMap<String, String> {
    &self.parameters
  }

  /// Secrets required by plugin to complete volume creation request.
  /// This field is OPTIONAL.
  #[inline]
  pub fn secrets(&self) -> &HashMap<String, String> {
    self.secrets.as_ref()
  }
}

impl TryFrom<proto::CreateVolumeRequest> for CreateVolumeRequest {
  type Error = tonic::Status;

  fn try_from(value: proto::CreateVolumeRequest) -> Result<Self, Self::Error> {
    if value.name.is_empty() {
      return Err(tonic::Status::invalid_argument(
        "CreateVolumeRequest.name is empty",
      ));
    }

    let capacity_range = match value.capacity_range {
      None => None,
      Some(v) => v.try_into()?,
    };

    let volume_capabilities = match value.volume_capabilities {
      v if v.is_empty() => {
        return Err(tonic::Status::invalid_argument(
          "Missing CreateVolumeRequest.volume_capabilities",
        ))
      }
      v => v
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<_, _>>()?,
    };

    Ok(CreateVolumeRequest {
      name: value.name,
      capacity_range,
      volume_capabilities,
      parameters: value.parameters,
      secrets: value.secrets.into(),
    })
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CreateVolumeError {
  #[error(transparent)]
  #[doc(hidden)]
  Other(#[from] tonic::Status),
}

impl From<CreateVolumeError> for tonic::Status {
  fn from(value: CreateVolumeError) -> Self {
    match value {
      CreateVolumeError::Other(v) => v,
    }
  }
}
