use super::VolumeCapability;
use crate::{proto, secrets::Secrets};
use std::{
  collections::HashMap,
  convert::{TryFrom, TryInto},
};
use thiserror::Error;

#[derive(Debug)]
pub struct ValidateVolumeCapabilitiesRequest {
  volume_id: String,
  volume_context: HashMap<String, String>,
  volume_capabilities: Vec<VolumeCapability>,
  parameters: HashMap<String, String>,
  secrets: Secrets,
}

impl ValidateVolumeCapabilitiesRequest {
  /// The ID of the volume to check. This field is REQUIRED.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// Volume context as returned by SP in
  /// CreateVolumeResponse.Volume.volume_context.
  #[inline]
  pub fn volume_context(&self) -> &HashMap<String, String> {
    &self.volume_context
  }

  /// The capabilities that the CO wants to check for the volume.
  #[inline]
  pub fn volume_capabilities(&self) -> &[VolumeCapability] {
    &self.volume_capabilities
  }

  #[inline]
  pub fn parameters(&self) -> &HashMap<String, String> {
    &self.parameters
  }

  #[inline]
  pub fn secrets(&self) -> &HashMap<String, String> {
    self.secrets.as_ref()
  }
}

impl TryFrom<proto::ValidateVolumeCapabilitiesRequest> for ValidateVolumeCapabilitiesRequest {
  type Error = tonic::Status;

  fn try_from(value: proto::ValidateVolumeCapabilitiesRequest) -> Result<Self, Self::Error> {
    let volume_id = match value.volume_id {
      v if v.is_empty() => {
        return Err(tonic::Status::invalid_argument(
          "ValidateVolumeCapabilitiesRequest.volume_id is empty",
        ))
      }
      v => v,
    };

    let volume_capabilities = match value.volume_capabilities {
      v if v.is_empty() => {
        return Err(tonic::Status::invalid_argument(
          "Missing ValidateVolumeCapabilitiesRequest.volume_capabilities",
        ))
      }
      v => v
        .into_iter()
        .map(TryInto::try_into)
        .collect::<Result<_, _>>()?,
    };

    Ok(ValidateVolumeCapabilitiesRequest {
      volume_id,
      volume_context: value.volume_context,
      volume_capabilities,
      parameters: value.parameters,
      secrets: value.secrets.into(),
    })
  }
}

#[derive(Debug, Default)]
pub struct Confirmed {
  /// Volume context validated by the plugin.
  volume_context: HashMap<String, String>,
  /// Volume capabilities supported by the plugin.
  volume_capabilities: Vec<VolumeCapability>,
  /// The volume creation parameters validated by the plugin.
  parameters: HashMap<String, String>,
}

impl Confirmed {
  pub fn new(volume_capabilities: Vec<VolumeCapability>) -> Self {
    Confirmed {
      volume_capabilities,
      ..Default::default()
    }
  }

  pub fn with_volume_context(mut self, volume_context: HashMap<String, String>) -> Self {
    self.volume_context = volume_context;
    self
  }

  pub fn with_parameters(mut self, parameters: HashMap<String, String>) -> Self {
    self.parameters = parameters;
    self
  }
}

impl From<Confirmed> for proto::validate_volume_capabilities_response::Confirmed {
  fn from(value: Confirmed) -> Self {
    proto::validate_volume_capabilities_response::Confirmed {
      volume_context: value.volume_context,
      volume_capabilities: value
        .volume_capabilities
        .into_iter()
        .map(Into::into)
        .collect(),
      parameters: value.parameters,
    }
  }
}

#[derive(Debug)]
pub enum ValidateVolumeCapabilitiesResponse {
  /// All requested capabilities are supported.
  Confirmed(Confirmed),

  /// The capabilities were not confirmed. The message, if any, tells
  /// the CO why.
  NotConfirmed(Option<String>),
}

impl From<ValidateVolumeCapabilitiesResponse> for proto::ValidateVolumeCapabilitiesResponse {
  fn from(value: ValidateVolumeCapabilitiesResponse) -> Self {
    match value {
      ValidateVolumeCapabilitiesResponse::Confirmed(confirmed) => {
        proto::ValidateVolumeCapabilitiesResponse {
          confirmed: Some(confirmed.into()),
          message: Default::default(),
        }
      }

      ValidateVolumeCapabilitiesResponse::NotConfirmed(message) => {
        proto::ValidateVolumeCapabilitiesResponse {
          confirmed: None,
          message: message.unwrap_or_default(),
        }
      }
    }
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ValidateVolumeCapabilitiesError {
  /// Indicates that a volume corresponding to the specified `volume_id` does not exist.
  #[error("Volume does not exist: {0}")]
  VolumeNotFound(String),

  #[error(transparent)]
  #[doc(hidden)]
  Other(#[from] tonic::Status),
}

impl From<ValidateVolumeCapabilitiesError> for tonic::Status {
  fn from(value: ValidateVolumeCapabilitiesError) -> Self {
    use tonic::{Code, Status};

    match value {
      ValidateVolumeCapabilitiesError::VolumeNotFound(v) => Status::new(Code::NotFound, v),
      ValidateVolumeCapabilitiesError::Other(v) => v,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn not_confirmed_without_message_is_empty() {
    let response =
      proto::ValidateVolumeCapabilitiesResponse::from(ValidateVolumeCapabilitiesResponse::NotConfirmed(None));
    assert_eq!(response, proto::ValidateVolumeCapabilitiesResponse::default());
  }

  #[test]
  fn empty_volume_id_is_invalid() {
    let request = proto::ValidateVolumeCapabilitiesRequest::default();
    let err = ValidateVolumeCapabilitiesRequest::try_from(request).unwrap_err();
    assert_eq!(err.code(), tonic::Code::InvalidArgument);
  }
}
