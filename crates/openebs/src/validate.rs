use crate::ProvisionError;
use csi_proto::controller::CreateVolumeRequest;

pub const STORAGE_CLASS_PARAMETER: &str = "storage-class-name";

/// Checks a create request before any network call is made and
/// returns the requested storage class.
pub fn validate_create_request(request: &CreateVolumeRequest) -> Result<&str, ProvisionError> {
  if request.name().is_empty() {
    return Err(ProvisionError::InvalidArgument(
      "Name missing in request".to_owned(),
    ));
  }

  if request.volume_capabilities().is_empty() {
    return Err(ProvisionError::InvalidArgument(
      "Volume Capabilities missing in request".to_owned(),
    ));
  }

  match request.parameters().get(STORAGE_CLASS_PARAMETER) {
    Some(class) if !class.is_empty() => Ok(class.as_str()),
    _ => Err(ProvisionError::InvalidArgument(format!(
      "Missing {} in request",
      STORAGE_CLASS_PARAMETER
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use csi_proto::controller::{AccessMode, AccessType, VolumeCapability};

  fn writer() -> VolumeCapability {
    VolumeCapability::new(AccessMode::SingleNodeWriter, AccessType::Block)
  }

  #[test]
  fn accepts_complete_request() {
    let request = CreateVolumeRequest::new("pvc-1")
      .with_volume_capability(writer())
      .with_parameter(STORAGE_CLASS_PARAMETER, "openebs");

    assert_eq!(validate_create_request(&request), Ok("openebs"));
  }

  #[test]
  fn rejects_empty_name() {
    let request = CreateVolumeRequest::new("")
      .with_volume_capability(writer())
      .with_parameter(STORAGE_CLASS_PARAMETER, "openebs");

    assert_eq!(
      validate_create_request(&request),
      Err(ProvisionError::InvalidArgument("Name missing in request".into()))
    );
  }

  #[test]
  fn rejects_missing_capabilities() {
    let request = CreateVolumeRequest::new("pvc-1").with_parameter(STORAGE_CLASS_PARAMETER, "openebs");

    assert!(matches!(
      validate_create_request(&request),
      Err(ProvisionError::InvalidArgument(_))
    ));
  }

  #[test]
  fn rejects_empty_storage_class() {
    let request = CreateVolumeRequest::new("pvc-1")
      .with_volume_capability(writer())
      .with_parameter(STORAGE_CLASS_PARAMETER, "");

    assert_eq!(
      validate_create_request(&request),
      Err(ProvisionError::InvalidArgument(
        "Missing storage-class-name in request".into()
      ))
    );
  }
}
