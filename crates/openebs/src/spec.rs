use crate::validate::STORAGE_CLASS_PARAMETER;
use csi_proto::controller::CreateVolumeRequest;
use maya_client::VolumeSpec;
use tracing::warn;

pub const BYTES_PER_GIGABYTE: u64 = 1_000_000_000;

/// Namespace label put on every volume spec.
pub const DEFAULT_NAMESPACE_LABEL: &str = "default";

/// Whole gigabytes, rounded down.
pub fn size_label(bytes: u64) -> String {
  let gigabytes = bytes / BYTES_PER_GIGABYTE;
  let remainder = bytes % BYTES_PER_GIGABYTE;
  if remainder != 0 {
    warn!(
      requested_bytes = bytes,
      provisioned_bytes = gigabytes * BYTES_PER_GIGABYTE,
      "requested capacity is not a whole number of gigabytes, volume will be smaller than requested"
    );
  }

  format!("{}G", gigabytes)
}

pub fn build_volume_spec(request: &CreateVolumeRequest, namespace_label: &str) -> VolumeSpec {
  let storage_class = request
    .parameters()
    .get(STORAGE_CLASS_PARAMETER)
    .map(|v| &**v)
    .unwrap_or_default();

  VolumeSpec::new(
    request.name(),
    size_label(request.required_bytes()),
    storage_class,
    namespace_label,
  )
}
