use std::{
  collections::HashMap,
  convert::{TryFrom, TryInto},
  fmt,
  num::NonZeroU64,
};

use crate::proto;

/// A provisioned volume as reported back to the CO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
  capacity_bytes: Option<NonZeroU64>,
  volume_id: String,
  volume_context: HashMap<String, String>,
}

impl Volume {
  pub fn new(volume_id: impl Into<String>) -> Self {
    Volume {
      capacity_bytes: None,
      volume_id: volume_id.into(),
      volume_context: HashMap::new(),
    }
  }

  /// Sets the capacity of the volume. Zero means unknown.
  pub fn with_capacity_bytes(mut self, capacity_bytes: u64) -> Self {
    self.capacity_bytes = NonZeroU64::new(capacity_bytes);
    self
  }

  pub fn with_volume_context(mut self, volume_context: HashMap<String, String>) -> Self {
    self.volume_context = volume_context;
    self
  }

  /// The identifier for this volume, generated by the plugin. This
  /// field is REQUIRED. This field MUST contain enough information to
  /// uniquely identify this specific volume vs all other volumes
  /// supported by this plugin.
  #[inline]
  pub fn volume_id(&self) -> &str {
    &self.volume_id
  }

  /// The capacity of the volume in bytes, if known.
  #[inline]
  pub fn capacity_bytes(&self) -> Option<NonZeroU64> {
    self.capacity_bytes
  }

  /// Opaque static properties of the volume. SP MAY use this field to
  /// ensure subsequent volume validation and publishing calls have
  /// contextual information.
  #[inline]
  pub fn volume_context(&self) -> &HashMap<String, String> {
    &self.volume_context
  }
}

impl TryFrom<Volume> for proto::Volume {
  type Error = tonic::Status;

  fn try_from(value: Volume) -> Result<Self, Self::Error> {
    let capacity_bytes = match value.capacity_bytes {
      None => 0,
      Some(v) => i64::try_from(v.get()).map_err(|_| {
        tonic::Status::out_of_range(format!(
          "Volume.capacity_bytes {} does not fit in an int64",
          v
        ))
      })?,
    };

    Ok(proto::Volume {
      capacity_bytes,
      volume_id: value.volume_id,
      volume_context: value.volume_context,
    })
  }
}

impl TryFrom<Volume> for proto::CreateVolumeResponse {
  type Error = tonic::Status;

  fn try_from(value: Volume) -> Result<Self, Self::Error> {
    let volume = Some(value.try_into()?);

    Ok(proto::CreateVolumeResponse { volume })
  }
}

#[derive(Debug)]
pub struct VolumeCapability {
  access_mode: AccessMode,
  access_type: AccessType,
}

impl VolumeCapability {
  pub fn new(access_mode: AccessMode, access_type: AccessType) -> Self {
    VolumeCapability {
      access_mode,
      access_type,
    }
  }

  #[inline]
  pub fn access_mode(&self) -> AccessMode {
    self.access_mode
  }

  #[inline]
  pub fn access_type(&self) -> &AccessType {
    &self.access_type
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccessMode {
  Unknown,
  /// Can only be published once as read/write on a single node, at
  /// any given time.
  SingleNodeWriter,
  /// Can only be published once as readonly on a single node, at
  /// any given time.
  SingleNodeReaderOnly,
  /// Can be published as readonly at multiple nodes simultaneously.
  MultiNodeReaderOnly,
  /// Can be published at multiple nodes simultaneously. Only one of
  /// the node can be used as read/write. The rest will be readonly.
  MultiNodeSingleWriter,
  /// Can be published as read/write at multiple nodes
  /// simultaneously.
  MultiNodeMultiWriter,
}

impl From<proto::volume_capability::AccessMode> for AccessMode {
  fn from(value: proto::volume_capability::AccessMode) -> Self {
    use proto::volume_capability::access_mode::Mode;

    match Mode::from_i32(value.mode) {
      Some(Mode::SingleNodeWriter) => AccessMode::SingleNodeWriter,
      Some(Mode::SingleNodeReaderOnly) => AccessMode::SingleNodeReaderOnly,
      Some(Mode::MultiNodeReaderOnly) => AccessMode::MultiNodeReaderOnly,
      Some(Mode::MultiNodeSingleWriter) => AccessMode::MultiNodeSingleWriter,
      Some(Mode::MultiNodeMultiWriter) => AccessMode::MultiNodeMultiWriter,
      Some(Mode::Unknown) | None => AccessMode::Unknown,
    }
  }
}

impl From<AccessMode> for proto::volume_capability::AccessMode {
  fn from(value: AccessMode) -> Self {
    use proto::volume_capability::access_mode::Mode;

    let mode = match value {
      AccessMode::Unknown => Mode::Unknown,
      AccessMode::SingleNodeWriter => Mode::SingleNodeWriter,
      AccessMode::SingleNodeReaderOnly => Mode::SingleNodeReaderOnly,
      AccessMode::MultiNodeReaderOnly => Mode::MultiNodeReaderOnly,
      AccessMode::MultiNodeSingleWriter => Mode::MultiNodeSingleWriter,
      AccessMode::MultiNodeMultiWriter => Mode::MultiNodeMultiWriter,
    } as i32;

    proto::volume_capability::AccessMode { mode }
  }
}

#[derive(Debug)]
pub enum AccessType {
  /// Indicate that the volume will be accessed via the block device API.
  Block,

  /// Indicate that the volume will be accessed via the filesystem API.
  Mount(MountVolume),
}

impl From<proto::volume_capability::AccessType> for AccessType {
  fn from(value: proto::volume_capability::AccessType) -> Self {
    match value {
      proto::volume_capability::AccessType::Block(_) => AccessType::Block,
      proto::volume_capability::AccessType::Mount(v) => AccessType::Mount(v.into()),
    }
  }
}

impl From<AccessType> for proto::volume_capability::AccessType {
  fn from(value: AccessType) -> Self {
    match value {
      AccessType::Block => {
        proto::volume_capability::AccessType::Block(proto::volume_capability::BlockVolume {})
      }
      AccessType::Mount(v) => proto::volume_capability::AccessType::Mount(v.into()),
    }
  }
}

#[derive(Default)]
pub struct MountVolume {
  fs_type: Option<String>,
  mount_flags: Vec<String>,
}

impl MountVolume {
  pub fn new(fs_type: Option<String>, mount_flags: Vec<String>) -> Self {
    MountVolume {
      fs_type,
      mount_flags,
    }
  }

  /// The filesystem type.
  #[inline]
  pub fn fs_type(&self) -> Option<&str> {
    self.fs_type.as_deref()
  }

  /// The mount options that can be used for the volume. This field is
  /// OPTIONAL. `mount_flags` MAY contain sensitive information.
  /// Therefore, the CO and the Plugin MUST NOT leak this information
  /// to untrusted entities.
  pub fn mount_flags(&self) -> impl Iterator<Item = &str> + ExactSizeIterator {
    self.mount_flags.iter().map(|v| &**v)
  }
}

impl From<proto::volume_capability::MountVolume> for MountVolume {
  fn from(value: proto::volume_capability::MountVolume) -> Self {
    MountVolume {
      fs_type: crate::utils::non_empty(value.fs_type),
      mount_flags: value.mount_flags,
    }
  }
}

impl From<MountVolume> for proto::volume_capability::MountVolume {
  fn from(value: MountVolume) -> Self {
    proto::volume_capability::MountVolume {
      fs_type: value.fs_type.unwrap_or_default(),
      mount_flags: value.mount_flags,
    }
  }
}

impl fmt::Debug for MountVolume {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MountVolume")
      .field("fs_type", &self.fs_type)
      .field(
        "mount_flags",
        &format!("REDACTED ({} items)", self.mount_flags.len()),
      )
      .finish()
  }
}

impl TryFrom<proto::VolumeCapability> for VolumeCapability {
  type Error = tonic::Status;

  fn try_from(value: proto::VolumeCapability) -> Result<Self, Self::Error> {
    let access_mode = value
      .access_mode
      .ok_or_else(|| tonic::Status::invalid_argument("Missing access_mode for VolumeCapability"))?
      .into();

    let access_type = value
      .access_type
      .ok_or_else(|| tonic::Status::invalid_argument("Missing access_type for VolumeCapability"))?
      .into();

    Ok(VolumeCapability {
      access_mode,
      access_type,
    })
  }
}

impl From<VolumeCapability> for proto::VolumeCapability {
  fn from(value: VolumeCapability) -> Self {
    proto::VolumeCapability {
      access_mode: Some(value.access_mode.into()),
      access_type: Some(value.access_type.into()),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityRange {
  AtLeast(NonZeroU64),
  AtMost(NonZeroU64),
  /// Effectively AtLeast(.0) & AtMost(.1)
  Between(NonZeroU64, NonZeroU64),
}

impl CapacityRange {
  /// The number of bytes the volume must at least hold, zero when only
  /// an upper bound was given.
  pub fn required_bytes(&self) -> u64 {
    match self {
      CapacityRange::AtLeast(r) | CapacityRange::Between(r, _) => r.get(),
      CapacityRange::AtMost(_) => 0,
    }
  }

  /// The number of bytes the volume must not exceed, if bounded.
  pub fn limit_bytes(&self) -> Option<u64> {
    match self {
      CapacityRange::AtMost(l) | CapacityRange::Between(_, l) => Some(l.get()),
      CapacityRange::AtLeast(_) => None,
    }
  }
}

/// A range with both bounds set to zero means the CO left the capacity
/// unspecified.
impl TryFrom<proto::CapacityRange> for Option<CapacityRange> {
  type Error = tonic::Status;

  fn try_from(value: proto::CapacityRange) -> Result<Self, Self::Error> {
    let (required, limit) = match (value.required_bytes, value.limit_bytes) {
      (r, _) if r < 0 => {
        return Err(tonic::Status::invalid_argument(
          "CapacityRange.required_bytes cannot be negative",
        ))
      }
      (_, l) if l < 0 => {
        return Err(tonic::Status::invalid_argument(
          "CapacityRange.limit_bytes cannot be negative",
        ))
      }
      (r, l) => (NonZeroU64::new(r as u64), NonZeroU64::new(l as u64)),
    };

    Ok(match (required, limit) {
      (None, None) => None,
      (Some(r), None) => Some(CapacityRange::AtLeast(r)),
      (None, Some(l)) => Some(CapacityRange::AtMost(l)),
      (Some(r), Some(l)) if l < r => {
        return Err(tonic::Status::out_of_range(
          "CapacityRange.limit_bytes is smaller than CapacityRange.required_bytes",
        ))
      }
      (Some(r), Some(l)) => Some(CapacityRange::Between(r, l)),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn range(required_bytes: i64, limit_bytes: i64) -> Result<Option<CapacityRange>, tonic::Code> {
    Option::<CapacityRange>::try_from(proto::CapacityRange {
      required_bytes,
      limit_bytes,
    })
    .map_err(|status| status.code())
  }

  #[test_case(0, 0 => Ok(None) ; "unspecified")]
  #[test_case(10, 0 => Ok(Some(10)) ; "lower bound")]
  #[test_case(0, 10 => Ok(Some(0)) ; "upper bound")]
  #[test_case(5, 10 => Ok(Some(5)) ; "both bounds")]
  #[test_case(-1, 0 => Err(tonic::Code::InvalidArgument) ; "negative required")]
  #[test_case(0, -1 => Err(tonic::Code::InvalidArgument) ; "negative limit")]
  #[test_case(10, 5 => Err(tonic::Code::OutOfRange) ; "limit below required")]
  fn capacity_range_required_bytes(required: i64, limit: i64) -> Result<Option<u64>, tonic::Code> {
    range(required, limit).map(|r| r.map(|r| r.required_bytes()))
  }

  #[test]
  fn capability_without_access_mode_is_rejected() {
    let capability = proto::VolumeCapability {
      access_mode: None,
      access_type: Some(proto::volume_capability::AccessType::Block(
        proto::volume_capability::BlockVolume {},
      )),
    };

    let err = VolumeCapability::try_from(capability).unwrap_err();
    assert_eq!(err.code(), tonic::Code::InvalidArgument);
  }

  #[test]
  fn capability_keeps_mode_and_mount() {
    let capability = proto::VolumeCapability {
      access_mode: Some(proto::volume_capability::AccessMode {
        mode: proto::volume_capability::access_mode::Mode::SingleNodeWriter as i32,
      }),
      access_type: Some(proto::volume_capability::AccessType::Mount(
        proto::volume_capability::MountVolume {
          fs_type: String::new(),
          mount_flags: vec!["noatime".into()],
        },
      )),
    };

    let capability = VolumeCapability::try_from(capability).expect("valid capability");
    assert_eq!(capability.access_mode(), AccessMode::SingleNodeWriter);
    match capability.access_type() {
      AccessType::Mount(mount) => {
        assert_eq!(mount.fs_type(), None);
        assert_eq!(mount.mount_flags().collect::<Vec<_>>(), vec!["noatime"]);
      }
      other => panic!("unexpected access type {:?}", other),
    }
  }

  #[test]
  fn volume_without_capacity_reports_zero() {
    let mut context = HashMap::new();
    context.insert("iqn".to_owned(), "iqn.2016-09.com.openebs.jiva:pvc-1".to_owned());

    let volume = proto::Volume::try_from(Volume::new("pvc-1").with_volume_context(context.clone()))
      .expect("volume converts");
    assert_eq!(volume.capacity_bytes, 0);
    assert_eq!(volume.volume_id, "pvc-1");
    assert_eq!(volume.volume_context, context);
  }
}
