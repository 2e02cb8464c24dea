use super::Volume;
use crate::proto;
use std::{
  convert::{TryFrom, TryInto},
  num::NonZeroU32,
};
use thiserror::Error;

#[derive(Debug, Default)]
pub struct ListVolumesRequest {
  max_entries: Option<NonZeroU32>,
  starting_token: Option<String>,
}

impl ListVolumesRequest {
  pub fn new(max_entries: Option<NonZeroU32>, starting_token: Option<String>) -> Self {
    ListVolumesRequest {
      max_entries,
      starting_token,
    }
  }

  /// If specified (non-zero value), the Plugin MUST NOT return more
  /// entries than this number in the response. If the actual number of
  /// entries is more than this number, the Plugin MUST set `next_token`
  /// in the response which can be used to get the next page of entries
  /// in the subsequent `ListVolumes` call. This field is OPTIONAL. If
  /// not specified (zero value), it means there is no restriction on the
  /// number of entries that can be returned.
  #[inline]
  pub fn max_entries(&self) -> Option<NonZeroU32> {
    self.max_entries
  }

  /// A token to specify where to start paginating. Set this field to
  /// `next_token` returned by a previous `ListVolumes` call to get the
  /// next page of entries. This field is OPTIONAL.
  #[inline]
  pub fn starting_token(&self) -> Option<&str> {
    self.starting_token.as_deref()
  }
}

impl TryFrom<proto::ListVolumesRequest> for ListVolumesRequest {
  type Error = tonic::Status;

  fn try_from(value: proto::ListVolumesRequest) -> Result<Self, Self::Error> {
    let max_entries = match value.max_entries {
      v if v < 0 => {
        return Err(tonic::Status::invalid_argument(
          "ListVolumesRequest.max_entries was less than 0",
        ))
      }
      v => NonZeroU32::new(v as u32),
    };

    Ok(ListVolumesRequest {
      max_entries,
      starting_token: crate::utils::non_empty(value.starting_token),
    })
  }
}

#[derive(Debug)]
pub struct VolumeListEntry {
  volume: Volume,
}

impl VolumeListEntry {
  #[inline]
  pub fn new(volume: Volume) -> Self {
    VolumeListEntry { volume }
  }

  #[inline]
  pub fn volume(&self) -> &Volume {
    &self.volume
  }
}

impl TryFrom<VolumeListEntry> for proto::list_volumes_response::Entry {
  type Error = tonic::Status;

  fn try_from(value: VolumeListEntry) -> Result<Self, Self::Error> {
    let volume = Some(value.volume.try_into()?);

    Ok(proto::list_volumes_response::Entry { volume })
  }
}

#[derive(Debug)]
pub struct ListVolumesResponse {
  /// The volume entires.
  entries: Vec<VolumeListEntry>,
  /// This token allows you to get the next page of entries for
  /// `ListVolumes` request. If the number of entries is larger than
  /// `max_entries`, use the `next_token` as a value for the
  /// `starting_token` field in the next `ListVolumes` request.
  next_token: Option<String>,
}

impl ListVolumesResponse {
  pub fn new(entries: Vec<VolumeListEntry>, next_token: Option<String>) -> Self {
    ListVolumesResponse {
      entries,
      next_token,
    }
  }

  #[inline]
  pub fn entries(&self) -> &[VolumeListEntry] {
    &self.entries
  }

  #[inline]
  pub fn next_token(&self) -> Option<&str> {
    self.next_token.as_deref()
  }
}

impl TryFrom<ListVolumesResponse> for proto::ListVolumesResponse {
  type Error = tonic::Status;

  fn try_from(value: ListVolumesResponse) -> Result<Self, Self::Error> {
    let entries = value
      .entries
      .into_iter()
      .map(TryInto::try_into)
      .collect::<Result<_, _>>()?;
    let next_token = value.next_token.unwrap_or_default();

    Ok(proto::ListVolumesResponse {
      entries,
      next_token,
    })
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ListVolumesError {
  /// Indicates that `starting_token` is not valid.
  #[error("Invalid `starting_token`: {0}")]
  InvalidStartingToken(String),

  #[error(transparent)]
  #[doc(hidden)]
  Other(#[from] tonic::Status),
}

impl From<ListVolumesError> for tonic::Status {
  fn from(value: ListVolumesError) -> Self {
    use tonic::{Code, Status};

    match value {
      ListVolumesError::Other(v) => v,
      value @ ListVolumesError::InvalidStartingToken(_) => {
        Status::new(Code::Aborted, value.to_string())
      }
    }
  }
}
