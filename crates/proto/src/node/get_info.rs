use crate::proto;
use std::{convert::TryFrom, num::NonZeroU64};
use thiserror::Error;

#[derive(Debug)]
pub struct NodeGetInfoResponse {
  /// The identifier of the node as understood by the SP.
  /// This field is REQUIRED.
  /// This field MUST contain enough information to uniquely identify
  /// this specific node vs all other nodes supported by this plugin.
  /// The size of this field SHALL NOT exceed 192 bytes.
  node_id: String,

  /// Maximum number of volumes that controller can publish to the node.
  /// If value is not set or zero CO SHALL decide how many volumes of
  /// this type can be published by the controller to the node.
  max_volumes_per_node: Option<NonZeroU64>,
}

impl NodeGetInfoResponse {
  pub fn new(node_id: impl Into<String>) -> Self {
    NodeGetInfoResponse {
      node_id: node_id.into(),
      max_volumes_per_node: None,
    }
  }

  pub fn with_max_volumes_per_node(mut self, max_volumes_per_node: u64) -> Self {
    self.max_volumes_per_node = NonZeroU64::new(max_volumes_per_node);
    self
  }

  #[inline]
  pub fn node_id(&self) -> &str {
    &self.node_id
  }
}

impl TryFrom<NodeGetInfoResponse> for proto::NodeGetInfoResponse {
  type Error = tonic::Status;

  fn try_from(value: NodeGetInfoResponse) -> Result<Self, Self::Error> {
    if value.node_id.is_empty() {
      return Err(tonic::Status::internal("NodeGetInfoResponse.node_id is empty"));
    }

    if value.node_id.len() > 192 {
      return Err(tonic::Status::internal(
        "NodeGetInfoResponse.node_id exceeds 192 bytes",
      ));
    }

    let max_volumes_per_node = match value.max_volumes_per_node {
      None => 0,
      Some(v) => i64::try_from(v.get()).map_err(|_| {
        tonic::Status::internal("NodeGetInfoResponse.max_volumes_per_node does not fit in an int64")
      })?,
    };

    Ok(proto::NodeGetInfoResponse {
      node_id: value.node_id,
      max_volumes_per_node,
    })
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum NodeGetInfoError {
  #[error(transparent)]
  #[doc(hidden)]
  Other(#[from] tonic::Status),
}

impl From<NodeGetInfoError> for tonic::Status {
  fn from(value: NodeGetInfoError) -> Self {
    match value {
      NodeGetInfoError::Other(v) => v,
    }
  }
}
