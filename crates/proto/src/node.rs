mod capabilities;
mod get_info;

use crate::{proto, utils::Record, IdentityService};
use async_trait::async_trait;
use std::{convert::TryInto, sync::Arc};
use tracing::instrument;

pub use capabilities::*;
pub use get_info::*;

#[async_trait]
pub trait NodeService: IdentityService {
  /// Get the set of services provided by this node.
  #[inline]
  fn node_capabilities(&self) -> NodeCapabilities {
    NodeCapabilities::empty()
  }

  /// A Node Plugin MUST implement this RPC call. The plugin SHALL
  /// return the identifier of the node the plugin runs on, which the CO
  /// uses in subsequent calls to refer to this node.
  async fn node_get_info(&self) -> Result<NodeGetInfoResponse, NodeGetInfoError>;
}

pub(crate) struct Node<T: NodeService>(pub(crate) Arc<T>);

#[async_trait]
impl<T: NodeService> proto::node_server::Node for Node<T> {
  #[instrument(name = "node.node_get_capabilities", skip(self), fields(response))]
  async fn node_get_capabilities(
    &self,
    _: tonic::Request<proto::NodeGetCapabilitiesRequest>,
  ) -> Result<tonic::Response<proto::NodeGetCapabilitiesResponse>, tonic::Status> {
    let response = self.0.node_capabilities().record_response().try_into()?;
    Ok(tonic::Response::new(response))
  }

  #[instrument(name = "node.node_get_info", skip(self), fields(response))]
  async fn node_get_info(
    &self,
    _: tonic::Request<proto::NodeGetInfoRequest>,
  ) -> Result<tonic::Response<proto::NodeGetInfoResponse>, tonic::Status> {
    let response = self
      .0
      .node_get_info()
      .await?
      .record_response()
      .try_into()?;
    Ok(tonic::Response::new(response))
  }
}
