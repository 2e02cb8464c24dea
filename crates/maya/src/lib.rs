//! Client for the volume endpoints of the OpenEBS maya-apiserver.

mod client;
mod config;
mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod resolver;
mod types;

pub use client::MayaClient;
pub use config::{ProviderConfig, DEFAULT_NAMESPACE, DEFAULT_TIMEOUT, DEFAULT_VERSION};
pub use error::{MayaError, ResolveError};
pub use resolver::{
  EndpointResolver, ServiceResolver, StaticEndpoint, DEFAULT_PORT, DEFAULT_SERVICE,
};
pub use types::{VolumeList, VolumeRecord, VolumeSpec};

use async_trait::async_trait;
use static_assertions::assert_impl_all;

/// Volume operations of the maya-apiserver. Implementations apply the
/// configured timeout and never retry.
#[async_trait]
pub trait VolumeApi: Send + Sync {
  /// Looks up a volume by name. A volume the server does not know
  /// about is `Ok(None)`.
  async fn describe(
    &self,
    config: &ProviderConfig,
    name: &str,
  ) -> Result<Option<VolumeRecord>, MayaError>;

  async fn create(&self, config: &ProviderConfig, spec: &VolumeSpec) -> Result<(), MayaError>;

  async fn delete(&self, config: &ProviderConfig, name: &str) -> Result<(), MayaError>;

  async fn list(&self, config: &ProviderConfig) -> Result<Vec<VolumeRecord>, MayaError>;
}

assert_impl_all!(MayaClient: VolumeApi, Send, Sync);
#[cfg(any(test, feature = "fake"))]
assert_impl_all!(fake::FakeVolumeApi: VolumeApi, Send, Sync);
assert_impl_all!(StaticEndpoint: EndpointResolver);
assert_impl_all!(ServiceResolver: EndpointResolver);
assert_impl_all!(MayaError: Send, Sync);
