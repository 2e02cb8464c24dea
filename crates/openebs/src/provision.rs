use crate::{
  attributes::ConnectionAttributes,
  inflight::InFlight,
  spec::{build_volume_spec, DEFAULT_NAMESPACE_LABEL},
  validate::validate_create_request,
  ProvisionError,
};
use csi_proto::controller::{CreateVolumeRequest, Volume};
use maya_client::{EndpointResolver, ProviderConfig, VolumeApi, VolumeRecord, VolumeSpec};
use std::{num::NonZeroU32, sync::Arc};
use tracing::{debug, error, info, instrument, warn};

/// What a failed first lookup means during create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPolicy {
  /// Treat the volume as missing and go on to create it.
  Lenient,
  /// Fail the call as unavailable.
  Strict,
}

impl Default for LookupPolicy {
  fn default() -> Self {
    LookupPolicy::Lenient
  }
}

/// What a failed remote delete means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
  /// Log the failure and report success.
  BestEffort,
  /// Fail the call as unavailable.
  Strict,
}

impl Default for DeletePolicy {
  fn default() -> Self {
    DeletePolicy::BestEffort
  }
}

/// One page of `list_volumes`.
#[derive(Debug)]
pub struct VolumePage {
  pub volumes: Vec<Volume>,
  pub next_token: Option<String>,
}

/// Drives volume lifecycle calls against the maya-apiserver.
pub struct Provisioner {
  api: Arc<dyn VolumeApi>,
  resolver: Arc<dyn EndpointResolver>,
  lookup_policy: LookupPolicy,
  delete_policy: DeletePolicy,
  namespace_label: String,
  in_flight: InFlight<VolumeRecord>,
}

impl Provisioner {
  pub fn new(api: Arc<dyn VolumeApi>, resolver: Arc<dyn EndpointResolver>) -> Self {
    Provisioner {
      api,
      resolver,
      lookup_policy: LookupPolicy::default(),
      delete_policy: DeletePolicy::default(),
      namespace_label: DEFAULT_NAMESPACE_LABEL.to_owned(),
      in_flight: InFlight::new(),
    }
  }

  pub fn with_lookup_policy(mut self, lookup_policy: LookupPolicy) -> Self {
    self.lookup_policy = lookup_policy;
    self
  }

  pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
    self.delete_policy = delete_policy;
    self
  }

  pub fn with_namespace_label(mut self, namespace_label: impl Into<String>) -> Self {
    self.namespace_label = namespace_label.into();
    self
  }

  async fn resolve(&self) -> Result<ProviderConfig, ProvisionError> {
    self.resolver.resolve().await.map_err(|e| {
      error!(error = %e, "error setting up maya-apiserver config");
      ProvisionError::Unavailable(e.to_string())
    })
  }

  /// Creates the volume unless one with the same name exists, then
  /// reads it back and reports its connection attributes.
  ///
  /// An existing volume is reused as is, its size and storage class
  /// are not compared with the request. The reported capacity is the
  /// one the caller asked for.
  #[instrument(name = "provisioner.create_volume", skip(self, request), fields(volume = request.name()))]
  pub async fn create_volume(&self, request: &CreateVolumeRequest) -> Result<Volume, ProvisionError> {
    validate_create_request(request)?;
    let config = self.resolve().await?;
    let spec = build_volume_spec(request, &self.namespace_label);

    let api = self.api.clone();
    let lookup_policy = self.lookup_policy;
    let record = self
      .in_flight
      .run(request.name(), move || {
        create_or_reuse(api, config, spec, lookup_policy)
      })
      .await?;

    debug!(annotations = ?record.annotations(), "volume details");
    let attributes = ConnectionAttributes::from_annotations(record.annotations());

    Ok(
      Volume::new(record.name())
        .with_capacity_bytes(request.required_bytes())
        .with_volume_context(attributes.into_volume_context()),
    )
  }

  /// Asks the maya-apiserver to delete the volume. Under
  /// [`DeletePolicy::BestEffort`] a failed delete is only logged.
  #[instrument(name = "provisioner.delete_volume", skip(self))]
  pub async fn delete_volume(&self, volume_id: &str) -> Result<(), ProvisionError> {
    let config = self.resolve().await?;

    match self.api.delete(&config, volume_id).await {
      Ok(()) => Ok(()),
      Err(e) => match self.delete_policy {
        DeletePolicy::BestEffort => {
          error!(error = %e, "failed to delete volume, reporting success");
          Ok(())
        }
        DeletePolicy::Strict => {
          error!(error = %e, "failed to delete volume");
          Err(ProvisionError::Unavailable(e.to_string()))
        }
      },
    }
  }

  /// Lists volumes ordered by name. Tokens are the index of the first
  /// entry of the next page.
  #[instrument(name = "provisioner.list_volumes", skip(self))]
  pub async fn list_volumes(
    &self,
    max_entries: Option<NonZeroU32>,
    starting_token: Option<&str>,
  ) -> Result<VolumePage, ProvisionError> {
    let start = match starting_token {
      None => 0,
      Some(token) => token.parse::<usize>().map_err(|_| {
        ProvisionError::Aborted(format!("Invalid starting_token '{}'", token))
      })?,
    };

    let config = self.resolve().await?;
    let mut records = self.api.list(&config).await.map_err(|e| {
      error!(error = %e, "failed to list volumes");
      ProvisionError::Unavailable(e.to_string())
    })?;
    records.sort_by(|a, b| a.name().cmp(b.name()));

    if start > records.len() {
      return Err(ProvisionError::Aborted(format!(
        "starting_token {} is past the end of {} volumes",
        start,
        records.len()
      )));
    }

    let end = match max_entries {
      Some(max) => records.len().min(start.saturating_add(max.get() as usize)),
      None => records.len(),
    };
    let next_token = if end < records.len() {
      Some(end.to_string())
    } else {
      None
    };

    let volumes = records
      .drain(start..end)
      .map(|record| {
        let context = ConnectionAttributes::from_annotations(record.annotations()).into_volume_context();
        Volume::new(record.name()).with_volume_context(context)
      })
      .collect();

    Ok(VolumePage {
      volumes,
      next_token,
    })
  }
}

async fn create_or_reuse(
  api: Arc<dyn VolumeApi>,
  config: ProviderConfig,
  spec: VolumeSpec,
  lookup_policy: LookupPolicy,
) -> Result<VolumeRecord, ProvisionError> {
  let name = spec.name();

  let existing = match api.describe(&config, name).await {
    Ok(existing) => existing,
    Err(e) => match lookup_policy {
      LookupPolicy::Lenient => {
        warn!(error = %e, "volume lookup failed, assuming it does not exist");
        None
      }
      LookupPolicy::Strict => {
        error!(error = %e, "volume lookup failed");
        return Err(ProvisionError::Unavailable(e.to_string()));
      }
    },
  };

  match existing {
    Some(_) => info!("volume already exists, skipping creation"),
    None => {
      info!(size = spec.size_label(), "attempting to create volume");
      api.create(&config, &spec).await.map_err(|e| {
        error!(error = %e, timed_out = e.is_timeout(), "failed to create volume");
        ProvisionError::Unavailable(e.to_string())
      })?;
    }
  }

  match api.describe(&config, name).await {
    Ok(Some(record)) => Ok(record),
    Ok(None) => Err(ProvisionError::DeadlineExceeded(format!(
      "Unable to contact maya-apiserver: volume {} not found after create",
      name
    ))),
    Err(e) => {
      error!(error = %e, timed_out = e.is_timeout(), "failed to read volume back");
      Err(ProvisionError::DeadlineExceeded(format!(
        "Unable to contact maya-apiserver: {}",
        e
      )))
    }
  }
}
