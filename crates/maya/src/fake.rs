use crate::{MayaError, ProviderConfig, VolumeApi, VolumeRecord, VolumeSpec};
use async_trait::async_trait;
use std::{
  collections::{BTreeMap, HashMap},
  sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
  Describe { name: String },
  Create { spec: VolumeSpec },
  Delete { name: String },
  List,
}

#[derive(Default)]
struct FakeVolumeApiInner {
  volumes: BTreeMap<String, VolumeRecord>,
  log: Vec<FakeCall>,
  created_annotations: HashMap<String, String>,
  fail_describe: bool,
  fail_create: bool,
  fail_delete: bool,
  fail_list: bool,
  hide_created: bool,
}

/// In-memory maya-apiserver that records every call.
#[derive(Default)]
pub struct FakeVolumeApi(Mutex<FakeVolumeApiInner>);

impl FakeVolumeApi {
  pub fn new(volumes: impl IntoIterator<Item = VolumeRecord>) -> Self {
    let inner = FakeVolumeApiInner {
      volumes: volumes
        .into_iter()
        .map(|v| (v.name().to_owned(), v))
        .collect(),
      ..Default::default()
    };

    Self(Mutex::new(inner))
  }

  fn lock(&self) -> MutexGuard<'_, FakeVolumeApiInner> {
    self.0.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn reset_log(&self) {
    self.lock().log.clear();
  }

  pub fn get_log(&self) -> Vec<FakeCall> {
    self.lock().log.clone()
  }

  /// Number of create calls seen so far.
  pub fn create_count(&self) -> usize {
    self
      .lock()
      .log
      .iter()
      .filter(|c| matches!(c, FakeCall::Create { .. }))
      .count()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.lock().volumes.contains_key(name)
  }

  /// Annotations given to volumes created through the fake.
  pub fn set_created_annotations(&self, annotations: HashMap<String, String>) {
    self.lock().created_annotations = annotations;
  }

  pub fn set_fail_describe(&self, fail: bool) {
    self.lock().fail_describe = fail;
  }

  pub fn set_fail_create(&self, fail: bool) {
    self.lock().fail_create = fail;
  }

  pub fn set_fail_delete(&self, fail: bool) {
    self.lock().fail_delete = fail;
  }

  pub fn set_fail_list(&self, fail: bool) {
    self.lock().fail_list = fail;
  }

  /// Accept creates without making the volume visible to describe.
  pub fn set_hide_created(&self, hide: bool) {
    self.lock().hide_created = hide;
  }
}

#[async_trait]
impl VolumeApi for FakeVolumeApi {
  async fn describe(
    &self,
    _config: &ProviderConfig,
    name: &str,
  ) -> Result<Option<VolumeRecord>, MayaError> {
    tokio::task::yield_now().await;
    let mut inner = self.lock();
    inner.log.push(FakeCall::Describe {
      name: name.to_owned(),
    });

    if inner.fail_describe {
      return Err(MayaError::Injected(format!("describe {} failed", name)));
    }

    Ok(inner.volumes.get(name).cloned())
  }

  async fn create(&self, _config: &ProviderConfig, spec: &VolumeSpec) -> Result<(), MayaError> {
    tokio::task::yield_now().await;
    let mut inner = self.lock();
    inner.log.push(FakeCall::Create { spec: spec.clone() });

    if inner.fail_create {
      return Err(MayaError::Injected(format!("create {} failed", spec.name())));
    }

    if !inner.hide_created {
      let record = inner
        .created_annotations
        .iter()
        .fold(VolumeRecord::new(spec.name()), |record, (k, v)| {
          record.with_annotation(k.clone(), v.clone())
        });
      inner.volumes.insert(spec.name().to_owned(), record);
    }

    info!("Fake maya: created {}", spec.name());
    Ok(())
  }

  async fn delete(&self, _config: &ProviderConfig, name: &str) -> Result<(), MayaError> {
    tokio::task::yield_now().await;
    let mut inner = self.lock();
    inner.log.push(FakeCall::Delete {
      name: name.to_owned(),
    });

    if inner.fail_delete {
      return Err(MayaError::Injected(format!("delete {} failed", name)));
    }

    inner.volumes.remove(name);
    info!("Fake maya: deleted {}", name);
    Ok(())
  }

  async fn list(&self, _config: &ProviderConfig) -> Result<Vec<VolumeRecord>, MayaError> {
    tokio::task::yield_now().await;
    let mut inner = self.lock();
    inner.log.push(FakeCall::List);

    if inner.fail_list {
      return Err(MayaError::Injected("list failed".to_owned()));
    }

    Ok(inner.volumes.values().cloned().collect())
  }
}
