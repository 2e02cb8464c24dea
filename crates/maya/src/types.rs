use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const VOLUME_SPEC_KIND: &str = "PersistentVolumeClaim";
pub const VOLUME_SPEC_API_VERSION: &str = "v1";

/// Payload of a volume create request, sent as YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeSpec {
  kind: String,
  #[serde(rename = "apiVersion")]
  api_version: String,
  metadata: VolumeSpecMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct VolumeSpecMetadata {
  name: String,
  labels: VolumeSpecLabels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct VolumeSpecLabels {
  #[serde(rename = "volumeprovisioner.mapi.openebs.io/storage-size")]
  storage_size: String,
  #[serde(rename = "k8s.io/storage-class")]
  storage_class: String,
  #[serde(rename = "k8s.io/namespace")]
  namespace: String,
}

impl VolumeSpec {
  pub fn new(
    name: impl Into<String>,
    size_label: impl Into<String>,
    storage_class: impl Into<String>,
    namespace: impl Into<String>,
  ) -> Self {
    VolumeSpec {
      kind: VOLUME_SPEC_KIND.to_owned(),
      api_version: VOLUME_SPEC_API_VERSION.to_owned(),
      metadata: VolumeSpecMetadata {
        name: name.into(),
        labels: VolumeSpecLabels {
          storage_size: size_label.into(),
          storage_class: storage_class.into(),
          namespace: namespace.into(),
        },
      },
    }
  }

  #[inline]
  pub fn name(&self) -> &str {
    &self.metadata.name
  }

  /// Capacity as whole gigabytes, e.g. `5G`.
  #[inline]
  pub fn size_label(&self) -> &str {
    &self.metadata.labels.storage_size
  }

  #[inline]
  pub fn storage_class(&self) -> &str {
    &self.metadata.labels.storage_class
  }

  #[inline]
  pub fn namespace(&self) -> &str {
    &self.metadata.labels.namespace
  }

  #[inline]
  pub fn kind(&self) -> &str {
    &self.kind
  }

  #[inline]
  pub fn api_version(&self) -> &str {
    &self.api_version
  }

  pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(self)
  }
}

/// A volume as described by the maya-apiserver. Only metadata is
/// interpreted, `spec` and `status` are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VolumeRecord {
  #[serde(default)]
  metadata: ObjectMeta,
  #[serde(default)]
  spec: Value,
  #[serde(default)]
  status: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ObjectMeta {
  #[serde(default)]
  name: String,
  #[serde(default, deserialize_with = "string_map")]
  annotations: HashMap<String, String>,
  #[serde(default, deserialize_with = "string_map")]
  labels: HashMap<String, String>,
}

impl VolumeRecord {
  pub fn new(name: impl Into<String>) -> Self {
    VolumeRecord {
      metadata: ObjectMeta {
        name: name.into(),
        ..Default::default()
      },
      ..Default::default()
    }
  }

  pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.metadata.annotations.insert(key.into(), value.into());
    self
  }

  #[inline]
  pub fn name(&self) -> &str {
    &self.metadata.name
  }

  #[inline]
  pub fn annotations(&self) -> &HashMap<String, String> {
    &self.metadata.annotations
  }

  #[inline]
  pub fn labels(&self) -> &HashMap<String, String> {
    &self.metadata.labels
  }

  #[inline]
  pub fn spec(&self) -> &Value {
    &self.spec
  }

  #[inline]
  pub fn status(&self) -> &Value {
    &self.status
  }
}

/// Response of the volume list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct VolumeList {
  #[serde(default)]
  items: Option<Vec<VolumeRecord>>,
}

impl VolumeList {
  pub fn into_items(self) -> Vec<VolumeRecord> {
    self.items.unwrap_or_default()
  }
}

/// Strings are kept, scalars become text, nulls are dropped and nested
/// values are kept as JSON text.
fn string_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?;

  Ok(
    raw
      .unwrap_or_default()
      .into_iter()
      .filter_map(|(k, v)| match v {
        Value::Null => None,
        Value::String(s) => Some((k, s)),
        Value::Bool(b) => Some((k, b.to_string())),
        Value::Number(n) => Some((k, n.to_string())),
        nested => Some((k, nested.to_string())),
      })
      .collect(),
  )
}
