use std::collections::HashMap;

pub const IQN_ANNOTATION: &str = "vsm.openebs.io/iqn";
pub const TARGET_PORTALS_ANNOTATION: &str = "vsm.openebs.io/targetportals";
pub const JIVA_TARGET_PORTAL_ANNOTATION: &str = "openebs.io/jiva-target-portal";

pub const IQN_KEY: &str = "iqn";
pub const TARGET_PORTAL_KEY: &str = "targetPortal";
pub const LUN_KEY: &str = "lun";
pub const PORTALS_KEY: &str = "portals";
pub const ISCSI_INTERFACE_KEY: &str = "iscsiInterface";

const LUN: &str = "0";
const ISCSI_INTERFACE: &str = "default";

/// iSCSI parameters a node needs to attach a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttributes {
  iqn: String,
  target_portal: String,
  lun: String,
  portals: String,
  iscsi_interface: String,
}

impl ConnectionAttributes {
  /// Reads the well-known annotations of a volume. Missing annotations
  /// become empty strings.
  pub fn from_annotations(annotations: &HashMap<String, String>) -> Self {
    let get = |key: &str| annotations.get(key).cloned().unwrap_or_default();

    ConnectionAttributes {
      iqn: get(IQN_ANNOTATION),
      target_portal: get(TARGET_PORTALS_ANNOTATION),
      lun: LUN.to_owned(),
      portals: get(JIVA_TARGET_PORTAL_ANNOTATION),
      iscsi_interface: ISCSI_INTERFACE.to_owned(),
    }
  }

  #[inline]
  pub fn iqn(&self) -> &str {
    &self.iqn
  }

  #[inline]
  pub fn target_portal(&self) -> &str {
    &self.target_portal
  }

  #[inline]
  pub fn lun(&self) -> &str {
    &self.lun
  }

  #[inline]
  pub fn portals(&self) -> &str {
    &self.portals
  }

  #[inline]
  pub fn iscsi_interface(&self) -> &str {
    &self.iscsi_interface
  }

  pub fn into_volume_context(self) -> HashMap<String, String> {
    let mut context = HashMap::with_capacity(5);
    context.insert(IQN_KEY.to_owned(), self.iqn);
    context.insert(TARGET_PORTAL_KEY.to_owned(), self.target_portal);
    context.insert(LUN_KEY.to_owned(), self.lun);
    context.insert(PORTALS_KEY.to_owned(), self.portals);
    context.insert(ISCSI_INTERFACE_KEY.to_owned(), self.iscsi_interface);
    context
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn annotations(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn only_iqn_present() {
    let attributes = ConnectionAttributes::from_annotations(&annotations(&[(
      IQN_ANNOTATION,
      "iqn.2016-09.com.openebs.jiva:pvc-1",
    )]));

    assert_eq!(attributes.iqn(), "iqn.2016-09.com.openebs.jiva:pvc-1");
    assert_eq!(attributes.target_portal(), "");
    assert_eq!(attributes.portals(), "");
    assert_eq!(attributes.lun(), "0");
    assert_eq!(attributes.iscsi_interface(), "default");
  }

  #[test]
  fn ignores_unknown_annotations() {
    let attributes = ConnectionAttributes::from_annotations(&annotations(&[
      (IQN_ANNOTATION, "iqn.2016-09.com.openebs.jiva:pvc-1"),
      (TARGET_PORTALS_ANNOTATION, "10.0.0.10:3260"),
      (JIVA_TARGET_PORTAL_ANNOTATION, "10.0.0.11:3260"),
      ("vsm.openebs.io/lun", "7"),
      ("openebs.io/iscsi-interface", "eth1"),
    ]));

    let context = attributes.into_volume_context();
    assert_eq!(context.len(), 5);
    assert_eq!(context[TARGET_PORTAL_KEY], "10.0.0.10:3260");
    assert_eq!(context[PORTALS_KEY], "10.0.0.11:3260");
    assert_eq!(context[LUN_KEY], "0");
    assert_eq!(context[ISCSI_INTERFACE_KEY], "default");
  }

  #[test]
  fn empty_annotations_yield_empty_values() {
    let context = ConnectionAttributes::from_annotations(&HashMap::new()).into_volume_context();
    assert_eq!(context[IQN_KEY], "");
    assert_eq!(context[TARGET_PORTAL_KEY], "");
    assert_eq!(context[PORTALS_KEY], "");
  }
}
