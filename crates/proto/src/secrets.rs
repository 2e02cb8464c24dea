use std::{collections::HashMap, fmt};

/// Credentials passed along with a request. Values never show up in
/// `Debug` output so requests can be recorded on tracing spans.
#[derive(Default, Clone)]
pub(crate) struct Secrets(HashMap<String, String>);

impl AsRef<HashMap<String, String>> for Secrets {
  #[inline]
  fn as_ref(&self) -> &HashMap<String, String> {
    &self.0
  }
}

impl From<HashMap<String, String>> for Secrets {
  #[inline]
  fn from(v: HashMap<String, String>) -> Self {
    Secrets(v)
  }
}

impl fmt::Debug for Secrets {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut keys = self.0.keys().collect::<Vec<_>>();
    keys.sort();

    let mut m = f.debug_map();
    for k in keys {
      m.key(k).value(&"SECRET");
    }

    m.finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_hides_values() {
    let mut map = HashMap::new();
    map.insert("password".to_owned(), "hunter2".to_owned());
    map.insert("user".to_owned(), "admin".to_owned());
    let secrets = Secrets::from(map);

    let printed = format!("{:?}", secrets);
    assert_eq!(printed, r#"{"password": "SECRET", "user": "SECRET"}"#);
    assert_eq!(secrets.as_ref().get("user").map(|v| &**v), Some("admin"));
  }
}
