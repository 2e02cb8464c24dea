use std::io;
use thiserror::Error;
use url::Url;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MayaError {
  #[error("invalid maya-apiserver version: version is empty")]
  InvalidVersion,

  #[error("maya-apiserver address '{0}' has no host")]
  InvalidBase(String),

  #[error(transparent)]
  Url(#[from] url::ParseError),

  #[error("error when connecting to maya-apiserver at {url}: {source}")]
  Transport {
    url: Url,
    #[source]
    source: reqwest::Error,
  },

  #[error("error response from maya-apiserver for {url}: {status}")]
  Status {
    url: Url,
    status: reqwest::StatusCode,
  },

  #[error("failed to encode volume spec: {0}")]
  Encode(#[from] serde_yaml::Error),

  #[error("failed to decode maya-apiserver response from {url}: {source}")]
  Decode {
    url: Url,
    #[source]
    source: serde_json::Error,
  },

  /// Returned by the fake API when a failure was injected.
  #[cfg(any(test, feature = "fake"))]
  #[error("{0}")]
  Injected(String),
}

impl MayaError {
  /// Whether the request timed out before the server answered.
  pub fn is_timeout(&self) -> bool {
    match self {
      MayaError::Transport { source, .. } => source.is_timeout(),
      _ => false,
    }
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("failed to look up {host}: {source}")]
  Lookup {
    host: String,
    #[source]
    source: io::Error,
  },

  #[error("{host} did not resolve to any address")]
  NoAddress { host: String },

  #[error("invalid maya-apiserver address: {0}")]
  Url(#[from] url::ParseError),
}
