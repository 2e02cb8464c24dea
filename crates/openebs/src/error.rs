use thiserror::Error;

/// Failure of a lifecycle call, already classified for the CO.
///
/// Cloneable so that concurrent creates of the same volume can share
/// one result.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
  /// The request failed validation. Never retried.
  #[error("{0}")]
  InvalidArgument(String),

  /// The maya-apiserver could not be found or refused the call.
  #[error("{0}")]
  Unavailable(String),

  /// The volume could not be read back after it was created.
  #[error("{0}")]
  DeadlineExceeded(String),

  /// A pagination token did not match the current volume list.
  #[error("{0}")]
  Aborted(String),
}

impl ProvisionError {
  pub fn code(&self) -> tonic::Code {
    match self {
      ProvisionError::InvalidArgument(_) => tonic::Code::InvalidArgument,
      ProvisionError::Unavailable(_) => tonic::Code::Unavailable,
      ProvisionError::DeadlineExceeded(_) => tonic::Code::DeadlineExceeded,
      ProvisionError::Aborted(_) => tonic::Code::Aborted,
    }
  }
}

impl From<ProvisionError> for tonic::Status {
  fn from(value: ProvisionError) -> Self {
    tonic::Status::new(value.code(), value.to_string())
  }
}
