//! OpenEBS volume provisioning behind the CSI controller service.

pub mod attributes;
pub mod config;
mod driver;
mod error;
mod inflight;
mod provision;
pub mod spec;
pub mod validate;

pub use config::Config;
pub use driver::{OpenEbsPlugin, DEFAULT_DRIVER_NAME};
pub use error::ProvisionError;
pub use provision::{DeletePolicy, LookupPolicy, Provisioner, VolumePage};
