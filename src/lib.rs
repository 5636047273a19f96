//! # Model Registrar
//!
//! Registers a trained model artifact as a new, approved version in a model registry: the
//! target model package group is created on first use, then a model package version pointing
//! at the container image and the artifact location is created and its ARN returned.
//!
//! [`Registrar`] holds the procedure and is generic over [`registry::ModelRegistry`];
//! [`registry::SageMaker`] talks to the SageMaker Model Registry.
mod config;
pub use config::Config;
pub use config::RegistryBackend;

mod errors;
pub use errors::{Error, Result};

mod event;
pub use event::{InvocationResponse, RegistrationEvent};

mod registrar;
pub use registrar::{Descriptions, Registrar};

mod retry;
pub use retry::{Backoff, RetryConfig};

pub mod http;
pub mod registry;
