//! # Registry Abstractions
//!
//! [`ModelRegistry`] is the seam between the [`crate::Registrar`] and the service that stores
//! model package groups and versions. The SageMaker Model Registry implementation lives in
//! [`sagemaker`]; tests substitute a recording stub.
use std::fmt;

use async_trait::async_trait;

use crate::errors::Result;

mod sagemaker;
pub use sagemaker::{SageMaker, SageMakerConfig, StaticCredentials};

#[cfg(test)]
pub(crate) mod stub;

/// Outcome of looking up a model package group by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupLookup {
    Found { arn: String },
    /// The registry confirmed no group with that name exists.
    Absent,
}

/// Approval status recorded on a model package version.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApprovalStatus {
    Approved,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Approved => "Approved",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerDefinition {
    pub image: String,
    pub model_data_url: String,
}

/// How a model package version is served: its containers and the data formats it accepts and
/// produces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceSpecification {
    pub containers: Vec<ContainerDefinition>,
    pub supported_content_types: Vec<String>,
    pub supported_response_mime_types: Vec<String>,
}

/// Everything needed to create one model package version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPackageInput {
    pub model_package_group_name: String,
    pub description: String,
    pub approval_status: ApprovalStatus,
    pub inference_specification: InferenceSpecification,
    /// Idempotency token; a retried request carrying the same token creates at most one version.
    pub client_token: String,
}

/// Access to a model registry service.
///
/// Implementations perform exactly one remote call per method; retrying is left to the caller.
#[async_trait]
pub trait ModelRegistry: Send + Sync + 'static {
    /// Look up a model package group. A confirmed "does not exist" is
    /// [`GroupLookup::Absent`]; every other failure is an error.
    async fn describe_model_package_group(&self, name: &str) -> Result<GroupLookup>;

    /// Create a model package group, returning its ARN.
    async fn create_model_package_group(&self, name: &str, description: &str) -> Result<String>;

    /// Create a new model package version, returning its ARN.
    async fn create_model_package(&self, input: &ModelPackageInput) -> Result<String>;
}
