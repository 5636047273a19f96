use std::fmt;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_sagemaker::config::retry::RetryConfig;
use aws_sdk_sagemaker::config::Region;
use aws_sdk_sagemaker::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sagemaker::types;
use aws_sdk_sagemaker::Client;
use serde::Deserialize;

pub(crate) mod logging;
use crate::{
    errors::{Error, Result},
    registry::sagemaker::logging::LoggingInterceptor,
    registry::{
        ApprovalStatus, GroupLookup, InferenceSpecification, ModelPackageInput, ModelRegistry,
    },
};

/// Connection settings for the SageMaker Model Registry.
///
/// Credentials default to the ambient AWS provider chain; `credentials` is meant for local
/// endpoints that need fixed keys.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SageMakerConfig {
    region: Option<String>,
    endpoint_url: Option<String>,
    credentials: Option<StaticCredentials>,
}

#[derive(Clone, Deserialize)]
pub struct StaticCredentials {
    access_key: String,
    secret_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .finish()
    }
}

impl SageMakerConfig {
    /// The configured region, falling back to `AWS_REGION`.
    pub fn region(&self) -> Result<String> {
        region_or_env(self.region.clone(), std::env::var("AWS_REGION").ok())
    }

    pub async fn new_registry(&self) -> Result<SageMaker> {
        let region = self.region()?;
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        // retries are owned by the registrar's backoff policy
        let mut builder = aws_sdk_sagemaker::config::Builder::from(&sdk_config)
            .region(Region::new(region.clone()))
            .retry_config(RetryConfig::disabled())
            .interceptor(LoggingInterceptor);

        if let Some(endpoint_url) = &self.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        if let Some(creds) = &self.credentials {
            builder = builder.credentials_provider(SharedCredentialsProvider::new(
                Credentials::new(
                    creds.access_key.clone(),
                    creds.secret_key.clone(),
                    None,
                    None,
                    "model-registrar",
                ),
            ));
        }

        tracing::debug!(%region, endpoint_url = ?self.endpoint_url, "sagemaker client configured");

        Ok(SageMaker {
            client: Client::from_conf(builder.build()),
        })
    }
}

fn region_or_env(configured: Option<String>, env: Option<String>) -> Result<String> {
    configured
        .or(env)
        .filter(|r| !r.trim().is_empty())
        .ok_or(Error::MissingRegion)
}

#[derive(Clone, Debug)]
pub struct SageMaker {
    client: Client,
}

#[async_trait]
impl ModelRegistry for SageMaker {
    async fn describe_model_package_group(&self, name: &str) -> Result<GroupLookup> {
        match self
            .client
            .describe_model_package_group()
            .model_package_group_name(name)
            .send()
            .await
        {
            Ok(output) => Ok(GroupLookup::Found {
                arn: required_arn(output.model_package_group_arn(), "ModelPackageGroupArn")?,
            }),
            Err(SdkError::ServiceError(e)) if is_not_found(e.err()) => Ok(GroupLookup::Absent),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_model_package_group(&self, name: &str, description: &str) -> Result<String> {
        let output = self
            .client
            .create_model_package_group()
            .model_package_group_name(name)
            .model_package_group_description(description)
            .send()
            .await?;

        required_arn(output.model_package_group_arn(), "ModelPackageGroupArn")
    }

    async fn create_model_package(&self, input: &ModelPackageInput) -> Result<String> {
        let output = self
            .client
            .create_model_package()
            .model_package_group_name(&input.model_package_group_name)
            .model_package_description(&input.description)
            .model_approval_status(approval_status(input.approval_status))
            .inference_specification(inference_specification(&input.inference_specification))
            .client_token(&input.client_token)
            .send()
            .await?;

        required_arn(output.model_package_arn(), "ModelPackageArn")
    }
}

fn inference_specification(inference: &InferenceSpecification) -> types::InferenceSpecification {
    let mut builder = types::InferenceSpecification::builder();
    for container in &inference.containers {
        builder = builder.containers(
            types::ModelPackageContainerDefinition::builder()
                .image(&container.image)
                .model_data_url(&container.model_data_url)
                .build(),
        );
    }
    for content_type in &inference.supported_content_types {
        builder = builder.supported_content_types(content_type);
    }
    for mime_type in &inference.supported_response_mime_types {
        builder = builder.supported_response_mime_types(mime_type);
    }
    builder.build()
}

fn approval_status(status: ApprovalStatus) -> types::ModelApprovalStatus {
    match status {
        ApprovalStatus::Approved => types::ModelApprovalStatus::Approved,
    }
}

/// SageMaker reports a missing model package group as a validation error rather than a
/// dedicated not-found code.
fn is_not_found<E: ProvideErrorMetadata>(err: &E) -> bool {
    match err.code() {
        Some("ResourceNotFound") => true,
        Some("ValidationException") => err
            .message()
            .map_or(false, |m| m.contains("does not exist")),
        _ => false,
    }
}

// Accepts both `&str` and `Option<&str>` accessors.
fn required_arn<'a>(arn: impl Into<Option<&'a str>>, field: &'static str) -> Result<String> {
    match arn.into() {
        Some(arn) if !arn.is_empty() => Ok(arn.to_string()),
        _ => Err(Error::MissingResponseField(field)),
    }
}
