use serde::Deserialize;
use uuid::Uuid;

use crate::errors::Result;
use crate::event::{InvocationResponse, RegistrationEvent};
use crate::registry::{
    ApprovalStatus, ContainerDefinition, GroupLookup, InferenceSpecification, ModelPackageInput,
    ModelRegistry,
};
use crate::retry::Backoff;

/// Fixed descriptions attached to everything the registrar creates.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Descriptions {
    pub group: String,
    pub package: String,
}

impl Default for Descriptions {
    fn default() -> Self {
        Self {
            group: String::from("Sample model package group"),
            package: String::from(
                "Model to detect 3 different types of irises (Setosa, Versicolour, and Virginica)",
            ),
        }
    }
}

/// Registers model artifacts as new, approved model package versions.
///
/// Each registration makes at most three sequential registry calls: a group lookup, a group
/// creation if the lookup confirmed the group is absent, and the version creation. Every call
/// goes through the configured [`Backoff`].
pub struct Registrar<R: ModelRegistry> {
    registry: R,
    backoff: Backoff,
    descriptions: Descriptions,
}

impl<R: ModelRegistry> Registrar<R> {
    pub fn new(registry: R, backoff: Backoff, descriptions: Descriptions) -> Self {
        Self {
            registry,
            backoff,
            descriptions,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Create the model package group unless the registry already has it.
    #[tracing::instrument(skip(self))]
    pub async fn ensure_group_exists(&self, group_name: &str) -> Result<()> {
        let lookup = self
            .backoff
            .retry("DescribeModelPackageGroup", || {
                self.registry.describe_model_package_group(group_name)
            })
            .await?;

        match lookup {
            GroupLookup::Found { arn } => {
                tracing::debug!(%arn, "model package group exists");
            }
            GroupLookup::Absent => {
                let arn = self
                    .backoff
                    .retry("CreateModelPackageGroup", || {
                        self.registry
                            .create_model_package_group(group_name, &self.descriptions.group)
                    })
                    .await?;
                tracing::info!(%arn, "created model package group");
            }
        }
        Ok(())
    }

    /// Create a new approved model package version and return its ARN.
    #[tracing::instrument(skip(self))]
    pub async fn register_model_version(
        &self,
        group_name: &str,
        image_uri: &str,
        content_type: &str,
        response_mimetype: &str,
        model_url: &str,
    ) -> Result<String> {
        let input = ModelPackageInput {
            model_package_group_name: group_name.to_string(),
            description: self.descriptions.package.clone(),
            approval_status: ApprovalStatus::Approved,
            inference_specification: InferenceSpecification {
                containers: vec![ContainerDefinition {
                    image: image_uri.to_string(),
                    model_data_url: model_url.to_string(),
                }],
                supported_content_types: vec![content_type.to_string()],
                supported_response_mime_types: vec![response_mimetype.to_string()],
            },
            client_token: Uuid::new_v4().to_string(),
        };

        let arn = self
            .backoff
            .retry("CreateModelPackage", || {
                self.registry.create_model_package(&input)
            })
            .await?;
        tracing::info!(%arn, "registered model package version");
        Ok(arn)
    }

    /// Entry point for one invocation: validate the event, make sure its group exists and
    /// register the version.
    pub async fn handle_request(&self, event: serde_json::Value) -> Result<InvocationResponse> {
        tracing::debug!(%event, "received event");
        let event = RegistrationEvent::from_value(event)?;
        self.register(&event).await
    }

    pub async fn register(&self, event: &RegistrationEvent) -> Result<InvocationResponse> {
        self.ensure_group_exists(&event.model_package_group_name)
            .await?;
        let arn = self
            .register_model_version(
                &event.model_package_group_name,
                &event.image_uri,
                &event.content_type,
                &event.response_mimetype,
                &event.model_url,
            )
            .await?;
        InvocationResponse::ok(&arn)
    }
}
