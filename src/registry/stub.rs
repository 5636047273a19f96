use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_sagemaker::error::SdkError;
use aws_sdk_sagemaker::operation::create_model_package::CreateModelPackageError;
use aws_sdk_sagemaker::operation::describe_model_package_group::DescribeModelPackageGroupError;

use crate::errors::{Error, Result};
use crate::registry::{GroupLookup, ModelPackageInput, ModelRegistry};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    DescribeGroup(String),
    CreateGroup { name: String, description: String },
    CreatePackage(ModelPackageInput),
}

/// In-memory registry that records every call made against it.
#[derive(Default)]
pub(crate) struct RecordingRegistry {
    groups: Mutex<HashSet<String>>,
    calls: Mutex<Vec<Call>>,
    describe_failure: Mutex<Option<fn() -> Error>>,
    create_group_failure: Mutex<Option<fn() -> Error>>,
    transient_describe_failures: Mutex<u32>,
    transient_package_failures: Mutex<u32>,
    package_attempts: Mutex<Vec<String>>,
}

impl RecordingRegistry {
    pub(crate) fn with_group(name: &str) -> Self {
        let registry = Self::default();
        registry.groups.lock().unwrap().insert(name.to_string());
        registry
    }

    /// Make every group lookup fail with the given error.
    pub(crate) fn fail_describe_with(self, failure: fn() -> Error) -> Self {
        *self.describe_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Make every group creation fail with the given error.
    pub(crate) fn fail_create_group_with(self, failure: fn() -> Error) -> Self {
        *self.create_group_failure.lock().unwrap() = Some(failure);
        self
    }

    /// Make the next `n` group lookups fail with a timeout.
    pub(crate) fn time_out_lookups(self, n: u32) -> Self {
        *self.transient_describe_failures.lock().unwrap() = n;
        self
    }

    /// Make the next `n` package creations fail with a timeout.
    pub(crate) fn time_out_packages(self, n: u32) -> Self {
        *self.transient_package_failures.lock().unwrap() = n;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn group_creations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreateGroup { name, .. } => Some(name),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn package_creations(&self) -> Vec<ModelPackageInput> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CreatePackage(input) => Some(input),
                _ => None,
            })
            .collect()
    }

    /// Client tokens of every package creation attempt, failed ones included.
    pub(crate) fn package_attempts(&self) -> Vec<String> {
        self.package_attempts.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub(crate) fn group_arn(name: &str) -> String {
    format!("arn:aws:sagemaker:us-east-1:123456789012:model-package-group/{name}")
}

pub(crate) fn package_arn(name: &str, version: usize) -> String {
    format!("arn:aws:sagemaker:us-east-1:123456789012:model-package/{name}/{version}")
}

#[async_trait]
impl ModelRegistry for RecordingRegistry {
    async fn describe_model_package_group(&self, name: &str) -> Result<GroupLookup> {
        self.record(Call::DescribeGroup(name.to_string()));
        if let Some(failure) = *self.describe_failure.lock().unwrap() {
            return Err(failure());
        }
        {
            let mut remaining = self.transient_describe_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SdkError::<DescribeModelPackageGroupError>::timeout_error(
                    "timed out",
                )
                .into());
            }
        }
        if self.groups.lock().unwrap().contains(name) {
            Ok(GroupLookup::Found {
                arn: group_arn(name),
            })
        } else {
            Ok(GroupLookup::Absent)
        }
    }

    async fn create_model_package_group(&self, name: &str, description: &str) -> Result<String> {
        self.record(Call::CreateGroup {
            name: name.to_string(),
            description: description.to_string(),
        });
        if let Some(failure) = *self.create_group_failure.lock().unwrap() {
            return Err(failure());
        }
        self.groups.lock().unwrap().insert(name.to_string());
        Ok(group_arn(name))
    }

    async fn create_model_package(&self, input: &ModelPackageInput) -> Result<String> {
        self.package_attempts
            .lock()
            .unwrap()
            .push(input.client_token.clone());
        {
            let mut remaining = self.transient_package_failures.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SdkError::<CreateModelPackageError>::timeout_error("timed out").into());
            }
        }
        self.record(Call::CreatePackage(input.clone()));
        let version = self.package_creations().len();
        Ok(package_arn(&input.model_package_group_name, version))
    }
}
