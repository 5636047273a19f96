//! Registrar errors

use aws_sdk_sagemaker::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sagemaker::operation::create_model_package::CreateModelPackageError;
use aws_sdk_sagemaker::operation::create_model_package_group::CreateModelPackageGroupError;
use aws_sdk_sagemaker::operation::describe_model_package_group::DescribeModelPackageGroupError;
use thiserror;

pub type Result<T> = std::result::Result<T, Error>;

/// Service error codes the registry uses for throttling and transient server-side failures.
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "InternalFailure",
    "InternalServerError",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
];

/// General purpose registrar error handling.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config deserialization error")]
    ConfigError(#[from] serde_yaml::Error),
    #[error("io error")]
    IOError(#[from] std::io::Error),
    #[error("json error: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("http server error")]
    HyperError(#[from] hyper::Error),

    #[error("no region configured: set `registry.region` or AWS_REGION")]
    MissingRegion,

    #[error("missing request field: {0}")]
    MissingField(&'static str),
    #[error("invalid request field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("aws sdk describe model package group error")]
    AWSSDKDescribeModelPackageGroupError(#[from] SdkError<DescribeModelPackageGroupError>),
    #[error("aws sdk create model package group error")]
    AWSSDKCreateModelPackageGroupError(#[from] SdkError<CreateModelPackageGroupError>),
    #[error("aws sdk create model package error")]
    AWSSDKCreateModelPackageError(#[from] SdkError<CreateModelPackageError>),

    #[error("registry response missing {0}")]
    MissingResponseField(&'static str),
}

impl Error {
    /// Whether the failed call may succeed if attempted again unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::AWSSDKDescribeModelPackageGroupError(e) => sdk_error_is_transient(e),
            Error::AWSSDKCreateModelPackageGroupError(e) => sdk_error_is_transient(e),
            Error::AWSSDKCreateModelPackageError(e) => sdk_error_is_transient(e),
            _ => false,
        }
    }

    /// Short machine-readable name reported to invokers alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigError(_) => "ConfigError",
            Error::IOError(_) => "IOError",
            Error::JSONError(_) => "JSONError",
            Error::HyperError(_) => "HyperError",
            Error::MissingRegion => "MissingRegion",
            Error::MissingField(_) => "MissingField",
            Error::InvalidField { .. } => "InvalidField",
            Error::AWSSDKDescribeModelPackageGroupError(_) => "DescribeModelPackageGroupError",
            Error::AWSSDKCreateModelPackageGroupError(_) => "CreateModelPackageGroupError",
            Error::AWSSDKCreateModelPackageError(_) => "CreateModelPackageError",
            Error::MissingResponseField(_) => "MissingResponseField",
        }
    }
}

fn sdk_error_is_transient<E: ProvideErrorMetadata, R>(e: &SdkError<E, R>) -> bool {
    match e {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(service) => service
            .err()
            .code()
            .map_or(false, |code| TRANSIENT_ERROR_CODES.contains(&code)),
        _ => false,
    }
}
