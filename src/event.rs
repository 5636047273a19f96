use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Event payload as received, before required fields are checked.
#[derive(Debug, Default, Deserialize)]
struct RawEvent {
    model_package_group_name: Option<String>,
    image_uri: Option<String>,
    model_url: Option<String>,
    content_type: Option<String>,
    response_mimetype: Option<String>,
}

/// A validated registration request.
///
/// Unknown fields in the incoming payload are ignored. All five fields are required and must be
/// non-empty; the group name must also be a valid model package group name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationEvent {
    pub model_package_group_name: String,
    pub image_uri: String,
    pub model_url: String,
    pub content_type: String,
    pub response_mimetype: String,
}

impl RegistrationEvent {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawEvent = serde_json::from_value(value)?;
        raw.try_into()
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: RawEvent = serde_json::from_slice(bytes)?;
        raw.try_into()
    }
}

impl TryFrom<RawEvent> for RegistrationEvent {
    type Error = Error;

    fn try_from(raw: RawEvent) -> Result<Self> {
        let model_package_group_name =
            required("model_package_group_name", raw.model_package_group_name)?;
        validate_group_name(&model_package_group_name)?;
        Ok(Self {
            model_package_group_name,
            image_uri: required("image_uri", raw.image_uri)?,
            model_url: required("model_url", raw.model_url)?,
            content_type: required("content_type", raw.content_type)?,
            response_mimetype: required("response_mimetype", raw.response_mimetype)?,
        })
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        None => Err(Error::MissingField(field)),
        Some(s) if s.trim().is_empty() => Err(Error::InvalidField {
            field,
            reason: String::from("must not be empty"),
        }),
        Some(s) => Ok(s),
    }
}

fn validate_group_name(name: &str) -> Result<()> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9](-*[a-zA-Z0-9]){0,62}$").unwrap());
    if RE.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidField {
            field: "model_package_group_name",
            reason: format!("must match {}", RE.as_str()),
        })
    }
}

/// The invocation result handed back to the hosting runtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// A 200 response whose body is `value` encoded as JSON.
    pub fn ok<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(value)?,
        })
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use serde_json::json;

    use super::*;

    fn full() -> serde_json::Value {
        json!({
            "model_package_group_name": "g1",
            "image_uri": "img:1",
            "model_url": "s3://bucket/model.tar.gz",
            "content_type": "text/csv",
            "response_mimetype": "application/json",
        })
    }

    #[test]
    fn decodes_complete_event() {
        let mut value = full();
        value["unrelated"] = json!(42);
        let event = RegistrationEvent::from_value(value).unwrap();
        assert_eq!(
            event,
            RegistrationEvent {
                model_package_group_name: String::from("g1"),
                image_uri: String::from("img:1"),
                model_url: String::from("s3://bucket/model.tar.gz"),
                content_type: String::from("text/csv"),
                response_mimetype: String::from("application/json"),
            }
        );
    }

    #[rstest]
    #[case::group("model_package_group_name")]
    #[case::image("image_uri")]
    #[case::model("model_url")]
    #[case::content_type("content_type")]
    #[case::response_mimetype("response_mimetype")]
    fn missing_field(#[case] field: &'static str) {
        let mut value = full();
        value.as_object_mut().unwrap().remove(field);
        match RegistrationEvent::from_value(value) {
            Err(Error::MissingField(f)) => assert_eq!(f, field),
            other => panic!("expected MissingField({field}), got {other:?}"),
        }
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading_dash("-g1")]
    #[case::underscore("my_group")]
    #[case::too_long(&"a".repeat(64))]
    fn invalid_group_name(#[case] name: &str) {
        let mut value = full();
        value["model_package_group_name"] = json!(name);
        assert!(matches!(
            RegistrationEvent::from_value(value),
            Err(Error::InvalidField {
                field: "model_package_group_name",
                ..
            })
        ));
    }

    #[test]
    fn empty_field_is_invalid() {
        let mut value = full();
        value["image_uri"] = json!("  ");
        assert!(matches!(
            RegistrationEvent::from_value(value),
            Err(Error::InvalidField { field: "image_uri", .. })
        ));
    }

    #[test]
    fn non_string_field_is_rejected() {
        let mut value = full();
        value["model_url"] = json!(7);
        assert!(matches!(
            RegistrationEvent::from_value(value),
            Err(Error::JSONError(_))
        ));
    }

    #[test]
    fn response_body_is_json_encoded() {
        let response = InvocationResponse::ok("arn:aws:sagemaker:us-east-1:1:model-package/g1/1").unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body,
            "\"arn:aws:sagemaker:us-east-1:1:model-package/g1/1\""
        );
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["statusCode"], json!(200));
    }
}
