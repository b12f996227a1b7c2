//! Translation of payload validation failures into `invalid_request` errors.
//!
//! Every error carries `details: {field, code}` so clients can point at the
//! offending input.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, PathError};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::domain::{Error, LoginValidationError, ResourceValidationError};

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field, "code": code }))
}

pub(crate) fn login_validation_error(err: LoginValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

pub(crate) fn resource_validation_error(err: ResourceValidationError) -> Error {
    let (field, code) = match &err {
        ResourceValidationError::EmptyTitle => ("title", "empty_title"),
        ResourceValidationError::EmptyContent => ("content", "empty_content"),
        ResourceValidationError::UnknownCategory { .. } => ("category", "unknown_category"),
    };
    field_error(field, code, err.to_string())
}

pub(crate) fn empty_password_error() -> Error {
    field_error("password", "empty_password", "password must not be empty")
}

fn invalid_body(message: String) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": "invalid_body" }))
}

/// Decode a raw JSON body with the same error shape as [`json_error_handler`].
///
/// Admin-only writes take the body as bytes and decode it here once the
/// role check has passed.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(error = %err, "rejected JSON payload");
        invalid_body(format!("invalid request body: {err}"))
    })
}

/// `JsonConfig` error handler: malformed or unexpected bodies become 400s
/// in the standard error shape.
pub(crate) fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON payload");
    let message = match &err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid request body: {inner}"),
        _ => "invalid request body".to_owned(),
    };
    invalid_body(message).into()
}

/// `PathConfig` error handler: non-numeric ids become 400s.
pub(crate) fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected path parameter");
    field_error("id", "invalid_id", "id must be an integer").into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(ResourceValidationError::EmptyTitle, "title", "empty_title")]
    #[case(ResourceValidationError::EmptyContent, "content", "empty_content")]
    #[case(
        ResourceValidationError::UnknownCategory { value: "misc".into() },
        "category",
        "unknown_category"
    )]
    fn resource_errors_name_the_field(
        #[case] err: ResourceValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = resource_validation_error(err);
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            mapped.details(),
            Some(&json!({ "field": field, "code": code }))
        );
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Rename {
        title: String,
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b"{".as_slice())]
    #[case(br#"{"title":1}"#.as_slice())]
    #[case(br#"{"title":"x","id":3}"#.as_slice())]
    fn bad_bodies_are_invalid_body_errors(#[case] body: &[u8]) {
        let err = parse_json_body::<Rename>(body).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.message().starts_with("invalid request body"));
        assert_eq!(err.details(), Some(&json!({ "code": "invalid_body" })));
    }

    #[rstest]
    fn well_formed_bodies_decode() {
        let parsed: Rename = parse_json_body(br#"{"title":"x"}"#).expect("decodes");
        assert_eq!(parsed.title, "x");
    }

    #[rstest]
    fn login_errors_reuse_domain_codes() {
        let mapped = login_validation_error(LoginValidationError::EmptyPassword);
        assert_eq!(mapped.message(), "password must not be empty");
        assert_eq!(
            mapped.details(),
            Some(&json!({ "field": "password", "code": "empty_password" }))
        );
    }
}
