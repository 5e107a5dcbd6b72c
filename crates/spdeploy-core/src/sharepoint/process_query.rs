//! ProcessQuery invocation and result interpretation.

use serde_json::Value;
use tracing::warn;

use super::process_query_url;
use crate::error::{DeployError, DeployStage};
use crate::http::{HttpError, RequestHeaders, SharePointTransport, XML_CONTENT_TYPE};

const DEPLOY_FAILURE: &str = "failed to deploy the solution";

/// Position of the query result frame in the ProcessQuery response array.
const RESULT_FRAME: usize = 2;
const DEPLOYED_FLAG: &str = "IsClientSideSolutionCurrentVersionDeployed";

/// POST the action script and confirm the solution reports itself deployed.
///
/// The XML content type applies to this request only.
pub async fn invoke_deploy(
    transport: &dyn SharePointTransport,
    site_url: &str,
    headers: &RequestHeaders,
    payload: String,
) -> Result<(), DeployError> {
    let url = process_query_url(site_url);
    let xml_headers = headers.with_content_type(XML_CONTENT_TYPE);

    let response = transport
        .post_json(&url, &xml_headers, Some(payload))
        .await
        .map_err(|e| match e {
            HttpError::Json(e) => DeployError::Parse {
                stage: DeployStage::Deploy,
                url: url.clone(),
                message: e.to_string(),
            },
            other => {
                warn!(error = %other, "ProcessQuery request failed");
                DeployError::transport(DeployStage::Deploy, DEPLOY_FAILURE)
            }
        })?;

    if is_solution_deployed(&response) {
        return Ok(());
    }

    if let Some(message) = error_message(&response) {
        warn!(error = %message, "ProcessQuery reported an error");
    }
    Err(DeployError::shape(DeployStage::Deploy, DEPLOY_FAILURE))
}

/// True only when frame 2 carries `IsClientSideSolutionCurrentVersionDeployed: true`.
pub fn is_solution_deployed(response: &Value) -> bool {
    response
        .as_array()
        .and_then(|frames| frames.get(RESULT_FRAME))
        .and_then(|frame| frame.get(DEPLOYED_FLAG))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn error_message(response: &Value) -> Option<&str> {
    response
        .as_array()?
        .first()?
        .get("ErrorInfo")?
        .get("ErrorMessage")?
        .as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_frame() -> Value {
        json!({"SchemaVersion": "15.0.0.0", "LibraryVersion": "16.0.0.0", "ErrorInfo": null})
    }

    #[test]
    fn deployed_when_frame_two_is_true() {
        let response = json!([header_frame(), 6, {DEPLOYED_FLAG: true}]);
        assert!(is_solution_deployed(&response));
    }

    #[test]
    fn not_deployed_when_flag_false_or_absent() {
        assert!(!is_solution_deployed(&json!([header_frame(), 6, {DEPLOYED_FLAG: false}])));
        assert!(!is_solution_deployed(&json!([header_frame(), 6, {}])));
    }

    #[test]
    fn not_deployed_when_array_too_short_or_wrong_shape() {
        assert!(!is_solution_deployed(&json!([header_frame(), 6])));
        assert!(!is_solution_deployed(&json!({DEPLOYED_FLAG: true})));
        assert!(!is_solution_deployed(&json!([header_frame(), {DEPLOYED_FLAG: true}])));
    }

    #[test]
    fn flag_must_be_boolean() {
        assert!(!is_solution_deployed(&json!([header_frame(), 6, {DEPLOYED_FLAG: "true"}])));
    }

    #[test]
    fn reads_error_info_message() {
        let response = json!([{
            "SchemaVersion": "15.0.0.0",
            "ErrorInfo": {"ErrorMessage": "Access denied.", "ErrorCode": -2147024891}
        }]);
        assert_eq!(error_message(&response), Some("Access denied."));
        assert_eq!(error_message(&json!([header_frame()])), None);
    }
}
