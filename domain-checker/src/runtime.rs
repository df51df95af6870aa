//! Minimal AWS Lambda Runtime API loop.
//!
//! Fetches invocations from `AWS_LAMBDA_RUNTIME_API`, runs the handler and
//! posts back either the result string or an error document.

use crate::function::{handle_request, HandlerError};
use domain_checker_lib::DomainChecker;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

const RUNTIME_API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
const ERROR_TYPE_HEADER: &str = "lambda-runtime-function-error-type";

/// Environment variable holding the runtime API `host:port`.
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

/// Failure talking to the runtime API. Ends the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    MissingEndpoint,
    Http(String),
    Protocol(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::MissingEndpoint => {
                write!(f, "{} is not set; cannot reach the function runtime", RUNTIME_API_ENV)
            }
            RuntimeError::Http(msg) => write!(f, "Runtime API request failed: {}", msg),
            RuntimeError::Protocol(msg) => write!(f, "Unexpected runtime API response: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<reqwest::Error> for RuntimeError {
    fn from(err: reqwest::Error) -> Self {
        RuntimeError::Http(err.to_string())
    }
}

/// Error body posted for a failed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDocument {
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    #[serde(rename = "errorType")]
    pub error_type: String,
}

impl ErrorDocument {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
        }
    }
}

impl From<&HandlerError> for ErrorDocument {
    fn from(err: &HandlerError) -> Self {
        ErrorDocument::new(err.error_type(), err.to_string())
    }
}

/// One pending invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub request_id: String,
    pub payload: Vec<u8>,
}

/// HTTP client for the runtime API.
pub struct RuntimeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RuntimeClient {
    /// Create a client for `host:port`.
    pub fn new(endpoint: &str) -> Result<Self, RuntimeError> {
        // No request timeout: fetching the next invocation is a long poll.
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            base_url: format!("http://{}/{}/runtime", endpoint, RUNTIME_API_VERSION),
        })
    }

    /// Create a client from `AWS_LAMBDA_RUNTIME_API`.
    pub fn from_env() -> Result<Self, RuntimeError> {
        let endpoint = std::env::var(RUNTIME_API_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(RuntimeError::MissingEndpoint)?;
        Self::new(&endpoint)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Block until the next invocation arrives.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let url = format!("{}/invocation/next", self.base_url);
        let response = self.http_client.get(&url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(RuntimeError::Protocol(format!(
                "next invocation returned {}",
                response.status()
            )));
        }

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| RuntimeError::Protocol("missing request id header".to_string()))?;

        let payload = response.bytes().await?.to_vec();

        Ok(Invocation {
            request_id,
            payload,
        })
    }

    /// Report a successful result.
    pub async fn send_response(&self, request_id: &str, output: &str) -> Result<(), RuntimeError> {
        let url = format!("{}/invocation/{}/response", self.base_url, request_id);
        let body = serde_json::to_string(output)
            .map_err(|e| RuntimeError::Protocol(e.to_string()))?;

        let response = self.http_client.post(&url).body(body).send().await?;
        check_accepted(response.status())
    }

    /// Report a failed invocation.
    pub async fn send_error(
        &self,
        request_id: &str,
        document: &ErrorDocument,
    ) -> Result<(), RuntimeError> {
        let url = format!("{}/invocation/{}/error", self.base_url, request_id);

        let response = self
            .http_client
            .post(&url)
            .header(ERROR_TYPE_HEADER, document.error_type.as_str())
            .json(document)
            .send()
            .await?;
        check_accepted(response.status())
    }
}

fn check_accepted(status: StatusCode) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Protocol(format!("runtime rejected post with {}", status)))
    }
}

/// Decode an event payload and run the handler on it.
pub async fn process_invocation(
    checker: &DomainChecker,
    payload: &[u8],
    verbose: bool,
) -> Result<String, ErrorDocument> {
    let event: HashMap<String, String> = serde_json::from_slice(payload).map_err(|e| {
        ErrorDocument::new("InvalidEvent", format!("event is not a string map: {}", e))
    })?;

    handle_request(checker, &event, verbose)
        .await
        .map_err(|err| ErrorDocument::from(&err))
}

/// Serve invocations until the runtime API fails.
pub async fn run(
    client: &RuntimeClient,
    checker: &DomainChecker,
    verbose: bool,
) -> Result<(), RuntimeError> {
    tracing::info!(endpoint = client.base_url(), "Function runtime started");

    loop {
        let invocation = client.next_invocation().await?;
        tracing::debug!(request_id = %invocation.request_id, "Received invocation");

        match process_invocation(checker, &invocation.payload, verbose).await {
            Ok(output) => client.send_response(&invocation.request_id, &output).await?,
            Err(document) => client.send_error(&invocation.request_id, &document).await?,
        }
    }
}
