//! Shared client utilities and error types for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use vfxpipe_api_models::{FilesFoldersError, ProblemDetails};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish rejected requests from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
}

impl AppContext {
    /// Build a client that tags every request with `trace_id`.
    pub(crate) fn new(base_url: Url, timeout_secs: u64, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> CliResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// `GET {path}` and decode a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CliResult<T> {
        let response = self
            .client
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))?;
        decode(path, response).await
    }

    /// `POST {path}` with a JSON body and decode a JSON body.
    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> CliResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))?;
        decode(path, response).await
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> CliResult<T> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse {path} response: {err}")))
    } else {
        Err(classify_problem(response).await)
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Classify an HTTP error response into a CLI error.
///
/// Problem documents and the listing endpoint's `{error}` body are both understood.
pub(crate) async fn classify_problem(response: Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();
    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();

    let problem = serde_json::from_slice::<ProblemDetails>(&bytes).ok();
    let message = problem.as_ref().map_or_else(
        || {
            serde_json::from_slice::<FilesFoldersError>(&bytes)
                .map_or_else(|_| body_text.clone(), |body| body.error)
        },
        |problem| {
            let mut message = problem.detail.clone().unwrap_or_else(|| problem.title.clone());
            for param in problem.invalid_params.iter().flatten() {
                message.push_str(&format!("\n  {}: {}", param.pointer, param.message));
            }
            message
        },
    );

    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        CliError::validation(message)
    } else if message.is_empty() {
        CliError::failure(anyhow!("request failed with status {status}"))
    } else {
        CliError::failure(anyhow!("{message} (status {status})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use vfxpipe_api_models::PingResponse;

    use crate::commands::test_support::context;

    #[test]
    fn exit_codes_separate_rejections_from_failures() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("down")).exit_code(), 3);
        assert!(parse_url("not a url").is_err());
    }

    #[tokio::test]
    async fn requests_carry_the_trace_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ping")
                .header(HEADER_REQUEST_ID, "trace-test");
            then.status(200).json_body(json!({"message": "Pong!"}));
        });

        let ctx = context(&server)?;
        let pong: PingResponse = ctx
            .get_json("/ping")
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(pong, PingResponse::default());
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn problem_documents_become_validation_errors() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/ingest_request");
            then.status(400).json_body(json!({
                "type": "https://vfxpipe.dev/problems/bad-request",
                "title": "bad request",
                "status": 400,
                "detail": "ingest request is invalid",
                "invalid_params": [{"pointer": "/shot", "message": "must not be empty"}]
            }));
        });

        let ctx = context(&server)?;
        let outcome = ctx
            .post_json::<_, serde_json::Value>("/ingest_request", &json!({}))
            .await;
        match outcome {
            Err(CliError::Validation(message)) => {
                assert!(message.contains("ingest request is invalid"));
                assert!(message.contains("/shot"));
            }
            _ => anyhow::bail!("expected a validation error"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn listing_errors_are_operational_failures() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/get_files_folders");
            then.status(404)
                .json_body(json!({"error": "path does not exist"}));
        });

        let ctx = context(&server)?;
        let outcome = ctx
            .post_json::<_, serde_json::Value>("/get_files_folders", &json!({}))
            .await;
        let Err(err) = outcome else {
            anyhow::bail!("expected a failure");
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("path does not exist"));
        Ok(())
    }
}
