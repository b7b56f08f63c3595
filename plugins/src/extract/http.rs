use std::time::Duration;
use std::{error::Error as StdError, fmt};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use rowflow_core::config::SourceConfig;
use serde::Serialize;
use serde_json::Value;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    Build,
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl ExtractErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ExtractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ExtractError {
    kind: ExtractErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl ExtractError {
    pub fn kind(&self) -> ExtractErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn build(message: impl Into<String>) -> Self {
        ExtractError {
            kind: ExtractErrorKind::Build,
            status: None,
            url: None,
            message: message.into(),
            source: None,
        }
    }

    fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let kind = if err.is_timeout() {
            ExtractErrorKind::Timeout
        } else if err.is_connect() {
            ExtractErrorKind::Connect
        } else if err.is_request() {
            ExtractErrorKind::Request
        } else if err.is_body() {
            ExtractErrorKind::Body
        } else if err.is_decode() {
            ExtractErrorKind::Decode
        } else {
            ExtractErrorKind::Unknown
        };
        ExtractError {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    fn status_error(status: u16, url: &str, preview: String) -> Self {
        ExtractError {
            kind: ExtractErrorKind::Status,
            status: Some(status),
            url: Some(url.to_string()),
            message: preview,
            source: None,
        }
    }

    fn decode_error(status: u16, url: &str, err: serde_json::Error, preview: String) -> Self {
        ExtractError {
            kind: ExtractErrorKind::Decode,
            status: Some(status),
            url: Some(url.to_string()),
            message: format!("failed to decode response body: {} | body={}", err, preview),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for ExtractError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

async fn parse_json_response(resp: reqwest::Response) -> Result<Value, ExtractError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| ExtractError::from_reqwest(err, &url))?;

    if !status.is_success() {
        return Err(ExtractError::status_error(
            status.as_u16(),
            &url,
            preview_body(&body),
        ));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<Value>(&body)
        .map_err(|err| ExtractError::decode_error(status.as_u16(), &url, err, preview_body(&body)))
}

/// Thin JSON-over-HTTP client shared by the fund-list source and the HTTP sink.
#[derive(Clone)]
pub struct HttpExtractor {
    http: reqwest::Client,
}

impl HttpExtractor {
    pub fn new(user_agent: &str, timeout_ms: u64) -> Result<Self, ExtractError> {
        Self::with_headers(user_agent, timeout_ms, &[])
    }

    /// Client sending `headers` (name, value) with every request.
    pub fn with_headers(
        user_agent: &str,
        timeout_ms: u64,
        headers: &[(&str, &str)],
    ) -> Result<Self, ExtractError> {
        let mut default_headers = HeaderMap::new();
        if !user_agent.trim().is_empty() {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| ExtractError::build(format!("invalid user agent: {e}")))?;
            default_headers.insert(USER_AGENT, value);
        }
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ExtractError::build(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ExtractError::build(format!("invalid header value for {name}: {e}")))?;
            default_headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| ExtractError::build(e.to_string()))?;
        Ok(Self { http })
    }

    pub fn from_config(cfg: &SourceConfig) -> Result<Self, ExtractError> {
        Self::new(&cfg.user_agent, cfg.timeout_ms)
    }

    /// GET `url` and decode the body as JSON; an empty body yields `null`.
    pub async fn get_json(&self, url: &str) -> Result<Value, ExtractError> {
        tracing::debug!(stage = "extract.get.in", url = %url);
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ExtractError::from_reqwest(err, url))?;
        let status = resp.status();
        let value = parse_json_response(resp).await?;
        tracing::debug!(stage = "extract.get.out", status = %status);
        Ok(value)
    }

    /// POST `body` as JSON to `url`, optionally authenticated with a bearer token.
    pub async fn post_json<T>(
        &self,
        url: &str,
        body: &T,
        bearer: Option<&str>,
    ) -> Result<Value, ExtractError>
    where
        T: Serialize + ?Sized,
    {
        let mut req = self.http.post(url).json(body);
        if let Some(token) = bearer.filter(|t| !t.trim().is_empty()) {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|err| ExtractError::from_reqwest(err, url))?;
        parse_json_response(resp).await
    }
}
