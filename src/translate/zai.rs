//! Z.AI chat/completions client (OpenAI-compatible wire format).
//! Single attempt per call; the HTTP timeout comes from configuration.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CompletionGateway, CompletionRequest, TranslateError};
use crate::config::CompletionConfig;

pub struct ZaiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ZaiClient {
    /// Build the client. Any failure here is fatal at startup.
    pub fn new(config: &CompletionConfig) -> Result<Self, TranslateError> {
        if config.api_key.trim().is_empty() {
            return Err(TranslateError::Uninitialized("API key is empty".into()));
        }
        if config.model.trim().is_empty() {
            return Err(TranslateError::Uninitialized("model identifier is empty".into()));
        }

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslateError::Uninitialized(e.to_string()))?;

        info!(base_url = %config.base_url, model = %config.model, "Z.AI client initialized");

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionGateway for ZaiClient {
    async fn translate(&self, request: &CompletionRequest) -> Result<String, TranslateError> {
        let body = ChatRequest::from_request(&self.model, request);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslateError::Gateway("request to completion service timed out".into())
                } else {
                    TranslateError::Gateway(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TranslateError::Gateway(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = text.len(), "completion response");

        if !status.is_success() {
            return Err(TranslateError::Gateway(describe_failure(status, &text)));
        }
        extract_content(&text)
    }

    fn name(&self) -> &str {
        "zai"
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

impl<'a> ChatRequest<'a> {
    fn from_request(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_instruction,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            stream: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the first choice's text out of a successful response body.
fn extract_content(body: &str) -> Result<String, TranslateError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| TranslateError::Gateway(format!("malformed completion response: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| TranslateError::Gateway("completion response had no content".into()))
}

/// One-line cause for a non-2xx response, clipped to 200 characters.
fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    let detail = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => err.error.message,
        Err(_) => body.to_string(),
    };
    let detail = detail.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "status {}: {}",
        status.as_u16(),
        detail.chars().take(200).collect::<String>()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompletionConfig {
        CompletionConfig {
            api_key: "secret".into(),
            base_url: "https://api.z.ai/api/paas/v4/".into(),
            model: "glm-4.5-flash".into(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"id":"1","choices":[{"index":0,"message":{"role":"assistant","content":"Xin chào thế giới"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Xin chào thế giới");
    }

    #[test]
    fn empty_choices_is_a_gateway_error() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(TranslateError::Gateway(_))
        ));
        assert!(matches!(
            extract_content(r#"{"choices":[{"message":{"content":null}}]}"#),
            Err(TranslateError::Gateway(_))
        ));
        assert!(matches!(
            extract_content("not json"),
            Err(TranslateError::Gateway(_))
        ));
    }

    #[test]
    fn failure_prefers_service_message() {
        let status = reqwest::StatusCode::UNAUTHORIZED;
        assert_eq!(
            describe_failure(status, r#"{"error":{"code":"1000","message":"invalid api key"}}"#),
            "status 401: invalid api key"
        );
        assert_eq!(describe_failure(status, "denied"), "status 401: denied");
    }

    #[test]
    fn html_error_page_becomes_one_line() {
        let body = "<html>\r\n<head><title>502 Bad Gateway</title></head>\r\n<body>nginx</body>\r\n</html>";
        let cause = describe_failure(reqwest::StatusCode::BAD_GATEWAY, body);
        assert_eq!(
            cause,
            "status 502: <html> <head><title>502 Bad Gateway</title></head> <body>nginx</body> </html>"
        );

        let reply = crate::format::format_failure(&TranslateError::Gateway(cause));
        assert!(!reply.contains('\n'));
        assert!(!reply.contains('\r'));
    }

    #[test]
    fn long_bodies_are_clipped() {
        let body = "x".repeat(500);
        let cause = describe_failure(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(cause, format!("status 500: {}", "x".repeat(200)));
    }

    #[test]
    fn request_body_carries_roles_in_order() {
        let request = CompletionRequest {
            system_instruction: "sys".into(),
            user_instruction: "user".into(),
            temperature: 0.3,
            max_output_tokens: 4000,
        };
        let body = serde_json::to_value(ChatRequest::from_request("glm-4.5-flash", &request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "glm-4.5-flash",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "user"}
                ],
                "temperature": 0.3,
                "max_tokens": 4000,
                "stream": false
            })
        );
    }

    #[test]
    fn construction_validates_config() {
        let client = ZaiClient::new(&config()).unwrap();
        assert_eq!(client.endpoint(), "https://api.z.ai/api/paas/v4/chat/completions");

        let mut missing_key = config();
        missing_key.api_key = " ".into();
        assert!(matches!(
            ZaiClient::new(&missing_key),
            Err(TranslateError::Uninitialized(_))
        ));
    }
}
