use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

use crate::providers::ChatApi;

const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";

// ===== Wire Types =====

/// Response format directive, e.g. {"type": "json_object"}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat
{   #[serde(rename = "type")]
    pub format_type: String
}

impl ResponseFormat
{   /// JSON-object output mode
    pub fn json_object() -> Self
    {   ResponseFormat
        {   format_type: "json_object".to_string()
        }
    }
}

/// Outgoing chat-completion request. Every optional field
/// is skipped when unset so the API never sees a null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatRequest
{   pub model: String
  , pub messages: Vec<crate::request::ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<serde_json::Value>>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<serde_json::Value>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>
}

/// A function call returned by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall
{   pub name: String
  , /// Arguments as a JSON-encoded string
    pub arguments: String
}

/// Message in a response choice; content is absent when the
/// model replied with a function call instead of text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMessage
{   pub role: String
  , #[serde(default)]
    pub content: Option<String>
  , #[serde(default)]
    pub function_call: Option<FunctionCall>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiChatResponse
{   pub choices: Vec<Choice>
}

// ===== OpenAI Client =====

/// HTTP client for the OpenAI chat-completion endpoint
pub struct OpenAiClient
{   api_key: Option<String>
  , api_base: String
  , http_client: reqwest::Client
}

impl OpenAiClient
{   /// Create a client with the default API base
    pub fn new(api_key: Option<String>) -> Self
    {   debug!("Creating OpenAiClient");
        OpenAiClient
        {   api_key
          , api_base: OPENAI_API_BASE.to_string()
          , http_client: reqwest::Client::new()
        }
    }

    /// Create a client from configuration
    pub fn with_config(
      api_key: Option<String>
    , config: &crate::config::ClientConfig
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating OpenAiClient from config");
        let api_base = config.api_base
          .clone()
          .unwrap_or_else(|| OPENAI_API_BASE.to_string());

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(
              std::time::Duration::from_secs(secs)
            );
        }
        let http_client = builder.build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(
              e.to_string()
            )
          })?;

        Ok(OpenAiClient
        {   api_key
          , api_base
          , http_client
        })
    }

    fn get_api_key(&self)
      -> Result<String, crate::error::Error>
    {   if let Some(key) = &self.api_key
        {   return Ok(key.clone());
        }

        error!("No OpenAI API key configured");
        Err(crate::error::Error::MissingApiKey)
    }
}

#[async_trait]
impl ChatApi for OpenAiClient
{   async fn chat(
      &self
    , request: &OpenAiChatRequest
    ) -> Result<OpenAiChatResponse, crate::error::Error>
    {   debug!("Sending chat request for: {}", request.model);

        let api_key = self.get_api_key()?;

        trace!("OpenAI request: {:?}", request);

        let response = self.http_client
          .post(format!(
            "{}/chat/completions", self.api_base
          ))
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(request)
          .send()
          .await
          .map_err(|e| {
            if e.is_timeout()
            {   error!("Request timed out: {}", e);
                crate::error::Error::Timeout
            } else
            {   error!("HTTP error: {}", e);
                crate::error::Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {   error!("OpenAI rate limit hit");
            return Err(
              crate::error::Error::RateLimitExceeded
            );
        }

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("OpenAI API error: {}", error_text);
            return Err(crate::error::Error::ApiError(
              format!("OpenAI error: {}", error_text)
            ));
        }

        let chat_response: OpenAiChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        Ok(chat_response)
    }
}
