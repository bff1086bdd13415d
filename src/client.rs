use std::sync::Arc;
use log::{debug, trace, error, info};

use crate::config::ChatGenConfig;
use crate::error::Error;
use crate::failover::{FallbackChain, FailoverExecutor, RetryPolicy};
use crate::providers::ChatApi;
use crate::providers::openai::{
  OpenAiChatRequest, OpenAiChatResponse, ResponseFormat
};
use crate::request::{ChatMessage, GenerationParams, GenerationResult};

/// Generation facade: assembles the conversation, runs the
/// resilient executor and normalizes the response into one
/// of the three result shapes. `Ok(None)` means no content
/// could be produced and is an expected outcome, distinct
/// from a hard failure.
pub struct GenerationClient
{   api: Arc<dyn ChatApi>
  , chain: FallbackChain
  , config: ChatGenConfig
}

impl GenerationClient
{   /// Create a client against the real OpenAI API with
    /// default configuration and the default fallback chain
    pub fn new(api_key: Option<String>) -> Self
    {   debug!("Creating GenerationClient");
        GenerationClient
        {   api: Arc::new(
              crate::providers::OpenAiClient::new(api_key)
            )
          , chain: FallbackChain::default_openai()
          , config: ChatGenConfig::default()
        }
    }

    /// Create a client against the real OpenAI API from
    /// explicit configuration
    pub fn with_config(
      api_key: Option<String>
    , config: ChatGenConfig
    ) -> Result<Self, Error>
    {   debug!("Creating GenerationClient from config");
        let api = crate::providers::OpenAiClient::with_config(
          api_key,
          &config.client
        )?;
        Ok(GenerationClient
        {   api: Arc::new(api)
          , chain: FallbackChain::default_openai()
          , config
        })
    }

    /// Create a client over an injected remote call, e.g. a
    /// test double
    pub fn with_api(
      api: Arc<dyn ChatApi>
    , config: ChatGenConfig
    , chain: FallbackChain
    ) -> Self
    {   debug!("Creating GenerationClient with injected api");
        GenerationClient
        {   api
          , chain
          , config
        }
    }

    /// Run one generation call. When the outer retry is
    /// enabled the whole call (fallback walk included) is
    /// retried with exponential backoff.
    pub async fn generate(
      &self
    , params: GenerationParams
    ) -> Result<Option<GenerationResult>, Error>
    {   debug!("generate called for model: {}", params.model);

        let messages = assemble_messages(&params);
        if messages.is_empty()
        {   debug!(
              "No prompt, history or system message; nothing to send"
            );
            return Ok(None);
        }

        let structured = params.functions.is_some();
        let json_output = params.json_output;
        let request = build_wire_request(params, messages);

        if !self.config.retry.enabled
        {   return self
              .generate_once(&request, structured, json_output)
              .await;
        }

        let policy = RetryPolicy::from_config(
          &self.config.retry
        );
        let mut last_error = Error::Other(
          "Retry loop made no attempts".to_string()
        );
        for attempt in 0..policy.max_attempts
        {   if attempt > 0
            {   let delay
                  = policy.backoff_for_attempt(attempt - 1);
                info!(
                  "Retrying generation (attempt {}) after {:?}",
                  attempt, delay
                );
                tokio::time::sleep(delay).await;
            }
            match self
              .generate_once(&request, structured, json_output)
              .await
            {   Ok(result) => return Ok(result)
              , Err(e) => {
                  error!(
                    "Generation attempt {} failed: {}",
                    attempt, e
                  );
                  last_error = e;
                }
            }
        }
        Err(last_error)
    }

    async fn generate_once(
      &self
    , request: &OpenAiChatRequest
    , structured: bool
    , json_output: bool
    ) -> Result<Option<GenerationResult>, Error>
    {   let executor = FailoverExecutor::new(
          self.api.as_ref(),
          &self.chain,
          &self.config.fallback
        );

        // The executor rewrites the model field as it walks
        // the chain, so it gets its own copy.
        let mut wire_request = request.clone();
        let response
          = executor.execute(&mut wire_request).await?;

        if structured
        {   normalize_structured(&response)
        } else
        {   normalize_text(&response, json_output)
        }
    }
}

/// Assemble the conversation: history first, system message
/// prepended, prompt appended as the final user turn
fn assemble_messages(
  params: &GenerationParams
) -> Vec<ChatMessage>
{   let mut messages = params.existing_messages.clone();

    if let Some(system_message) = &params.system_message
    {   messages.insert(
          0,
          ChatMessage::system(system_message.clone())
        );
    }

    if let Some(prompt) = &params.prompt
    {   messages.push(ChatMessage::user(prompt.clone()));
    }

    messages
}

/// Build the outgoing wire request, carrying over only the
/// parameters the caller actually set
fn build_wire_request(
  params: GenerationParams
, messages: Vec<ChatMessage>
) -> OpenAiChatRequest
{   let response_format = if params.json_output
    {   Some(ResponseFormat::json_object())
    } else
    {   None
    };

    OpenAiChatRequest
    {   model: params.model
      , messages
      , functions: params.functions
      , function_call: params.function_call
      , temperature: params.temperature
      , max_tokens: params.max_tokens
      , top_p: params.top_p
      , frequency_penalty: params.frequency_penalty
      , presence_penalty: params.presence_penalty
      , stop: params.stop
      , response_format
    }
}

/// Structured-call mode: parse the function-call arguments.
/// A malformed or missing payload downgrades to absence.
fn normalize_structured(
  response: &OpenAiChatResponse
) -> Result<Option<GenerationResult>, Error>
{   let choice = response.choices.first()
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse
      })?;

    let function_call
      = match &choice.message.function_call
        {   Some(fc) => fc
          , None => {
              error!(
                "Response has no function call payload"
              );
              return Ok(None);
            }
        };

    trace!(
      "Function call arguments: {}",
      function_call.arguments
    );

    match serde_json::from_str(&function_call.arguments)
    {   Ok(args) => Ok(Some(GenerationResult::Args(args)))
      , Err(e) => {
          error!(
            "Error parsing function arguments as JSON: {}",
            e
          );
          Ok(None)
        }
    }
}

/// Free-form mode: return the text, or parse it as JSON when
/// json_output was requested. Parse failure discards the
/// text and downgrades to absence.
fn normalize_text(
  response: &OpenAiChatResponse
, json_output: bool
) -> Result<Option<GenerationResult>, Error>
{   let choice = response.choices.first()
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse
      })?;

    let text = match &choice.message.content
    {   Some(text) => text
      , None => {
          error!("Response choice has no text content");
          return Ok(None);
        }
    };

    if json_output
    {   match serde_json::from_str(text)
        {   Ok(value) => {
              Ok(Some(GenerationResult::Json(value)))
            }
          , Err(e) => {
              error!(
                "Error parsing model output as JSON: {}; output was: {}",
                e, text
              );
              Ok(None)
            }
        }
    } else
    {   Ok(Some(GenerationResult::Text(text.clone())))
    }
}
