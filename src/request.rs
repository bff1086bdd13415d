//! Unified generation request and result types

use serde::{Deserialize, Serialize};

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   /// Message role: "system", "user" or "assistant"
    pub role: String
  , /// Message text
    pub content: String
}

impl ChatMessage
{   /// Build a system message
    pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    /// Build a user message
    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }

    /// Build an assistant message
    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "assistant".to_string()
          , content: content.into()
        }
    }
}

/// Parameters for a single generation call.
/// Unset optional fields are omitted from the outgoing
/// request, never sent as null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams
{   /// Prompt appended as the final user turn
    pub prompt: Option<String>
  , /// System message prepended as the first element
    pub system_message: Option<String>
  , /// Prior conversation, in order
    pub existing_messages: Vec<ChatMessage>
  , /// Model identifier
    pub model: String
  , /// Function schemas for structured-call mode
    pub functions: Option<Vec<serde_json::Value>>
  , /// Function call directive (e.g. {"name": "..."})
    pub function_call: Option<serde_json::Value>
  , /// Sampling temperature
    pub temperature: Option<f32>
  , /// Max tokens to generate
    pub max_tokens: Option<usize>
  , /// Nucleus sampling parameter
    pub top_p: Option<f32>
  , /// Frequency penalty
    pub frequency_penalty: Option<f32>
  , /// Presence penalty
    pub presence_penalty: Option<f32>
  , /// Stop sequences
    pub stop: Option<Vec<String>>
  , /// Ask the model for a JSON object and parse the reply
    pub json_output: bool
}

impl Default for GenerationParams
{   fn default() -> Self
    {   GenerationParams
        {   prompt: None
          , system_message: None
          , existing_messages: vec![]
          , model: "gpt-3.5-turbo".to_string()
          , functions: None
          , function_call: None
          , temperature: None
          , max_tokens: None
          , top_p: None
          , frequency_penalty: None
          , presence_penalty: None
          , stop: None
          , json_output: false
        }
    }
}

/// Result of a generation call; exactly one shape is
/// produced per call. Absence (no content) is modeled as
/// `Ok(None)` at the facade, not as a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult
{   /// Free-form text reply
    Text(String)
  , /// Parsed JSON reply (json_output mode)
    Json(serde_json::Value)
  , /// Parsed function-call arguments (structured-call mode)
    Args(serde_json::Value)
}
