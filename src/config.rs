//! Configuration for the OpenAI client, fallback and retry behavior

use serde::{Deserialize, Serialize};

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig
{   /// API base URL (if custom, e.g. a proxy)
    pub api_base: Option<String>
  , /// Request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl Default for ClientConfig
{   fn default() -> Self
    {   ClientConfig
        {   api_base: None
          , timeout_secs: None
        }
    }
}

/// Model fallback configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig
{   /// Attempts per model before falling back
    pub attempts_per_model: usize
  , /// Max fallback hops; must exceed the chain length
    pub max_fallback_hops: usize
}

impl Default for FallbackConfig
{   fn default() -> Self
    {   FallbackConfig
        {   attempts_per_model: 3
          , max_fallback_hops: 10
        }
    }
}

/// Outer retry configuration, wrapping whole generation calls
/// with exponential backoff. Disabled unless explicitly enabled
/// at construction; never read from the environment per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Enable the outer retry wrapper
    pub enabled: bool
  , /// Max attempts for the whole generation call
    pub max_attempts: usize
  , /// Backoff multiplier in seconds
    pub multiplier: f32
  , /// Lower bound on backoff duration in milliseconds
    pub min_backoff_ms: u64
  , /// Upper bound on backoff duration in milliseconds
    pub max_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   enabled: false
          , max_attempts: 10
          , multiplier: 1.0
          , min_backoff_ms: 4000
          , max_backoff_ms: 10000
        }
    }
}

impl RetryConfig
{   /// Resolve the enabled flag from `CHATGEN_ENABLE_RETRIES`
    /// once, at construction time. Deployments that want the
    /// env gate call this explicitly; nothing reads the
    /// environment afterwards.
    pub fn from_env() -> Self
    {   let enabled
          = std::env::var("CHATGEN_ENABLE_RETRIES")
              .map(|v| v == "true" || v == "True" || v == "1")
              .unwrap_or(false);
        RetryConfig
        {   enabled
          , ..RetryConfig::default()
        }
    }
}

/// Full chatgen configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatGenConfig
{   /// HTTP client configuration
    pub client: ClientConfig
  , /// Model fallback configuration
    pub fallback: FallbackConfig
  , /// Outer retry configuration
    pub retry: RetryConfig
}
