use std::fmt;

/// Custom error type for chatgen operations
/// Implements Clone so results can be replayed in tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// API key is missing
    MissingApiKey
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// API rate limit exceeded
    RateLimitExceeded
  , /// Request timed out
    Timeout
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Every model in the fallback chain was exhausted;
    /// carries the last model tried
    FallbackExhausted(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether this error is a known-transient failure
    /// (network, rate limit, server side). The executor
    /// retries on every error kind; this classification
    /// lets callers and tests tell the kinds apart.
    pub fn is_transient(&self) -> bool
    {   matches!(
          self,
          Error::HttpError(_)
            | Error::ApiError(_)
            | Error::RateLimitExceeded
            | Error::Timeout
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingApiKey => {
              write!(f, "Missing OpenAI API key")
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit exceeded")
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::FallbackExhausted(model) => {
              write!(f,
                "Ran out of fallback models (last tried: {})",
                model
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
