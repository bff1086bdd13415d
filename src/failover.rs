//! Model fallback and retry logic

use std::time::Duration;
use log::{debug, info, error};

/// Outer retry policy for whole generation calls
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_attempts: usize
  , pub multiplier: f32
  , pub min_backoff: Duration
  , pub max_backoff: Duration
}

impl RetryPolicy
{   /// Create a policy from configuration
    pub fn from_config(
      config: &crate::config::RetryConfig
    ) -> Self
    {   RetryPolicy
        {   max_attempts: config.max_attempts
          , multiplier: config.multiplier
          , min_backoff: Duration::from_millis(
              config.min_backoff_ms
            )
          , max_backoff: Duration::from_millis(
              config.max_backoff_ms
            )
        }
    }

    /// Exponential backoff for attempt number, clamped to
    /// the [min_backoff, max_backoff] bounds
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   debug!("Calculating backoff for attempt {}", attempt);
        let exp_ms = self.multiplier as f64
          * 2f64.powi(attempt as i32)
          * 1000.0;
        let clamped_ms = exp_ms
          .max(self.min_backoff.as_millis() as f64)
          .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(clamped_ms as u64)
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::from_config(
          &crate::config::RetryConfig::default()
        )
    }
}

/// Static model fallback chain: an ordered, acyclic mapping
/// from a model to its next cheaper/older substitute. Built
/// once, never mutated.
#[derive(Debug, Clone)]
pub struct FallbackChain
{   links: Vec<(String, String)>
}

impl FallbackChain
{   /// Create a chain from explicit (model, substitute) links
    pub fn new(links: Vec<(String, String)>) -> Self
    {   debug!(
          "Creating fallback chain with {} links",
          links.len()
        );
        FallbackChain
        {   links
        }
    }

    /// The default OpenAI chain, newest and priciest first
    pub fn default_openai() -> Self
    {   FallbackChain::new(vec![
          ( "gpt-4-1106-preview".to_string()
          , "gpt-4".to_string()
          )
        , ( "gpt-4".to_string()
          , "gpt-3.5-turbo-16k-0613".to_string()
          )
        , ( "gpt-3.5-turbo-16k-0613".to_string()
          , "gpt-3.5-turbo".to_string()
          )
        ])
    }

    /// Next substitute for a model; None when the chain is
    /// exhausted or the model is unknown
    pub fn next(&self, model: &str) -> Option<&str>
    {   self.links
          .iter()
          .find(|(from, _)| from == model)
          .map(|(_, to)| to.as_str())
    }

    /// Number of links in the chain
    pub fn len(&self) -> usize
    {   self.links.len()
    }

    /// Whether the chain has no links at all
    pub fn is_empty(&self) -> bool
    {   self.links.is_empty()
    }
}

impl Default for FallbackChain
{   fn default() -> Self
    {   FallbackChain::default_openai()
    }
}

/// Resilient call executor: retries the remote call a bounded
/// number of times per model, then walks the fallback chain.
/// Fails only once the chain is exhausted without a success.
pub struct FailoverExecutor<'a>
{   api: &'a dyn crate::providers::ChatApi
  , chain: &'a FallbackChain
  , config: &'a crate::config::FallbackConfig
}

impl<'a> FailoverExecutor<'a>
{   /// Create an executor over an injected remote call
    pub fn new(
      api: &'a dyn crate::providers::ChatApi
    , chain: &'a FallbackChain
    , config: &'a crate::config::FallbackConfig
    ) -> Self
    {   FailoverExecutor
        {   api
          , chain
          , config
        }
    }

    /// Execute the request, mutating its model field as the
    /// chain is walked. The first successful response is
    /// returned immediately; no backoff between attempts.
    pub async fn execute(
      &self
    , request: &mut crate::providers::openai::OpenAiChatRequest
    ) -> Result<
        crate::providers::openai::OpenAiChatResponse,
        crate::error::Error
      >
    {   for _hop in 0..self.config.max_fallback_hops
        {   for attempt in 0..self.config.attempts_per_model
            {   match self.api.chat(request).await
                {   Ok(response) => {
                      debug!(
                        "Chat call succeeded for model {} on attempt {}",
                        request.model, attempt
                      );
                      return Ok(response);
                    }
                  , Err(e) => {
                      error!(
                        "Error calling chat with model {} on attempt {}: {}",
                        request.model, attempt, e
                      );
                      if !e.is_transient()
                      {   debug!(
                            "Error kind is not known-transient, retrying anyway"
                          );
                      }
                      continue;
                    }
                }
            }

            let prev_model = request.model.clone();
            match self.chain.next(&prev_model)
            {   Some(next_model) => {
                  info!(
                    "Falling back from {} to {} after {} failed attempts",
                    prev_model,
                    next_model,
                    self.config.attempts_per_model
                  );
                  request.model = next_model.to_string();
                }
              , None => {
                  error!(
                    "No fallback left after model: {}",
                    prev_model
                  );
                  return Err(
                    crate::error::Error::FallbackExhausted(
                      prev_model
                    )
                  );
                }
            }
        }

        // Hop bound hit before the chain ran dry; only
        // reachable when the bound is shorter than a custom
        // chain.
        error!(
          "Fallback hop bound {} reached at model: {}",
          self.config.max_fallback_hops,
          request.model
        );
        Err(crate::error::Error::FallbackExhausted(
          request.model.clone()
        ))
    }
}
