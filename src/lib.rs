pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod failover;
pub mod client;

/*

chatgen is a thin async wrapper around the OpenAI
chat-completion API: it assembles a message list, issues the
request, retries a bounded number of times per model, and
degrades to cheaper/older models when the preferred one keeps
failing. One call in, one result (or an expected absence) out.

chatgen/
├── Cargo.toml          # Main manifest
├── src/
│   ├── lib.rs          # Re-exports and main documentation
│   ├── error.rs        # Custom error types and handling
│   ├── config.rs       # Client, fallback and retry config
│   ├── client.rs       # Generation facade
│   ├── providers/      # Remote chat-completion calls
│   │   ├── mod.rs      # ChatApi trait and re-exports
│   │   └── openai.rs   # OpenAI API client and wire types
│   ├── request.rs      # Unified request/result types
│   └── failover.rs     # Fallback chain, retry policy, executor
└── tests/              # Integration tests with a ChatApi double

*/

pub use client::GenerationClient;
pub use config::{
  ChatGenConfig, ClientConfig, FallbackConfig, RetryConfig
};
pub use error::Error;
pub use failover::{FallbackChain, FailoverExecutor, RetryPolicy};
pub use providers::ChatApi;
pub use request::{ChatMessage, GenerationParams, GenerationResult};
