pub mod types;
pub mod traits;
pub mod config;
pub mod openai;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, TokenUsage};
pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use openai::{OpenAIClient, GROQ_API_BASE, OPENAI_API_BASE};
pub use types::{Message, Role};
