pub mod anthropic;

pub use anthropic::AnthropicModel;
