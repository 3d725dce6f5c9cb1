pub mod client;
pub mod service;

pub use client::{CompletionClient, GroqClient};
pub use service::CompletionService;

pub const SYSTEM_PROMPT: &str = "You are a helpful medical AI assistant. Provide educational health information only. Never diagnose. Always recommend consulting healthcare professionals for medical concerns.";
pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 1024;
