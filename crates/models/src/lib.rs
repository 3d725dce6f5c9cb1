pub mod chat;
pub mod service;
pub mod user;

pub use chat::{ChatRequest, ChatResponse};
pub use service::{HealthDescriptor, ServiceDescriptor};
pub use user::{LoginInput, RegisterInput, TokenResponse, UserProfile, UserRecord};
