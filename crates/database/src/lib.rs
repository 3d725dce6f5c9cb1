pub mod service;

pub use service::{InMemoryUserStore, UserStore};
