pub mod api_middleware;
pub mod security;
pub mod validation;

pub use security::jwt::{Claims, JwtService, bearer_token};
pub use security::password::{hash_password, verify_password};
