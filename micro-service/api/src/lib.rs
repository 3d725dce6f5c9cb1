pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod state;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use routes::create_routes;
pub use state::AppState;
