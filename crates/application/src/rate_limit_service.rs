//! Request throttling ports and application service.
//!
//! Implements a fixed-window counter per `"{category}:{identifier}"` key.
//! Routes share a window when they share a rule category (a throttle scope).

mod config;
mod ports;
mod service;

pub use config::RateLimitRule;
pub use ports::{AttemptInfo, RateLimitRepository};
pub use service::RateLimitService;
