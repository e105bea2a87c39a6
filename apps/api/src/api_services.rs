mod database;
mod rate_limit_cleanup;
mod redis;
mod state_builder;

pub use database::connect_and_migrate;
pub use rate_limit_cleanup::spawn_rate_limit_cleanup;
pub use state_builder::build_app_state;
