pub mod auth;
pub mod authors;
pub mod blogs;
pub mod demo;
pub mod health;
