#![deny(unused_must_use)]
pub mod actions;
pub mod client_message;
pub mod config;
pub mod errors;
pub mod event;
pub mod game;
pub mod log;
pub mod player;
pub mod schema;

#[cfg(test)]
mod tests;
