pub mod config;
pub mod content;
pub mod handlers;
pub mod paths;
pub mod services;
pub mod state;
pub mod store;

#[cfg(test)]
pub mod testing;
