pub mod bridge;
pub mod cache;
pub mod manager;
pub mod message;
pub mod registry;

#[cfg(test)]
mod bridge_test;
