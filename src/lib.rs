pub mod api;
pub mod booking;
pub mod config;
pub mod fleet;
pub mod forms;
pub mod http;
pub mod job;
pub mod query;
pub mod render;
pub mod run;
pub mod status;
pub mod view;

#[cfg(test)]
mod testing;
