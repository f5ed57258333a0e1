pub mod cache;
pub mod client;

pub use cache::{QueryCache, Subscription};
pub use client::QueryClient;
