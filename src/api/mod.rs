pub mod client;

pub use client::{FetchClient, FetchedDocument};
