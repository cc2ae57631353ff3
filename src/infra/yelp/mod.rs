pub mod client;

pub use client::YelpSource;
