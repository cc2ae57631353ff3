pub mod client;

pub use client::GooglePlacesSource;
