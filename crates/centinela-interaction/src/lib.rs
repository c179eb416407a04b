//! HTTP access to the Centinela analysis service.

pub mod client;
mod wire;

pub use client::CentinelaApiClient;
