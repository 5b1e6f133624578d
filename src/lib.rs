#[cfg(feature = "app")]
pub mod app;
#[cfg(feature = "config")]
pub mod config;
pub mod credentials;
#[cfg(feature = "server")]
pub mod server;
