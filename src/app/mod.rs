mod config;
mod password;
mod server;
mod types;

pub use config::config_output;
pub use password::{
    build_resolver, connect, create, forget, open, status, token_for, PasswordOptions,
};
pub use server::pause_server;
pub use types::{ForgetOutput, PasswordOutput, ServerActionOutput, StatusOutput};
