//! HTTP handlers

mod health;
mod whoami;

pub use health::health;
pub use whoami::whoami;
