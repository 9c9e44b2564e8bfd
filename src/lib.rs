pub mod config;
pub mod dns;
pub mod error;
pub mod ip;
pub mod secrets;
pub mod state;
pub mod updater;

pub use error::UpdateError;
