pub mod config;
pub mod error;
pub mod predict;
pub mod server;
pub mod store;

pub use config::Config;
pub use error::ApiError;
pub use server::{router, AppState};
