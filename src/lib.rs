pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod lessons;
pub mod news;
pub mod seed;
pub mod state;

pub use error::AppError;
pub use state::AppState;
