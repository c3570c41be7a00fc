pub mod banner;
pub mod environment;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod popup;
pub mod settings;
pub mod watcher;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{AppError, AppResult};
