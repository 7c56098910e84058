//! Inkboard application shell.
//!
//! Loads and saves boards, exports PNG frames through the raster renderer,
//! and exposes diagram generation and templates on the command line.

mod app;
mod cli;
pub mod diagram;
mod error;
mod shortcuts;

pub use app::{App, AppConfig};
pub use cli::{Cli, Command, run};
pub use error::{AppError, AppResult};
pub use shortcuts::{Binding, ShortcutRegistry};
