//! Reel terminal player
//!
//! Line-oriented front end over `reel-playback`: reads commands from stdin, polls the
//! manager on a timer and prints the playlist to stdout.

pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod view;

pub use app::{App, Outcome};
pub use command::{Command, CommandError};
pub use config::AppConfig;
pub use error::{AppError, Result};
