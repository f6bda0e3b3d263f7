pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod lint;
pub mod markdown;
pub mod paths;
pub mod story;
pub mod template;
pub mod types;

pub use error::{Result, StoryError};
