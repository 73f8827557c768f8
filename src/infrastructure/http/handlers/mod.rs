//! HTTP Handlers

mod catalog;
mod generate;
mod ping;

pub use catalog::*;
pub use generate::*;
pub use ping::*;
