//! 应用层 - 命令
//!
//! 管线的三类生成请求

mod generate_commands;

pub use generate_commands::*;
