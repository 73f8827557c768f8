//! Domain Layer - 领域层
//!
//! Speech Context: 语音生成相关的值对象与内置目录

pub mod speech;
