//! Memory Layer - In-Memory State Management
//!
//! 进程内的模型缓存

mod model_registry;

pub use model_registry::InMemoryModelRegistry;
