//! Vocalis - TTS + RVC 语音生成服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Speech Context: 音色、语言、语速、音高、模型键、音频缓冲
//!
//! 应用层 (application/):
//! - Ports: SpeechEngine, VoiceModelLoader, AudioCodec, ModelRegistry
//! - Commands: 生成请求
//! - Pipeline: 合成阶段、转换阶段、编排器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Memory: 模型注册表
//! - Adapters: Kokoro / RVC 推理客户端、WAV 编解码

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
