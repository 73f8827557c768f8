//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查
//! - /api/catalog/voices    GET   内置音色列表
//! - /api/catalog/locales   GET   支持的语言
//! - /api/registry          GET   已缓存的 RVC 模型
//! - /api/tts               POST  文本转语音（JSON → audio/wav）
//! - /api/rvc               POST  音色转换（multipart → audio/wav）
//! - /api/tts-rvc           POST  合成后转换（JSON → audio/wav）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/catalog", catalog_routes())
        .route("/registry", get(handlers::list_cached_models))
        .route("/tts", post(handlers::synthesize))
        .route("/rvc", post(handlers::convert))
        .route("/tts-rvc", post(handlers::synthesize_convert))
}

fn catalog_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voices", get(handlers::list_voices))
        .route("/locales", get(handlers::list_locales))
}
