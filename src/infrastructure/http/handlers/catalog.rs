//! Catalog Handlers - 音色、语言与模型缓存查询

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::domain::speech::{locale_name, voice_language, LOCALES, VOICES};
use crate::infrastructure::http::dto::{
    ApiResponse, CachedModelResponse, LocaleResponse, VoiceResponse,
};
use crate::infrastructure::http::state::AppState;

/// 内置音色列表
pub async fn list_voices() -> Json<ApiResponse<Vec<VoiceResponse>>> {
    let voices = VOICES
        .iter()
        .map(|&id| {
            let lang = voice_language(id);
            VoiceResponse {
                id,
                lang,
                lang_name: lang.and_then(locale_name),
            }
        })
        .collect();
    Json(ApiResponse::success(voices))
}

/// 支持的语言
pub async fn list_locales() -> Json<ApiResponse<Vec<LocaleResponse>>> {
    let locales = LOCALES
        .iter()
        .map(|&(code, name)| LocaleResponse { code, name })
        .collect();
    Json(ApiResponse::success(locales))
}

/// 已加载的 RVC 模型
pub async fn list_cached_models(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<CachedModelResponse>>> {
    let mut models: Vec<CachedModelResponse> = state
        .registry
        .cached_keys()
        .into_iter()
        .map(|key| CachedModelResponse {
            model: key.model_path().display().to_string(),
            index: key.index_path().map(|p| p.display().to_string()),
        })
        .collect();
    models.sort_by(|a, b| a.model.cmp(&b.model).then_with(|| a.index.cmp(&b.index)));
    Json(ApiResponse::success(models))
}
