//! Data Transfer Objects

use serde::{Deserialize, Serialize};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Generate DTOs
// ============================================================================

fn default_voice() -> String {
    "ff_siwis".to_string()
}

fn default_speed() -> f32 {
    1.0
}

/// TTS 请求
#[derive(Debug, Deserialize)]
pub struct SynthesizeBody {
    pub text: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// 缺省时按音色推断
    #[serde(default)]
    pub lang: Option<String>,
}

/// TTS + RVC 请求
#[derive(Debug, Deserialize)]
pub struct SynthesizeConvertBody {
    #[serde(flatten)]
    pub synthesis: SynthesizeBody,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub pitch: i32,
}

// ============================================================================
// Catalog DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub id: &'static str,
    pub lang: Option<&'static str>,
    pub lang_name: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct LocaleResponse {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CachedModelResponse {
    pub model: String,
    pub index: Option<String>,
}
