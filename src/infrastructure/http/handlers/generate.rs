//! Generate Handlers - TTS / RVC / TTS+RVC
//!
//! 成功时直接返回 audio/wav，失败时返回统一 JSON 错误

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::application::{
    AudioSource, ConversionRequest, ConversionTarget, GenerateCommand, PipelineError,
    SynthesisRequest,
};
use crate::domain::speech::{voice_language, AudioBuffer};
use crate::infrastructure::http::dto::{SynthesizeBody, SynthesizeConvertBody};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

const X_SAMPLE_RATE: HeaderName = HeaderName::from_static("x-sample-rate");
const X_SAMPLE_COUNT: HeaderName = HeaderName::from_static("x-sample-count");

/// 文本转语音
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SynthesizeBody>,
) -> Result<Response, ApiError> {
    let request = synthesis_request(body)?;
    let audio = state
        .orchestrator
        .run(GenerateCommand::SynthesizeOnly(request))
        .await?;
    wav_response(&state, &audio)
}

/// 合成后转换
pub async fn synthesize_convert(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SynthesizeConvertBody>,
) -> Result<Response, ApiError> {
    let target = ConversionTarget::new(body.model, body.index, body.pitch)?;
    let synthesis = synthesis_request(body.synthesis)?;
    let audio = state
        .orchestrator
        .run(GenerateCommand::SynthesizeThenConvert { synthesis, target })
        .await?;
    wav_response(&state, &audio)
}

/// 音色转换（上传 WAV）
///
/// multipart 字段: file, model, index（可选）, pitch（可选，默认 0）
pub async fn convert(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut audio_data: Option<Vec<u8>> = None;
    let mut model: Option<String> = None;
    let mut index: Option<String> = None;
    let mut pitch: i32 = 0;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "file" => {
                audio_data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            "model" => model = Some(read_text(field).await?),
            "index" => index = Some(read_text(field).await?),
            "pitch" => {
                let raw = read_text(field).await?;
                pitch = raw
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("Invalid pitch: {}", raw)))?;
            }
            _ => {}
        }
    }

    let audio_data =
        audio_data.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;
    let source = state
        .codec
        .decode_wav(&audio_data)
        .map_err(|e| PipelineError::InvalidSourceAudio(e.to_string()))?;

    let request = ConversionRequest {
        source: AudioSource::Samples(source),
        target: ConversionTarget::new(model, index, pitch)?,
    };
    let audio = state
        .orchestrator
        .run(GenerateCommand::ConvertOnly(request))
        .await?;
    wav_response(&state, &audio)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))
}

fn synthesis_request(body: SynthesizeBody) -> Result<SynthesisRequest, ApiError> {
    let lang = body
        .lang
        .or_else(|| voice_language(&body.voice).map(String::from))
        .unwrap_or_else(|| "en-us".to_string());
    Ok(SynthesisRequest::new(body.text, &body.voice, body.speed, &lang)?)
}

fn wav_response(state: &AppState, audio: &AudioBuffer) -> Result<Response, ApiError> {
    let wav = state
        .codec
        .encode_wav(audio)
        .map_err(|e| ApiError::Internal(format!("Failed to encode audio: {}", e)))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "audio/wav".to_string()),
            (X_SAMPLE_RATE, audio.sample_rate().to_string()),
            (X_SAMPLE_COUNT, audio.len().to_string()),
        ],
        wav,
    )
        .into_response())
}
