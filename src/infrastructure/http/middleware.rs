//! HTTP Middleware
//!
//! 音频生成请求日志中间件

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// 音频生成请求日志中间件
///
/// audio/wav 响应记录采样率、采样数、音频时长和处理耗时
/// HTTP 4xx/5xx 另行记录；业务错误（errno != 0）走 200，在 ApiError::into_response() 中记录
pub async fn audio_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if is_wav(response.headers()) {
        tracing::info!(
            method = %method,
            uri = %uri,
            sample_rate = header_u64(response.headers(), "x-sample-rate").unwrap_or(0),
            samples = header_u64(response.headers(), "x-sample-count").unwrap_or(0),
            audio_ms = audio_duration_ms(response.headers()).unwrap_or(0),
            elapsed_ms,
            "Audio generated"
        );
    }

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %status.as_u16(),
            "HTTP client error"
        );
    }

    response
}

fn is_wav(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("audio/wav"))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

/// 由 X-Sample-Rate / X-Sample-Count 计算音频时长（毫秒）
fn audio_duration_ms(headers: &HeaderMap) -> Option<u64> {
    let rate = header_u64(headers, "x-sample-rate").filter(|&r| r > 0)?;
    let samples = header_u64(headers, "x-sample-count")?;
    Some(samples.saturating_mul(1000) / rate)
}
