//! Vocalis - TTS + RVC 语音生成服务
//!
//! 启动顺序: 配置 → 日志 → 设备探测 → 引擎初始化 → 管线 → HTTP

use std::sync::Arc;

use vocalis::application::{
    AudioCodecPort, ConversionStage, ModelDirs, ModelRegistryPort, PipelineOrchestrator,
    SpeechEnginePort, SynthesisStage, VoiceModelLoaderPort,
};
use vocalis::config::{load_config, print_config, AppConfig, EngineMode};
use vocalis::infrastructure::adapters::{
    FakeSpeechEngine, FakeVoiceModelLoader, HttpSpeechEngine, HttpSpeechEngineConfig,
    HttpVoiceConverterConfig, HttpVoiceModelLoader, WavCodec,
};
use vocalis::infrastructure::http::{AppState, HttpServer};
use vocalis::infrastructure::memory::InMemoryModelRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Vocalis - TTS + RVC 语音生成服务");
    print_config(&config);

    let artifact_dir = config.storage.artifact_dir();
    tokio::fs::create_dir_all(&artifact_dir).await?;

    let codec: Arc<dyn AudioCodecPort> = Arc::new(WavCodec::new());

    let speech_engine = build_speech_engine(&config, codec.clone()).await;
    let model_loader = build_model_loader(&config)?;

    // 设备只在启动时解析一次
    let registry = Arc::new(InMemoryModelRegistry::new(
        model_loader,
        config.rvc.device.resolve(),
    ));
    tracing::info!(device = %registry.device(), "Compute device selected");

    let synthesis = SynthesisStage::new(speech_engine, codec.clone(), artifact_dir.clone());
    let conversion = ConversionStage::new(
        registry.clone(),
        codec.clone(),
        ModelDirs {
            model_dir: config.rvc.model_dir.clone(),
            index_dir: config.rvc.index_dir.clone(),
        },
        artifact_dir,
    );
    let orchestrator = Arc::new(PipelineOrchestrator::new(synthesis, conversion));

    let state = AppState::new(
        orchestrator,
        registry as Arc<dyn ModelRegistryPort>,
        codec,
    );
    let server = HttpServer::new(&config.server, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志，`RUST_LOG` 优先于配置
fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},vocalis={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// TTS 引擎初始化失败不阻止启动，合成请求返回“引擎不可用”
async fn build_speech_engine(
    config: &AppConfig,
    codec: Arc<dyn AudioCodecPort>,
) -> Option<Arc<dyn SpeechEnginePort>> {
    match config.tts.mode {
        EngineMode::Fake => {
            tracing::info!("Using fake TTS engine");
            Some(Arc::new(FakeSpeechEngine::default()))
        }
        EngineMode::Http => {
            let engine_config = HttpSpeechEngineConfig::new(&config.tts.url)
                .with_timeout(config.tts.timeout_secs)
                .with_assets(config.tts.model_path.clone(), config.tts.voices_path.clone());
            HttpSpeechEngine::initialize(engine_config, codec)
                .await
                .map(|engine| Arc::new(engine) as Arc<dyn SpeechEnginePort>)
        }
    }
}

fn build_model_loader(config: &AppConfig) -> anyhow::Result<Arc<dyn VoiceModelLoaderPort>> {
    match config.rvc.mode {
        EngineMode::Fake => {
            tracing::info!("Using fake RVC engine");
            Ok(Arc::new(FakeVoiceModelLoader::new()))
        }
        EngineMode::Http => {
            let loader_config = HttpVoiceConverterConfig::new(&config.rvc.url)
                .with_timeout(config.rvc.timeout_secs);
            Ok(Arc::new(HttpVoiceModelLoader::new(loader_config)?))
        }
    }
}
