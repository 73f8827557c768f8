//! Temporary Artifact - 单次推理调用的临时音频文件
//!
//! 不变量:
//! - 文件名按调用唯一生成，并发请求不会冲突
//! - 句柄被 drop 时删除文件；删除失败只记录日志

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// 临时产物
///
/// 所有权转移给下游阶段即表示删除责任一并转移
#[derive(Debug)]
pub struct TempArtifact {
    path: Option<TempPath>,
}

impl TempArtifact {
    /// 在 `dir` 下创建一个空的 `.wav` 文件
    pub fn create(dir: &Path, prefix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".wav")
            .tempfile_in(dir)?;
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), "Temporary artifact created");
        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.path().to_path_buf()
    }

    /// 立即删除
    pub fn remove(mut self) {
        self.cleanup();
    }

    fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => tracing::debug!(path = %shown, "Temporary artifact removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %shown,
                error = %e,
                "Failed to remove temporary artifact"
            ),
        }
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        self.cleanup();
    }
}
