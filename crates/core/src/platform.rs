use crate::config::AppConfig;
use anyhow::bail;
use providers::chrome::ChromeFilePlatform;
use providers::memory::MemoryPlatform;
use providers::BookmarkPlatform;
use std::sync::Arc;
use tracing::info;

pub fn build_platform(config: &AppConfig) -> anyhow::Result<Arc<dyn BookmarkPlatform>> {
    match config.platform.provider.as_str() {
        "memory" => {
            info!("using in-memory bookmark tree");
            Ok(Arc::new(MemoryPlatform::default()))
        }
        "chrome" => {
            let Some(path) = &config.platform.path else {
                bail!("platform.path is required for the chrome provider");
            };
            info!(path = %path, "using chromium bookmarks file");
            Ok(Arc::new(ChromeFilePlatform::new(path)))
        }
        other => bail!("unknown platform provider: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_needs_a_path() {
        let mut cfg = AppConfig::default();
        cfg.platform.provider = "chrome".into();
        assert!(build_platform(&cfg).is_err());
        cfg.platform.path = Some("/tmp/Bookmarks".into());
        assert!(build_platform(&cfg).is_ok());
        cfg.platform.provider = "firefox".into();
        assert!(build_platform(&cfg).is_err());
    }
}
