//! rule-demo 配置

use rule_shared::config::ConfigLoader;
use rule_shared::observability::ObservabilityConfig;
use serde::Deserialize;

use crate::campaign::CampaignConfig;

pub const SERVICE_NAME: &str = "rule-demo";

#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
    pub service_name: String,
    pub environment: String,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub campaign: CampaignConfig,
}

impl DemoConfig {
    /// 按 CONFIG_DIR / RULES_ENV 分层加载
    pub fn load() -> Result<Self, config::ConfigError> {
        ConfigLoader::from_env().load(SERVICE_NAME)
    }

    /// 配置文件无法加载时的兜底配置，日志参数改从 RUST_LOG / JSON_LOGS 读取
    pub fn fallback() -> Self {
        Self {
            observability: ObservabilityConfig::from_env(SERVICE_NAME),
            ..Self::default()
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME.to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            campaign: CampaignConfig::default(),
        }
    }
}
