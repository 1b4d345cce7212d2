//! 配置管理模块
//!
//! 支持分层 TOML 配置文件加载、环境变量覆盖，以及类型安全的配置访问。
//! 各服务自行定义配置结构体，本模块只负责按统一的顺序合并来源。

use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// 默认的环境变量前缀
pub const DEFAULT_ENV_PREFIX: &str = "RULES";

/// 分层配置加载器
///
/// 加载顺序（后加载的会覆盖先加载的同名配置项）：
/// 1. 结构体自身的 serde 默认值
/// 2. {config_dir}/default.toml（默认配置）
/// 3. {config_dir}/{environment}.toml（环境特定配置）
/// 4. {config_dir}/{service_name}.toml（服务特定配置）
/// 5. 环境变量（RULES_ 前缀，`__` 分隔层级，如 RULES_CAMPAIGN__MIN_PURCHASE -> campaign.min_purchase）
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: String,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new(config_dir: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: environment.into(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// 从进程环境确定配置目录与运行环境
    ///
    /// 会先读取当前目录下的 `.env`（若存在），再读取 CONFIG_DIR 与 RULES_ENV。
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let environment =
            std::env::var("RULES_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self::new(config_dir, environment)
    }

    /// 修改环境变量前缀
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// 加载并反序列化为服务自己的配置结构体
    ///
    /// `service_name` 与 `environment` 会作为同名顶层键的默认值写入，
    /// 配置结构体可以直接声明这两个字段。
    pub fn load<C: DeserializeOwned>(&self, service_name: &str) -> Result<C, ConfigError> {
        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", self.environment.as_str())?
            // 加载默认配置文件
            .add_source(File::from(self.config_dir.join("default.toml")).required(false))
            // 加载环境特定配置
            .add_source(
                File::from(self.config_dir.join(format!("{}.toml", self.environment)))
                    .required(false),
            )
            // 加载服务特定配置（如 rule-demo.toml）
            .add_source(
                File::from(self.config_dir.join(format!("{}.toml", service_name)))
                    .required(false),
            )
            // 环境变量覆盖
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new("config", "development")
    }
}
