//! 共享库
//!
//! 包含各 crate 共用的配置加载与可观测性初始化代码。

pub mod config;
pub mod observability;
