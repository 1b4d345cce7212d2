//! 业务规则集
//!
//! 基于 `rule-engine` 的会员营销与访问控制规则。外部数据源（兑换记录、
//! 权限目录、通知渠道）通过 trait 注入，内存实现用于演示和测试。

pub mod access;
pub mod campaign;
pub mod config;
pub mod error;
pub mod lookup;
pub mod loyalty;
pub mod models;
pub mod notifier;

pub use campaign::{CampaignConfig, build_loyalty_engine};
pub use error::PolicyError;
pub use lookup::{
    InMemoryRedemptionLedger, PermissionLookup, RedemptionLookup, StaticPermissionDirectory,
};
pub use models::{AccessContext, Item, LoyaltyContext, OrderData};
pub use notifier::{LogNotifier, Notification, Notifier, SendReceipt};
