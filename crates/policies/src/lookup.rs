//! 外部查询接口
//!
//! 有状态规则依赖的外部数据（兑换记录、权限）通过 trait 抽象，
//! 规则只关心查询结果，不关心缓存、重试或存储细节。内存实现用于演示和测试。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::error::PolicyError;

/// 兑换记录接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedemptionLookup: Send + Sync {
    /// 客户是否已经兑换过
    async fn has_redeemed(&self, customer_id: &str) -> Result<bool, PolicyError>;

    /// 记录一次兑换
    async fn record_redemption(&self, customer_id: &str) -> Result<(), PolicyError>;
}

/// 权限查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionLookup: Send + Sync {
    async fn permissions(&self, user_id: &str) -> Result<Vec<String>, PolicyError>;
}

/// 内存兑换记录
#[derive(Debug, Default)]
pub struct InMemoryRedemptionLedger {
    redeemed: DashMap<String, DateTime<Utc>>,
}

impl InMemoryRedemptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次兑换时间
    pub fn redeemed_at(&self, customer_id: &str) -> Option<DateTime<Utc>> {
        self.redeemed.get(customer_id).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.redeemed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redeemed.is_empty()
    }
}

#[async_trait]
impl RedemptionLookup for InMemoryRedemptionLedger {
    async fn has_redeemed(&self, customer_id: &str) -> Result<bool, PolicyError> {
        Ok(self.redeemed.contains_key(customer_id))
    }

    async fn record_redemption(&self, customer_id: &str) -> Result<(), PolicyError> {
        // 重复记录保留首次兑换时间
        self.redeemed
            .entry(customer_id.to_string())
            .or_insert_with(Utc::now);
        debug!(customer_id, "兑换已记录");
        Ok(())
    }
}

/// 静态权限目录
#[derive(Debug, Default)]
pub struct StaticPermissionDirectory {
    permissions: DashMap<String, Vec<String>>,
}

impl StaticPermissionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, user_id: impl Into<String>, permission: impl Into<String>) {
        let permission = permission.into();
        let mut granted = self.permissions.entry(user_id.into()).or_default();
        if !granted.contains(&permission) {
            granted.push(permission);
        }
    }
}

#[async_trait]
impl PermissionLookup for StaticPermissionDirectory {
    async fn permissions(&self, user_id: &str) -> Result<Vec<String>, PolicyError> {
        Ok(self
            .permissions
            .get(user_id)
            .map(|granted| granted.value().clone())
            .unwrap_or_default())
    }
}
