//! 会员活动规则装配
//!
//! 将 [`crate::loyalty`] 中的规则与动作组装为一个规则组：
//!
//! | 优先级 | 规则 | 动作 |
//! |--------|------|------|
//! | 10 | 参与资格（SKU、客户、金额、每人一次） | 设置折扣 |
//! | 20 | 已有折扣 | 通知客户 |
//! | 无 | 已有折扣 | 记录兑换 |
//!
//! 后两条读取的是第一条动作替换后的上下文。

use std::sync::Arc;

use rule_engine::{RuleEngine, RuleEntry, all};
use serde::Deserialize;
use tracing::info;

use crate::loyalty::{
    apply_discount, exclude_customer, has_discount, include_sku, minimum_purchase,
    only_one_per_customer, record_redemption, send_notification,
};
use crate::lookup::RedemptionLookup;
use crate::models::LoyaltyContext;
use crate::notifier::Notifier;

/// 活动参数
#[derive(Debug, Clone, Deserialize)]
pub struct CampaignConfig {
    /// 规则组名
    #[serde(default = "default_group")]
    pub group: String,

    /// 参与活动的 SKU
    #[serde(default = "default_include_skus")]
    pub include_skus: Vec<String>,

    #[serde(default)]
    pub exclude_customers: Vec<String>,

    /// 最低消费金额
    #[serde(default = "default_min_purchase")]
    pub min_purchase: f64,

    #[serde(default = "default_discount_percent")]
    pub discount_percent: u32,
}

fn default_group() -> String {
    "loyalty".to_string()
}

fn default_include_skus() -> Vec<String> {
    vec!["sku1".to_string()]
}

fn default_min_purchase() -> f64 {
    100.0
}

fn default_discount_percent() -> u32 {
    10
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            group: default_group(),
            include_skus: default_include_skus(),
            exclude_customers: Vec::new(),
            min_purchase: default_min_purchase(),
            discount_percent: default_discount_percent(),
        }
    }
}

/// 组装会员活动规则引擎
pub fn build_loyalty_engine(
    config: &CampaignConfig,
    ledger: Arc<dyn RedemptionLookup>,
    notifier: Arc<dyn Notifier>,
) -> RuleEngine<LoyaltyContext> {
    let mut engine = RuleEngine::new();

    let eligibility = all([
        include_sku(config.include_skus.iter().cloned()),
        exclude_customer(config.exclude_customers.iter().cloned()),
        minimum_purchase(config.min_purchase),
        only_one_per_customer(Arc::clone(&ledger)),
    ]);

    engine.add_entry(
        config.group.as_str(),
        RuleEntry::new(eligibility)
            .with_action(apply_discount(config.discount_percent))
            .with_priority(10)
            .with_name("eligibility"),
    );
    engine.add_entry(
        config.group.as_str(),
        RuleEntry::new(has_discount())
            .with_action(send_notification(notifier))
            .with_priority(20)
            .with_name("notify"),
    );
    // 不设优先级，始终最后执行
    engine.add_entry(
        config.group.as_str(),
        RuleEntry::new(has_discount())
            .with_action(record_redemption(ledger))
            .with_name("record-redemption"),
    );

    info!(
        group = %config.group,
        discount_percent = config.discount_percent,
        min_purchase = config.min_purchase,
        "会员活动规则已装配"
    );

    engine
}
