//! 规则引擎演示程序
//!
//! 用内存兑换记录运行会员活动规则（同一客户运行两次，第二次因“每人一次”不再享受折扣），
//! 随后运行访问控制示例。

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use rule_engine::all;
use rule_policies::{
    AccessContext, InMemoryRedemptionLedger, Item, LogNotifier, LoyaltyContext, OrderData,
    StaticPermissionDirectory, access, build_loyalty_engine, config::DemoConfig,
};
use rule_shared::observability;
use tracing::info;

fn sample_order(customer_id: &str) -> LoyaltyContext {
    LoyaltyContext {
        customer_id: customer_id.to_string(),
        event_name: "Loyalty Program".to_string(),
        event_type: "Discount".to_string(),
        order_data: OrderData {
            items: vec![Item::new("sku1", 2, 50.0), Item::new("sku4", 1, 30.0)],
            transaction_date: Utc::now(),
            payment_method: "credit-card".to_string(),
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置，失败时回退到默认值（此时日志尚未初始化）
    let config = DemoConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {}", e);
        DemoConfig::fallback()
    });

    // 2. 初始化日志
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    observability::init(&obs_config)?;

    info!(environment = %config.environment, "Configuration loaded");

    // 3. 会员活动
    let ledger = Arc::new(InMemoryRedemptionLedger::new());
    let engine = build_loyalty_engine(&config.campaign, ledger.clone(), Arc::new(LogNotifier));

    for attempt in 1..=2 {
        let report = engine
            .run_traced(&config.campaign.group, sample_order("customer1"))
            .await?;

        info!(
            attempt,
            matched = ?report.matched_labels(),
            actions = report.actions_applied(),
            elapsed_ms = report.evaluation_time_ms,
            "会员活动规则执行完成"
        );
        println!("{}", serde_json::to_string_pretty(&report.context)?);
    }
    info!(redemptions = ledger.len(), "兑换记录");

    // 4. 访问控制示例
    let directory = Arc::new(StaticPermissionDirectory::new());
    directory.grant("admin", "admin");
    directory.grant("guest", "user");

    let can_administer = all([
        access::is_over_18(),
        access::has_permission(directory, "admin"),
    ]);

    for context in [
        AccessContext {
            age: 19,
            user_id: "admin".to_string(),
        },
        AccessContext {
            age: 17,
            user_id: "guest".to_string(),
        },
    ] {
        let allowed = can_administer.evaluate(&context).await?;
        println!(
            "{}",
            serde_json::json!({ "context": context, "allowed": allowed })
        );
    }

    Ok(())
}
