//! 客户通知发送
//!
//! 通过 `Notifier` trait 抽象发送行为，当前实现为模拟发送（仅记录日志），
//! 便于在无外部依赖的情况下验证规则动作链路。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::PolicyError;
use crate::models::LoyaltyContext;

/// 待发送的通知
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub notification_id: String,
    pub customer_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        customer_id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            notification_id: Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    /// 折扣生效通知
    pub fn discount_applied(context: &LoyaltyContext) -> Self {
        let discounted = context
            .order_data
            .items
            .iter()
            .filter(|item| item.discount > 0)
            .count();

        Self::new(
            context.customer_id.clone(),
            format!("{} 优惠已生效", context.event_name),
            format!("本单共有 {} 件商品享受折扣", discounted),
        )
    }
}

/// 发送回执
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    /// 外部渠道返回的消息标识，用于追踪投递状态
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

/// 通知发送器 trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<SendReceipt, PolicyError>;
}

/// 模拟通知发送器
///
/// 生产环境中替换为 APP 推送 / 短信服务的 SDK 调用
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<SendReceipt, PolicyError> {
        let message_id = Uuid::now_v7().to_string();

        info!(
            notification_id = %notification.notification_id,
            customer_id = %notification.customer_id,
            message_id = %message_id,
            title = %notification.title,
            "模拟发送客户通知"
        );

        Ok(SendReceipt {
            message_id,
            sent_at: Utc::now(),
        })
    }
}
