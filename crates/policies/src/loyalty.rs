//! 会员营销规则与动作
//!
//! 无状态规则只读取订单内容；有状态规则和动作通过 [`RedemptionLookup`] /
//! [`Notifier`] 访问外部系统。

use std::collections::HashSet;
use std::sync::Arc;

use rule_engine::{Action, Rule};
use tracing::debug;

use crate::lookup::RedemptionLookup;
use crate::models::{Item, LoyaltyContext, OrderData};
use crate::notifier::{Notification, Notifier};

fn code_set(codes: impl IntoIterator<Item = impl Into<String>>) -> HashSet<String> {
    codes.into_iter().map(Into::into).collect()
}

// ==================== 无状态规则 ====================

/// 订单中至少有一个商品在名单内
pub fn include_sku(skus: impl IntoIterator<Item = impl Into<String>>) -> Rule<LoyaltyContext> {
    let skus = code_set(skus);
    Rule::stateless(move |context: &LoyaltyContext| {
        context
            .order_data
            .items
            .iter()
            .any(|item| skus.contains(&item.item_code))
    })
}

/// 订单中没有任何商品在名单内
pub fn exclude_sku(skus: impl IntoIterator<Item = impl Into<String>>) -> Rule<LoyaltyContext> {
    let skus = code_set(skus);
    Rule::stateless(move |context: &LoyaltyContext| {
        !context
            .order_data
            .items
            .iter()
            .any(|item| skus.contains(&item.item_code))
    })
}

pub fn include_customer(
    customers: impl IntoIterator<Item = impl Into<String>>,
) -> Rule<LoyaltyContext> {
    let customers = code_set(customers);
    Rule::stateless(move |context: &LoyaltyContext| customers.contains(&context.customer_id))
}

pub fn exclude_customer(
    customers: impl IntoIterator<Item = impl Into<String>>,
) -> Rule<LoyaltyContext> {
    let customers = code_set(customers);
    Rule::stateless(move |context: &LoyaltyContext| !customers.contains(&context.customer_id))
}

/// 订单总额（单价 × 数量）不低于 `min_amount`
pub fn minimum_purchase(min_amount: f64) -> Rule<LoyaltyContext> {
    Rule::stateless(move |context: &LoyaltyContext| context.order_data.total() >= min_amount)
}

/// 订单已带折扣
pub fn has_discount() -> Rule<LoyaltyContext> {
    Rule::stateless(LoyaltyContext::has_discount)
}

// ==================== 有状态规则 ====================

async fn not_yet_redeemed(
    lookup: &dyn RedemptionLookup,
    customer_id: &str,
) -> anyhow::Result<bool> {
    let redeemed = lookup.has_redeemed(customer_id).await?;
    debug!(customer_id, redeemed, "查询兑换记录");
    Ok(!redeemed)
}

/// 每位客户仅限一次：兑换记录中没有该客户时为真
pub fn only_one_per_customer(lookup: Arc<dyn RedemptionLookup>) -> Rule<LoyaltyContext> {
    Rule::stateful(move |context: &LoyaltyContext| {
        let lookup = Arc::clone(&lookup);
        Box::pin(async move { not_yet_redeemed(lookup.as_ref(), &context.customer_id).await })
    })
}

// ==================== 动作 ====================

/// 为每个订单行设置折扣百分比，返回新的上下文
pub fn apply_discount(percent: u32) -> Action<LoyaltyContext> {
    Action::stateless(move |context: LoyaltyContext| {
        let items = context
            .order_data
            .items
            .into_iter()
            .map(|item| Item {
                discount: percent,
                ..item
            })
            .collect();

        LoyaltyContext {
            order_data: OrderData {
                items,
                ..context.order_data
            },
            ..context
        }
    })
}

async fn notify(
    notifier: &dyn Notifier,
    context: LoyaltyContext,
) -> anyhow::Result<LoyaltyContext> {
    let receipt = notifier
        .send(&Notification::discount_applied(&context))
        .await?;
    debug!(
        customer_id = %context.customer_id,
        message_id = %receipt.message_id,
        "优惠通知已发送"
    );
    Ok(context)
}

/// 通知客户优惠已生效，上下文原样返回
pub fn send_notification(notifier: Arc<dyn Notifier>) -> Action<LoyaltyContext> {
    Action::stateful(move |context: LoyaltyContext| {
        let notifier = Arc::clone(&notifier);
        async move { notify(notifier.as_ref(), context).await }
    })
}

async fn record(
    lookup: &dyn RedemptionLookup,
    context: LoyaltyContext,
) -> anyhow::Result<LoyaltyContext> {
    lookup.record_redemption(&context.customer_id).await?;
    Ok(context)
}

/// 记录本次兑换，上下文原样返回
pub fn record_redemption(lookup: Arc<dyn RedemptionLookup>) -> Action<LoyaltyContext> {
    Action::stateful(move |context: LoyaltyContext| {
        let lookup = Arc::clone(&lookup);
        async move { record(lookup.as_ref(), context).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;
    use crate::lookup::MockRedemptionLookup;
    use crate::notifier::{MockNotifier, SendReceipt};
    use chrono::Utc;
    use rule_engine::{RuleError, all};

    fn make_context() -> LoyaltyContext {
        LoyaltyContext {
            customer_id: "customer1".to_string(),
            event_name: "Loyalty Program".to_string(),
            event_type: "Discount".to_string(),
            order_data: OrderData {
                items: vec![Item::new("sku1", 2, 50.0), Item::new("sku4", 1, 30.0)],
                transaction_date: Utc::now(),
                payment_method: "credit-card".to_string(),
            },
        }
    }

    fn redeemed_lookup(customer_id: &'static str, redeemed: bool) -> MockRedemptionLookup {
        let mut lookup = MockRedemptionLookup::new();
        lookup
            .expect_has_redeemed()
            .withf(move |id| id == customer_id)
            .times(1)
            .returning(move |_| Ok(redeemed));
        lookup
    }

    #[tokio::test]
    async fn test_include_sku() {
        let ctx = make_context();
        assert!(include_sku(["sku1", "sku2"]).evaluate(&ctx).await.unwrap());
        assert!(!include_sku(["sku3"]).evaluate(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_exclude_sku() {
        let ctx = make_context();
        assert!(exclude_sku(["sku3"]).evaluate(&ctx).await.unwrap());
        assert!(!exclude_sku(["sku1"]).evaluate(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_include_and_exclude_customer() {
        let ctx = make_context();
        assert!(include_customer(["customer1", "customer2"]).evaluate(&ctx).await.unwrap());
        assert!(!include_customer(["customer2"]).evaluate(&ctx).await.unwrap());
        assert!(exclude_customer(["customer2"]).evaluate(&ctx).await.unwrap());
        assert!(!exclude_customer(["customer1"]).evaluate(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_minimum_purchase() {
        let ctx = make_context();
        assert!(minimum_purchase(100.0).evaluate(&ctx).await.unwrap());
        assert!(minimum_purchase(130.0).evaluate(&ctx).await.unwrap());
        assert!(!minimum_purchase(200.0).evaluate(&ctx).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_one_per_customer_not_redeemed() {
        let rule = only_one_per_customer(Arc::new(redeemed_lookup("customer1", false)));
        assert!(rule.evaluate(&make_context()).await.unwrap());
    }

    #[tokio::test]
    async fn test_only_one_per_customer_already_redeemed() {
        let rule = only_one_per_customer(Arc::new(redeemed_lookup("customer1", true)));
        assert!(!rule.evaluate(&make_context()).await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_predicate_error() {
        let mut lookup = MockRedemptionLookup::new();
        lookup.expect_has_redeemed().returning(|_| {
            Err(PolicyError::LookupFailed {
                source_name: "redemptions".to_string(),
                reason: "timeout".to_string(),
            })
        });

        let err = only_one_per_customer(Arc::new(lookup))
            .evaluate(&make_context())
            .await
            .unwrap_err();

        assert!(matches!(err, RuleError::PredicateFailed(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn test_eligibility_short_circuits_before_lookup() {
        // 金额不足时不应触发兑换查询
        let mut lookup = MockRedemptionLookup::new();
        lookup.expect_has_redeemed().never();

        let rule = all([
            include_sku(["sku1"]),
            minimum_purchase(500.0),
            only_one_per_customer(Arc::new(lookup)),
        ]);

        assert!(!rule.evaluate(&make_context()).await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_discount() {
        let ctx = make_context();
        let result = apply_discount(10).apply(ctx.clone()).await.unwrap();

        assert!(result.order_data.items.iter().all(|item| item.discount == 10));
        assert_eq!(result.customer_id, ctx.customer_id);
        assert_eq!(result.order_data.total(), ctx.order_data.total());
        assert!(!ctx.has_discount());
    }

    #[tokio::test]
    async fn test_send_notification_keeps_context() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_send()
            .withf(|notification| notification.customer_id == "customer1")
            .times(1)
            .returning(|_| {
                Ok(SendReceipt {
                    message_id: "msg-1".to_string(),
                    sent_at: Utc::now(),
                })
            });

        let ctx = make_context();
        let result = send_notification(Arc::new(notifier))
            .apply(ctx.clone())
            .await
            .unwrap();

        assert_eq!(result, ctx);
    }

    #[tokio::test]
    async fn test_send_notification_failure_is_action_error() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().returning(|_| {
            Err(PolicyError::NotificationFailed {
                channel: "app_push".to_string(),
                reason: "device offline".to_string(),
            })
        });

        let err = send_notification(Arc::new(notifier))
            .apply(make_context())
            .await
            .unwrap_err();

        assert!(matches!(err, RuleError::ActionFailed(_)));
    }

    #[tokio::test]
    async fn test_record_redemption() {
        let mut lookup = MockRedemptionLookup::new();
        lookup
            .expect_record_redemption()
            .withf(|id| id == "customer1")
            .times(1)
            .returning(|_| Ok(()));

        let ctx = make_context();
        let result = record_redemption(Arc::new(lookup))
            .apply(ctx.clone())
            .await
            .unwrap();

        assert_eq!(result, ctx);
    }
}
