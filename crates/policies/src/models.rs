//! 业务上下文模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_code: String,
    pub quantity: u32,
    /// 折扣百分比
    pub discount: u32,
    pub price: f64,
}

impl Item {
    pub fn new(item_code: impl Into<String>, quantity: u32, price: f64) -> Self {
        Self {
            item_code: item_code.into(),
            quantity,
            discount: 0,
            price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub items: Vec<Item>,
    pub transaction_date: DateTime<Utc>,
    pub payment_method: String,
}

impl OrderData {
    /// 订单总额（不计折扣）
    pub fn total(&self) -> f64 {
        self.items.iter().map(Item::subtotal).sum()
    }
}

/// 会员营销活动的评估上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyContext {
    pub customer_id: String,
    pub event_name: String,
    pub event_type: String,
    pub order_data: OrderData,
}

impl LoyaltyContext {
    /// 是否已有订单行带折扣
    pub fn has_discount(&self) -> bool {
        self.order_data.items.iter().any(|item| item.discount > 0)
    }
}

/// 访问控制示例的评估上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessContext {
    pub age: u32,
    pub user_id: String,
}
