//! 业务规则错误类型
//!
//! 外部查询与通知发送失败时返回，经由规则/动作传递给引擎后
//! 会以 `RuleError::PredicateFailed` / `RuleError::ActionFailed` 的形式交给调用方。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("外部查询失败: 来源={source_name}, 原因={reason}")]
    LookupFailed { source_name: String, reason: String },

    #[error("通知发送失败: 渠道={channel}, 原因={reason}")]
    NotificationFailed { channel: String, reason: String },
}
