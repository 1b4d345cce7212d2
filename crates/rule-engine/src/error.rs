//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// 调用了从未注册过的规则组
    #[error("规则组不存在: {0}")]
    GroupNotFound(String),

    #[error("谓词执行失败: {0}")]
    PredicateFailed(#[source] anyhow::Error),

    #[error("动作执行失败: {0}")]
    ActionFailed(#[source] anyhow::Error),
}

impl RuleError {
    /// 将谓词返回的错误转换为 `RuleError`
    ///
    /// 组合器会把子规则的 `RuleError` 包进 `anyhow::Error` 向上传递，
    /// 这里先尝试还原，避免同一个失败被层层嵌套包装。
    pub(crate) fn from_predicate(err: anyhow::Error) -> Self {
        match err.downcast::<RuleError>() {
            Ok(inner) => inner,
            Err(err) => RuleError::PredicateFailed(err),
        }
    }

    /// 将动作返回的错误转换为 `RuleError`
    pub(crate) fn from_action(err: anyhow::Error) -> Self {
        match err.downcast::<RuleError>() {
            Ok(inner) => inner,
            Err(err) => RuleError::ActionFailed(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
