//! 规则（谓词）定义
//!
//! 同步与异步谓词统一为 [`Rule`] 枚举，在构造时显式打上标签，
//! 组合器和引擎都只通过 [`Rule::evaluate`] 调用规则。

use crate::error::{Result, RuleError};
use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 无状态谓词：立即得出结果，不会挂起
pub type StatelessFn<T> = dyn Fn(&T) -> anyhow::Result<bool> + Send + Sync;

/// 有状态谓词：返回需要等待的 future（例如外部查询）
pub type StatefulFn<T> =
    dyn for<'a> Fn(&'a T) -> BoxFuture<'a, anyhow::Result<bool>> + Send + Sync;

/// 规则的调用形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Stateless,
    Stateful,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless => write!(f, "stateless"),
            Self::Stateful => write!(f, "stateful"),
        }
    }
}

/// 作用于上下文 `T` 的布尔规则
pub enum Rule<T> {
    Stateless(Arc<StatelessFn<T>>),
    Stateful(Arc<StatefulFn<T>>),
}

impl<T> Rule<T>
where
    T: Send + Sync + 'static,
{
    /// 由不会失败的同步谓词构造规则
    pub fn stateless<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::Stateless(Arc::new(move |context: &T| -> anyhow::Result<bool> {
            Ok(predicate(context))
        }))
    }

    /// 由可能失败的同步谓词构造规则
    pub fn try_stateless<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::Stateless(Arc::new(predicate))
    }

    /// 由异步谓词构造规则
    ///
    /// ```ignore
    /// let rule = Rule::stateful(|ctx: &Order| {
    ///     let customer_id = ctx.customer_id.clone();
    ///     Box::pin(async move { lookup.is_active(&customer_id).await })
    /// });
    /// ```
    pub fn stateful<F>(predicate: F) -> Self
    where
        F: for<'a> Fn(&'a T) -> BoxFuture<'a, anyhow::Result<bool>> + Send + Sync + 'static,
    {
        Self::Stateful(Arc::new(predicate))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Stateless(_) => RuleKind::Stateless,
            Self::Stateful(_) => RuleKind::Stateful,
        }
    }

    /// 对上下文求值
    ///
    /// 无状态规则直接返回结果；有状态规则在此处等待。谓词返回的错误
    /// 统一转换为 [`RuleError::PredicateFailed`]。
    pub async fn evaluate(&self, context: &T) -> Result<bool> {
        let outcome = match self {
            Self::Stateless(predicate) => predicate(context),
            Self::Stateful(predicate) => predicate(context).await,
        };

        outcome.map_err(RuleError::from_predicate)
    }
}

impl<T> Clone for Rule<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Stateless(predicate) => Self::Stateless(Arc::clone(predicate)),
            Self::Stateful(predicate) => Self::Stateful(Arc::clone(predicate)),
        }
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless(_) => f.write_str("Rule::Stateless(..)"),
            Self::Stateful(_) => f.write_str("Rule::Stateful(..)"),
        }
    }
}
