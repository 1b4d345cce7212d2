//! 规则动作定义
//!
//! 动作只在规则命中时执行，接收当前上下文并返回替换后的完整上下文。
//! 原样返回输入即表示“无影响”。

use crate::error::{Result, RuleError};
use crate::predicate::RuleKind;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type StatelessActionFn<T> = dyn Fn(T) -> anyhow::Result<T> + Send + Sync;

pub type StatefulActionFn<T> = dyn Fn(T) -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync;

/// 上下文变换动作
pub enum Action<T> {
    Stateless(Arc<StatelessActionFn<T>>),
    Stateful(Arc<StatefulActionFn<T>>),
}

impl<T> Action<T>
where
    T: Send + Sync + 'static,
{
    /// 由不会失败的同步变换构造动作
    pub fn stateless<F>(transform: F) -> Self
    where
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        Self::Stateless(Arc::new(move |context: T| -> anyhow::Result<T> {
            Ok(transform(context))
        }))
    }

    /// 由可能失败的同步变换构造动作
    pub fn try_stateless<F>(transform: F) -> Self
    where
        F: Fn(T) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self::Stateless(Arc::new(transform))
    }

    /// 由异步变换构造动作（如发送通知、写入外部系统）
    pub fn stateful<F, Fut>(transform: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::Stateful(Arc::new(
            move |context: T| -> BoxFuture<'static, anyhow::Result<T>> { transform(context).boxed() },
        ))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Stateless(_) => RuleKind::Stateless,
            Self::Stateful(_) => RuleKind::Stateful,
        }
    }

    /// 执行动作，返回新的上下文
    pub async fn apply(&self, context: T) -> Result<T> {
        let outcome = match self {
            Self::Stateless(transform) => transform(context),
            Self::Stateful(transform) => transform(context).await,
        };

        outcome.map_err(RuleError::from_action)
    }
}

impl<T> Clone for Action<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Stateless(transform) => Self::Stateless(Arc::clone(transform)),
            Self::Stateful(transform) => Self::Stateful(Arc::clone(transform)),
        }
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless(_) => f.write_str("Action::Stateless(..)"),
            Self::Stateful(_) => f.write_str("Action::Stateful(..)"),
        }
    }
}
