//! 规则引擎核心
//!
//! 提供可嵌入的规则评估能力，支持：
//! - 同步/异步谓词的统一表示（显式标签，而非调用签名推断）
//! - `all`/`any`/`not` 短路组合
//! - 按 key 分组、按优先级排序的顺序执行，并通过动作传递上下文

pub mod action;
pub mod combinators;
pub mod engine;
pub mod error;
pub mod models;
pub mod predicate;

pub use action::Action;
pub use combinators::{all, and, any, not, or};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use models::{EngineStats, EntryTrace, RuleEntry, RuleGroup, RunReport};
pub use predicate::{Rule, RuleKind};
