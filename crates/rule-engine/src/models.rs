//! 规则引擎领域模型

use crate::action::Action;
use crate::predicate::{Rule, RuleKind};
use serde::Serialize;
use std::fmt;

/// 规则条目：谓词 + 可选动作 + 元数据
pub struct RuleEntry<T> {
    rule: Rule<T>,
    action: Option<Action<T>>,
    /// 数值越小越先执行；未设置时排在所有显式优先级之后
    priority: Option<i32>,
    /// 仅用于日志与追踪
    name: Option<String>,
}

impl<T> RuleEntry<T> {
    pub fn new(rule: Rule<T>) -> Self {
        Self {
            rule,
            action: None,
            priority: None,
            name: None,
        }
    }

    pub fn with_action(mut self, action: Action<T>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn rule(&self) -> &Rule<T> {
        &self.rule
    }

    pub fn action(&self) -> Option<&Action<T>> {
        self.action.as_ref()
    }

    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// 排序键：显式优先级按数值升序，未设置优先级的条目整体靠后
    fn sort_key(&self) -> (bool, i32) {
        match self.priority {
            Some(priority) => (false, priority),
            None => (true, 0),
        }
    }
}

impl<T> Clone for RuleEntry<T> {
    fn clone(&self) -> Self {
        Self {
            rule: self.rule.clone(),
            action: self.action.clone(),
            priority: self.priority,
            name: self.name.clone(),
        }
    }
}

impl<T> fmt::Debug for RuleEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("rule", &self.rule)
            .field("action", &self.action)
            .finish()
    }
}

/// 规则组：共享同一个 key 的条目集合
///
/// 条目始终按执行顺序存放：插入时放到相同排序键的最后一个位置之后，
/// 因此优先级相同（或都未设置）的条目保持注册顺序。
pub struct RuleGroup<T> {
    key: String,
    entries: Vec<RuleEntry<T>>,
}

impl<T> RuleGroup<T> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn push(&mut self, entry: RuleEntry<T>) {
        let key = entry.sort_key();
        let position = self.entries.partition_point(|existing| existing.sort_key() <= key);
        self.entries.insert(position, entry);
    }

    /// 按执行顺序返回条目
    pub fn entries(&self) -> &[RuleEntry<T>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> fmt::Debug for RuleGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleGroup")
            .field("key", &self.key)
            .field("entries", &self.entries)
            .finish()
    }
}

/// 单个条目的评估记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryTrace {
    pub group: String,
    /// 条目名称；未命名时为 `{group}[{index}]`，index 为执行顺序
    pub label: String,
    pub kind: RuleKind,
    pub priority: Option<i32>,
    pub matched: bool,
    pub action_applied: bool,
}

/// 带追踪信息的执行结果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T> {
    pub context: T,
    pub entries: Vec<EntryTrace>,
    pub evaluation_time_ms: u64,
}

impl<T> RunReport<T> {
    /// 命中的条目标签
    pub fn matched_labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|trace| trace.matched)
            .map(|trace| trace.label.as_str())
            .collect()
    }

    /// 执行了动作的条目数
    pub fn actions_applied(&self) -> usize {
        self.entries
            .iter()
            .filter(|trace| trace.action_applied)
            .count()
    }
}

/// 引擎统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStats {
    /// 规则组数量
    pub groups: usize,
    /// 条目总数
    pub entries: usize,
    /// 带动作的条目数
    pub entries_with_action: usize,
    /// 有状态（异步）规则数
    pub stateful_rules: usize,
}
