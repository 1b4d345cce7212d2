//! 规则引擎
//!
//! 按 key 管理规则组，并按优先级顺序将上下文依次传过组内条目：
//! 规则命中且带动作时，用动作返回的上下文替换当前上下文，后续条目看到的是替换后的值。
//!
//! 注册需要 `&mut self`，执行只需要 `&self`：执行期间无法修改注册表，
//! 同一个引擎可以被多个任务以不同的上下文并发执行。

use crate::action::Action;
use crate::error::{Result, RuleError};
use crate::models::{EngineStats, EntryTrace, RuleEntry, RuleGroup, RunReport};
use crate::predicate::{Rule, RuleKind};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// 规则引擎
///
/// 规则组按首次注册的顺序保存，`run_all` 也按此顺序执行各组。
pub struct RuleEngine<T> {
    groups: Vec<RuleGroup<T>>,
}

impl<T> RuleEngine<T>
where
    T: Send + Sync + 'static,
{
    /// 创建空引擎
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// 从初始映射创建引擎
    ///
    /// 重复出现的 key 会合并到同一个组中；条目为空的 key 也视为已注册。
    pub fn with_groups<I, K>(groups: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<RuleEntry<T>>)>,
        K: Into<String>,
    {
        let mut engine = Self::new();
        for (key, entries) in groups {
            let group = engine.group_or_insert(key.into());
            for entry in entries {
                group.push(entry);
            }
        }
        engine
    }

    /// 向指定组追加规则（组不存在时自动创建），不做去重
    pub fn add_rule(&mut self, key: impl Into<String>, rule: Rule<T>, action: Option<Action<T>>) {
        let mut entry = RuleEntry::new(rule);
        if let Some(action) = action {
            entry = entry.with_action(action);
        }
        self.add_entry(key, entry);
    }

    /// 向指定组追加完整条目（可带优先级与名称）
    pub fn add_entry(&mut self, key: impl Into<String>, entry: RuleEntry<T>) {
        let key = key.into();
        trace!(
            group = %key,
            priority = ?entry.priority(),
            kind = %entry.rule().kind(),
            has_action = entry.action().is_some(),
            "注册规则条目"
        );

        self.group_or_insert(key).push(entry);
    }

    /// 删除整个规则组；key 不存在时什么也不做
    pub fn remove_rules(&mut self, key: &str) {
        if let Some(index) = self.position(key) {
            let group = self.groups.remove(index);
            info!(group = %key, entries = group.len(), "规则组已删除");
        }
    }

    pub fn contains_group(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// 所有组的 key（按注册顺序）
    pub fn group_keys(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.key()).collect()
    }

    /// 指定组的条目数
    pub fn group_len(&self, key: &str) -> Option<usize> {
        self.group(key).map(|group| group.len())
    }

    /// 规则组数量
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn stats(&self) -> EngineStats {
        let entries = self.groups.iter().flat_map(|group| group.entries());

        let mut stats = EngineStats {
            groups: self.groups.len(),
            entries: 0,
            entries_with_action: 0,
            stateful_rules: 0,
        };
        for entry in entries {
            stats.entries += 1;
            if entry.action().is_some() {
                stats.entries_with_action += 1;
            }
            if entry.rule().kind() == RuleKind::Stateful {
                stats.stateful_rules += 1;
            }
        }
        stats
    }

    /// 执行指定组
    ///
    /// 上下文按值传入，引擎在其上逐步替换；调用方若需要在失败时保留原值，
    /// 应在调用前自行 clone。任一谓词或动作失败时立即返回错误，
    /// 之前已执行的动作结果不会回滚。
    #[instrument(skip(self, context), fields(group = %key))]
    pub async fn run(&self, key: &str, context: T) -> Result<T> {
        let group = self
            .group(key)
            .ok_or_else(|| RuleError::GroupNotFound(key.to_string()))?;

        self.execute_group(group, context, None).await
    }

    /// 按注册顺序执行所有组，上下文在组之间依次传递
    ///
    /// 空引擎直接返回输入上下文。
    #[instrument(skip(self, context), fields(groups = self.groups.len()))]
    pub async fn run_all(&self, context: T) -> Result<T> {
        let mut context = context;
        for group in &self.groups {
            context = self.execute_group(group, context, None).await?;
        }
        Ok(context)
    }

    /// 与 [`run`](Self::run) 相同，但额外返回每个条目的评估记录
    #[instrument(skip(self, context), fields(group = %key))]
    pub async fn run_traced(&self, key: &str, context: T) -> Result<RunReport<T>> {
        let start = Instant::now();
        let group = self
            .group(key)
            .ok_or_else(|| RuleError::GroupNotFound(key.to_string()))?;

        let mut traces = Vec::with_capacity(group.len());
        let context = self.execute_group(group, context, Some(&mut traces)).await?;

        Ok(RunReport {
            context,
            entries: traces,
            evaluation_time_ms: elapsed_ms(start),
        })
    }

    /// 与 [`run_all`](Self::run_all) 相同，但额外返回每个条目的评估记录
    #[instrument(skip(self, context), fields(groups = self.groups.len()))]
    pub async fn run_all_traced(&self, context: T) -> Result<RunReport<T>> {
        let start = Instant::now();
        let mut traces = Vec::new();

        let mut context = context;
        for group in &self.groups {
            context = self
                .execute_group(group, context, Some(&mut traces))
                .await?;
        }

        Ok(RunReport {
            context,
            entries: traces,
            evaluation_time_ms: elapsed_ms(start),
        })
    }

    /// 顺序执行组内条目：当前条目的谓词（及命中后的动作）完成后才进入下一个
    async fn execute_group(
        &self,
        group: &RuleGroup<T>,
        mut context: T,
        mut traces: Option<&mut Vec<EntryTrace>>,
    ) -> Result<T> {
        for (index, entry) in group.entries().iter().enumerate() {
            let matched = entry.rule().evaluate(&context).await?;

            let mut action_applied = false;
            if matched {
                if let Some(action) = entry.action() {
                    context = action.apply(context).await?;
                    action_applied = true;
                }
            }

            let label = entry_label(group, entry, index);
            debug!(
                group = %group.key(),
                entry = %label,
                matched,
                action_applied,
                "规则条目评估完成"
            );

            if let Some(traces) = traces.as_deref_mut() {
                traces.push(EntryTrace {
                    group: group.key().to_string(),
                    label,
                    kind: entry.rule().kind(),
                    priority: entry.priority(),
                    matched,
                    action_applied,
                });
            }
        }

        Ok(context)
    }

    fn group(&self, key: &str) -> Option<&RuleGroup<T>> {
        self.groups.iter().find(|group| group.key() == key)
    }

    fn group_or_insert(&mut self, key: String) -> &mut RuleGroup<T> {
        let index = match self.position(&key) {
            Some(index) => index,
            None => {
                self.groups.push(RuleGroup::new(key));
                self.groups.len() - 1
            }
        };
        &mut self.groups[index]
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.groups.iter().position(|group| group.key() == key)
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn entry_label<T>(group: &RuleGroup<T>, entry: &RuleEntry<T>, index: usize) -> String {
    match entry.name() {
        Some(name) => name.to_string(),
        None => format!("{}[{}]", group.key(), index),
    }
}

impl<T> Default for RuleEngine<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RuleEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEngine")
            .field("groups", &self.groups)
            .finish()
    }
}
