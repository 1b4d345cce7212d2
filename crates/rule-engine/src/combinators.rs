//! 逻辑组合器
//!
//! `all`/`and`、`any`/`or`、`not` 将多个规则组合为一个有状态规则。
//! 子规则按传入顺序依次求值（不并发），并在结果确定后立即短路。

use crate::error::Result;
use crate::predicate::Rule;
use std::ops::Not;
use std::sync::Arc;

/// 所有子规则都为真时为真；空列表为真
pub fn all<T, I>(rules: I) -> Rule<T>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = Rule<T>>,
{
    let rules: Arc<[Rule<T>]> = rules.into_iter().collect();

    Rule::stateful(move |context| {
        let rules = Arc::clone(&rules);
        Box::pin(async move {
            evaluate_all(&rules, context)
                .await
                .map_err(anyhow::Error::from)
        })
    })
}

/// [`all`] 的别名
pub fn and<T, I>(rules: I) -> Rule<T>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = Rule<T>>,
{
    all(rules)
}

/// 任一子规则为真时为真；空列表为假
pub fn any<T, I>(rules: I) -> Rule<T>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = Rule<T>>,
{
    let rules: Arc<[Rule<T>]> = rules.into_iter().collect();

    Rule::stateful(move |context| {
        let rules = Arc::clone(&rules);
        Box::pin(async move {
            evaluate_any(&rules, context)
                .await
                .map_err(anyhow::Error::from)
        })
    })
}

/// [`any`] 的别名
pub fn or<T, I>(rules: I) -> Rule<T>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = Rule<T>>,
{
    any(rules)
}

/// 取反
pub fn not<T>(rule: Rule<T>) -> Rule<T>
where
    T: Send + Sync + 'static,
{
    Rule::stateful(move |context| {
        let rule = rule.clone();
        Box::pin(async move {
            rule.evaluate(context)
                .await
                .map(|matched| !matched)
                .map_err(anyhow::Error::from)
        })
    })
}

/// AND: 遇到 false 立即返回
async fn evaluate_all<T>(rules: &[Rule<T>], context: &T) -> Result<bool>
where
    T: Send + Sync + 'static,
{
    for rule in rules {
        if !rule.evaluate(context).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// OR: 遇到 true 立即返回
async fn evaluate_any<T>(rules: &[Rule<T>], context: &T) -> Result<bool>
where
    T: Send + Sync + 'static,
{
    for rule in rules {
        if rule.evaluate(context).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

impl<T> Rule<T>
where
    T: Send + Sync + 'static,
{
    /// `self` 与 `other` 都为真
    pub fn and(self, other: Rule<T>) -> Rule<T> {
        all([self, other])
    }

    /// `self` 或 `other` 为真
    pub fn or(self, other: Rule<T>) -> Rule<T> {
        any([self, other])
    }
}

impl<T> Not for Rule<T>
where
    T: Send + Sync + 'static,
{
    type Output = Rule<T>;

    fn not(self) -> Self::Output {
        not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::predicate::RuleKind;
    use anyhow::anyhow;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Subject {
        age: u32,
    }

    /// 记录调用顺序的规则
    fn recording(label: &'static str, result: bool, log: &Arc<Mutex<Vec<&'static str>>>) -> Rule<Subject> {
        let log = Arc::clone(log);
        Rule::stateless(move |_: &Subject| {
            log.lock().unwrap().push(label);
            result
        })
    }

    fn delayed(result: bool) -> Rule<Subject> {
        Rule::stateful(move |_: &Subject| {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(result)
            })
        })
    }

    fn subject() -> Subject {
        Subject { age: 30 }
    }

    #[tokio::test]
    async fn test_empty_all_is_true() {
        let rule = all(Vec::<Rule<Subject>>::new());
        assert!(rule.evaluate(&subject()).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_any_is_false() {
        let rule = any(Vec::<Rule<Subject>>::new());
        assert!(!rule.evaluate(&subject()).await.unwrap());
    }

    #[tokio::test]
    async fn test_combinators_are_stateful() {
        let adult = Rule::stateless(|s: &Subject| s.age >= 18);

        assert_eq!(all([adult.clone()]).kind(), RuleKind::Stateful);
        assert_eq!(any([adult.clone()]).kind(), RuleKind::Stateful);
        assert_eq!(not(adult).kind(), RuleKind::Stateful);
    }

    #[tokio::test]
    async fn test_and_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = and([recording("a", false, &log), recording("b", true, &log)]);

        assert!(!rule.evaluate(&subject()).await.unwrap());
        // AND 短路：第一个为假，第二个不会被调用
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_and_evaluates_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = and([
            recording("a", true, &log),
            recording("b", true, &log),
            recording("c", true, &log),
        ]);

        assert!(rule.evaluate(&subject()).await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_or_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = or([recording("a", true, &log), recording("b", false, &log)]);

        assert!(rule.evaluate(&subject()).await.unwrap());
        // OR 短路：第一个为真，第二个不会被调用
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_or_all_false() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rule = or([recording("a", false, &log), recording("b", false, &log)]);

        assert!(!rule.evaluate(&subject()).await.unwrap());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_double_negation() {
        for result in [true, false] {
            let rule = not(not(delayed(result)));
            assert_eq!(rule.evaluate(&subject()).await.unwrap(), result);
        }
    }

    #[tokio::test]
    async fn test_mixed_stateless_and_stateful() {
        let adult = Rule::stateless(|s: &Subject| s.age >= 18);
        let rule = all([adult, delayed(true), any([delayed(false), delayed(true)])]);

        assert!(rule.evaluate(&subject()).await.unwrap());
    }

    #[tokio::test]
    async fn test_method_sugar() {
        let adult = Rule::stateless(|s: &Subject| s.age >= 18);
        let senior = Rule::stateless(|s: &Subject| s.age >= 65);

        assert!(adult.clone().and(!senior.clone()).evaluate(&subject()).await.unwrap());
        assert!(!senior.clone().or(!adult).evaluate(&subject()).await.unwrap());
        assert!(!(!delayed(true)).evaluate(&subject()).await.unwrap());
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_operands() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = Rule::try_stateless(|_: &Subject| Err(anyhow!("lookup failed")));
        let rule = all([recording("a", true, &log), failing, recording("c", true, &log)]);

        let err = rule.evaluate(&subject()).await.unwrap_err();

        assert_eq!(*log.lock().unwrap(), vec!["a"]);
        match err {
            RuleError::PredicateFailed(source) => assert_eq!(source.to_string(), "lookup failed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nested_failure_surfaces_once() {
        let failing = Rule::try_stateless(|_: &Subject| Err(anyhow!("deep failure")));
        let rule = not(any([delayed(false), all([delayed(true), failing])]));

        match rule.evaluate(&subject()).await.unwrap_err() {
            RuleError::PredicateFailed(source) => assert_eq!(source.to_string(), "deep failure"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
