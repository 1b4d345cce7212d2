//! 访问控制示例规则

use std::sync::Arc;

use rule_engine::Rule;

use crate::lookup::PermissionLookup;
use crate::models::AccessContext;

/// 年龄大于 18
pub fn is_over_18() -> Rule<AccessContext> {
    Rule::stateless(|context: &AccessContext| context.age > 18)
}

async fn holds_permission(
    lookup: &dyn PermissionLookup,
    user_id: &str,
    permission: &str,
) -> anyhow::Result<bool> {
    let granted = lookup.permissions(user_id).await?;
    Ok(granted.iter().any(|p| p == permission))
}

/// 用户持有指定权限（需查询权限目录）
pub fn has_permission(
    lookup: Arc<dyn PermissionLookup>,
    permission: impl Into<String>,
) -> Rule<AccessContext> {
    let permission: Arc<str> = Arc::from(permission.into());
    Rule::stateful(move |context: &AccessContext| {
        let lookup = Arc::clone(&lookup);
        let permission = Arc::clone(&permission);
        Box::pin(async move {
            holds_permission(lookup.as_ref(), &context.user_id, &permission).await
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{MockPermissionLookup, StaticPermissionDirectory};
    use rule_engine::all;

    fn directory() -> Arc<StaticPermissionDirectory> {
        let directory = StaticPermissionDirectory::new();
        directory.grant("admin", "admin");
        directory.grant("user", "user");
        Arc::new(directory)
    }

    fn context(age: u32, user_id: &str) -> AccessContext {
        AccessContext {
            age,
            user_id: user_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_is_over_18_boundary() {
        let rule = is_over_18();
        assert!(rule.evaluate(&context(19, "user")).await.unwrap());
        assert!(!rule.evaluate(&context(18, "user")).await.unwrap());
    }

    #[tokio::test]
    async fn test_adult_admin_passes() {
        let rule = all([is_over_18(), has_permission(directory(), "admin")]);
        assert!(rule.evaluate(&context(19, "admin")).await.unwrap());
    }

    #[tokio::test]
    async fn test_minor_user_fails() {
        let rule = all([is_over_18(), has_permission(directory(), "admin")]);
        assert!(!rule.evaluate(&context(17, "user")).await.unwrap());
    }

    #[tokio::test]
    async fn test_adult_without_permission_fails() {
        let rule = has_permission(directory(), "admin");
        assert!(!rule.evaluate(&context(30, "user")).await.unwrap());
    }

    #[tokio::test]
    async fn test_minor_skips_permission_lookup() {
        let mut lookup = MockPermissionLookup::new();
        lookup.expect_permissions().never();

        let rule = all([is_over_18(), has_permission(Arc::new(lookup), "admin")]);
        assert!(!rule.evaluate(&context(17, "admin")).await.unwrap());
    }
}
