//! Access policy for reaction mutations
//!
//! Decides whether a save or delete may touch a channel. The same checks run
//! for both operations; only the reported message id differs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use reaction_common::PolicyConfig;
use reaction_core::{
    Channel, Permissions, PolicySource, RoleAuthority, Snowflake, UserRepository,
};
use tracing::debug;

use super::error::{DenyReason, Operation, ServiceError, ServiceResult};

/// Outcome of a policy evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Turn a denial into the error reported for an operation
    pub fn into_result(self, operation: Operation) -> ServiceResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(ServiceError::forbidden(operation, reason)),
        }
    }
}

/// Access policy evaluator
pub struct AccessPolicy<'a> {
    settings: &'a dyn PolicySource,
    roles: &'a dyn RoleAuthority,
    users: &'a dyn UserRepository,
}

impl<'a> AccessPolicy<'a> {
    pub fn new(
        settings: &'a dyn PolicySource,
        roles: &'a dyn RoleAuthority,
        users: &'a dyn UserRepository,
    ) -> Self {
        Self {
            settings,
            roles,
            users,
        }
    }

    /// Whether mutations in this channel depend on who the actor is
    ///
    /// True only for the default channel while both the license and the
    /// read-only flag are active.
    pub fn requires_actor_check(&self, channel: &Channel) -> bool {
        self.settings.has_license() && self.settings.town_square_read_only() && channel.is_default()
    }

    /// Evaluate a mutation by `user_id` against `channel`
    ///
    /// # Errors
    /// A missing user is `NotFound`; a failing user lookup is `Lookup`. Neither
    /// is a policy denial.
    pub async fn evaluate(
        &self,
        channel: &Channel,
        user_id: Snowflake,
    ) -> ServiceResult<AccessDecision> {
        if channel.is_archived() {
            return Ok(AccessDecision::Deny(DenyReason::ArchivedChannel));
        }

        if self.requires_actor_check(channel) {
            let user = self
                .users
                .find_by_id(user_id)
                .await
                .map_err(ServiceError::Lookup)?
                .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

            if !self.roles.roles_grant(&user.roles, Permissions::MANAGE_SYSTEM) {
                debug!(
                    channel_id = %channel.id,
                    user_id = %user_id,
                    "Default channel is read-only for this user"
                );
                return Ok(AccessDecision::Deny(DenyReason::TownSquareReadOnly));
            }
        }

        Ok(AccessDecision::Allow)
    }
}

/// Policy inputs backed by runtime-switchable flags
#[derive(Debug, Default)]
pub struct SettingsPolicy {
    licensed: AtomicBool,
    town_square_read_only: AtomicBool,
}

impl SettingsPolicy {
    #[must_use]
    pub fn new(licensed: bool, town_square_read_only: bool) -> Self {
        Self {
            licensed: AtomicBool::new(licensed),
            town_square_read_only: AtomicBool::new(town_square_read_only),
        }
    }

    pub fn set_licensed(&self, licensed: bool) {
        self.licensed.store(licensed, Ordering::Relaxed);
    }

    pub fn set_town_square_read_only(&self, read_only: bool) {
        self.town_square_read_only.store(read_only, Ordering::Relaxed);
    }
}

impl From<PolicyConfig> for SettingsPolicy {
    fn from(config: PolicyConfig) -> Self {
        Self::new(config.licensed, config.town_square_read_only)
    }
}

impl PolicySource for SettingsPolicy {
    fn has_license(&self) -> bool {
        self.licensed.load(Ordering::Relaxed)
    }

    fn town_square_read_only(&self) -> bool {
        self.town_square_read_only.load(Ordering::Relaxed)
    }
}

/// Role table resolving role names to permissions
#[derive(Debug, Clone)]
pub struct StaticRoleAuthority {
    roles: HashMap<String, Permissions>,
}

impl StaticRoleAuthority {
    pub const SYSTEM_ADMIN: &'static str = "system_admin";
    pub const SYSTEM_USER: &'static str = "system_user";
    pub const CHANNEL_USER: &'static str = "channel_user";
    pub const CHANNEL_ADMIN: &'static str = "channel_admin";

    /// Empty table; no role grants anything
    #[must_use]
    pub fn empty() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    /// Add or replace a role
    #[must_use]
    pub fn with_role(mut self, name: impl Into<String>, permissions: Permissions) -> Self {
        self.roles.insert(name.into(), permissions);
        self
    }

    /// Permissions of a single role
    pub fn permissions_of(&self, role: &str) -> Permissions {
        self.roles.get(role).copied().unwrap_or_default()
    }
}

impl Default for StaticRoleAuthority {
    fn default() -> Self {
        Self::empty()
            .with_role(Self::SYSTEM_ADMIN, Permissions::ALL)
            .with_role(Self::SYSTEM_USER, Permissions::READ_CHANNEL | Permissions::CREATE_POST)
            .with_role(Self::CHANNEL_USER, Permissions::MEMBER)
            .with_role(
                Self::CHANNEL_ADMIN,
                Permissions::MEMBER
                    | Permissions::REMOVE_OTHERS_REACTIONS
                    | Permissions::MANAGE_CHANNEL,
            )
    }
}

impl RoleAuthority for StaticRoleAuthority {
    fn roles_grant(&self, roles: &[String], permission: Permissions) -> bool {
        Permissions::combine(roles.iter().map(|r| self.permissions_of(r))).has(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reaction_core::{DomainError, RepoResult, User};
    use std::sync::atomic::AtomicUsize;

    struct Users {
        user: Option<User>,
        fail: bool,
        lookups: AtomicUsize,
    }

    impl Users {
        fn with(user: Option<User>) -> Self {
            Self {
                user,
                fail: false,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl UserRepository for Users {
        async fn find_by_id(&self, _id: Snowflake) -> RepoResult<Option<User>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::LookupError("identity service down".to_string()));
            }
            Ok(self.user.clone())
        }
    }

    fn town_square() -> Channel {
        Channel::new(Snowflake::new(10), reaction_core::DEFAULT_CHANNEL_NAME)
    }

    fn member() -> User {
        User::new(Snowflake::new(1), "alice", &["system_user", "channel_user"])
    }

    #[tokio::test]
    async fn test_archived_channel_is_denied_first() {
        let settings = SettingsPolicy::new(true, true);
        let roles = StaticRoleAuthority::default();
        let users = Users::with(Some(member()));
        let policy = AccessPolicy::new(&settings, &roles, &users);

        let mut channel = town_square();
        channel.archive();

        let decision = policy.evaluate(&channel, Snowflake::new(1)).await.unwrap();
        assert_eq!(decision, AccessDecision::Deny(DenyReason::ArchivedChannel));
        assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_flags_gate_the_user_lookup() {
        let roles = StaticRoleAuthority::default();

        for (licensed, read_only) in [(false, false), (false, true), (true, false)] {
            let settings = SettingsPolicy::new(licensed, read_only);
            let users = Users::with(Some(member()));
            let policy = AccessPolicy::new(&settings, &roles, &users);

            let decision = policy.evaluate(&town_square(), Snowflake::new(1)).await.unwrap();
            assert!(decision.is_allowed());
            assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_read_only_town_square() {
        let settings = SettingsPolicy::new(true, true);
        let roles = StaticRoleAuthority::default();

        let users = Users::with(Some(member()));
        let policy = AccessPolicy::new(&settings, &roles, &users);
        let decision = policy.evaluate(&town_square(), Snowflake::new(1)).await.unwrap();
        assert_eq!(decision, AccessDecision::Deny(DenyReason::TownSquareReadOnly));

        let admin = User::new(Snowflake::new(2), "root", &["system_user", "system_admin"]);
        let users = Users::with(Some(admin));
        let policy = AccessPolicy::new(&settings, &roles, &users);
        let decision = policy.evaluate(&town_square(), Snowflake::new(2)).await.unwrap();
        assert!(decision.is_allowed());
    }

    #[tokio::test]
    async fn test_other_channels_skip_the_actor_check() {
        let settings = SettingsPolicy::new(true, true);
        let roles = StaticRoleAuthority::default();
        let users = Users::with(None);
        let policy = AccessPolicy::new(&settings, &roles, &users);

        let channel = Channel::new(Snowflake::new(11), "off-topic");
        assert!(policy.evaluate(&channel, Snowflake::new(1)).await.unwrap().is_allowed());
        assert_eq!(users.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_user_lookup_failures_are_not_denials() {
        let settings = SettingsPolicy::new(true, true);
        let roles = StaticRoleAuthority::default();

        let users = Users::with(None);
        let policy = AccessPolicy::new(&settings, &roles, &users);
        let err = policy.evaluate(&town_square(), Snowflake::new(5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { resource: "User", .. }));

        let users = Users {
            fail: true,
            ..Users::with(None)
        };
        let policy = AccessPolicy::new(&settings, &roles, &users);
        let err = policy.evaluate(&town_square(), Snowflake::new(5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Lookup(DomainError::LookupError(_))));
    }

    #[test]
    fn test_into_result() {
        assert!(AccessDecision::Allow.into_result(Operation::Save).is_ok());
        let err = AccessDecision::Deny(DenyReason::ArchivedChannel)
            .into_result(Operation::Delete)
            .unwrap_err();
        assert_eq!(
            err.message_id(),
            Some("api.reaction.delete.archived_channel.app_error")
        );
    }

    #[test]
    fn test_settings_policy_flags_flip_at_runtime() {
        let settings = SettingsPolicy::from(PolicyConfig::default());
        assert!(!settings.has_license());

        settings.set_licensed(true);
        settings.set_town_square_read_only(true);
        assert!(settings.has_license());
        assert!(settings.town_square_read_only());
    }

    #[test]
    fn test_static_roles() {
        let roles = StaticRoleAuthority::default();
        let names = |r: &[&str]| r.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();

        assert!(roles.roles_grant(&names(&["system_admin"]), Permissions::MANAGE_SYSTEM));
        assert!(!roles.roles_grant(&names(&["system_user", "channel_admin"]), Permissions::MANAGE_SYSTEM));
        assert!(roles.roles_grant(&names(&["channel_user"]), Permissions::ADD_REACTION));
        assert!(!roles.roles_grant(&names(&["unknown_role"]), Permissions::READ_CHANNEL));

        let custom = StaticRoleAuthority::empty().with_role("ops", Permissions::MANAGE_SYSTEM);
        assert!(custom.roles_grant(&names(&["ops"]), Permissions::MANAGE_SYSTEM));
    }
}
