//! Permission flags granted through roles
//!
//! Each flag has a stable string id (`manage_system`, `add_reaction`, ...) that
//! role definitions and permission checks refer to.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Permission flags
    ///
    /// Serialized as a list of permission ids in JSON.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Read posts in a channel
        const READ_CHANNEL            = 1 << 0;
        /// Create posts in a channel
        const CREATE_POST             = 1 << 1;
        /// Add a reaction to a post
        const ADD_REACTION            = 1 << 2;
        /// Remove one's own reaction
        const REMOVE_REACTION         = 1 << 3;
        /// Remove reactions made by other users
        const REMOVE_OTHERS_REACTIONS = 1 << 4;
        /// Manage channel membership and properties
        const MANAGE_CHANNEL          = 1 << 5;
        /// Full system administration, bypasses every other check
        const MANAGE_SYSTEM           = 1 << 6;

        /// Permissions of an ordinary channel member
        const MEMBER = Self::READ_CHANNEL.bits()
            | Self::CREATE_POST.bits()
            | Self::ADD_REACTION.bits()
            | Self::REMOVE_REACTION.bits();

        /// Every permission
        const ALL = Self::MEMBER.bits()
            | Self::REMOVE_OTHERS_REACTIONS.bits()
            | Self::MANAGE_CHANNEL.bits()
            | Self::MANAGE_SYSTEM.bits();
    }
}

/// Permission ids in bit order
const PERMISSION_IDS: [(Permissions, &str); 7] = [
    (Permissions::READ_CHANNEL, "read_channel"),
    (Permissions::CREATE_POST, "create_post"),
    (Permissions::ADD_REACTION, "add_reaction"),
    (Permissions::REMOVE_REACTION, "remove_reaction"),
    (Permissions::REMOVE_OTHERS_REACTIONS, "remove_others_reactions"),
    (Permissions::MANAGE_CHANNEL, "manage_channel"),
    (Permissions::MANAGE_SYSTEM, "manage_system"),
];

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// `MANAGE_SYSTEM` satisfies every check.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::MANAGE_SYSTEM) {
            return true;
        }
        self.contains(permission)
    }

    /// Combine permissions from multiple roles
    pub fn combine<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        roles.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// Look up a single permission by its id
    pub fn from_id(id: &str) -> Option<Self> {
        PERMISSION_IDS
            .iter()
            .find(|(_, name)| *name == id)
            .map(|(perm, _)| *perm)
    }

    /// Ids of every single permission that is set
    pub fn ids(&self) -> Vec<&'static str> {
        PERMISSION_IDS
            .iter()
            .filter(|(perm, _)| self.contains(*perm))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ids().join(" "))
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.ids().serialize(serializer)
    }
}

// Unknown ids are ignored so newer role definitions still load
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = Vec::<String>::deserialize(deserializer)?;
        Ok(Permissions::combine(
            ids.iter().filter_map(|id| Permissions::from_id(id)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_permissions() {
        let member = Permissions::MEMBER;
        assert!(member.has(Permissions::ADD_REACTION));
        assert!(member.has(Permissions::REMOVE_REACTION));
        assert!(!member.has(Permissions::REMOVE_OTHERS_REACTIONS));
        assert!(!member.has(Permissions::MANAGE_SYSTEM));
    }

    #[test]
    fn test_manage_system_bypass() {
        let admin = Permissions::MANAGE_SYSTEM;
        assert!(admin.has(Permissions::REMOVE_OTHERS_REACTIONS));
        assert!(admin.has(Permissions::MANAGE_CHANNEL));
    }

    #[test]
    fn test_from_id() {
        assert_eq!(
            Permissions::from_id("manage_system"),
            Some(Permissions::MANAGE_SYSTEM)
        );
        assert_eq!(Permissions::from_id("fly"), None);
    }

    #[test]
    fn test_ids_follow_bit_order() {
        let perms = Permissions::MANAGE_SYSTEM | Permissions::ADD_REACTION;
        assert_eq!(perms.ids(), vec!["add_reaction", "manage_system"]);
        assert_eq!(perms.to_string(), "add_reaction manage_system");
    }

    #[test]
    fn test_json_roundtrip_skips_unknown() {
        let perms: Permissions =
            serde_json::from_str(r#"["read_channel", "time_travel", "add_reaction"]"#).unwrap();
        assert_eq!(perms, Permissions::READ_CHANNEL | Permissions::ADD_REACTION);

        let json = serde_json::to_string(&perms).unwrap();
        assert_eq!(json, r#"["read_channel","add_reaction"]"#);
    }
}
