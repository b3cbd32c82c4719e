//! User entity - the actor behind a reaction

use crate::value_objects::Snowflake;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    /// Role names, e.g. `system_user`, `system_admin`
    pub roles: Vec<String>,
}

impl User {
    /// Create a new User with the given role names
    pub fn new(id: Snowflake, username: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            id,
            username: username.into(),
            roles: roles.iter().map(|r| (*r).to_string()).collect(),
        }
    }
}
