//! Access policies gating who may open the panel.

use keel_core::{AccessPolicy, ViewerId};
use serde::{Deserialize, Serialize};

/// Privilege level of a viewer. Levels are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthLevel {
    #[default]
    Player,
    Moderator,
    Owner,
}

/// Grants access to viewers at or above a minimum level.
///
/// The viewer's level comes from a host-supplied lookup.
pub struct LevelPolicy<F> {
    minimum: AuthLevel,
    level_of: F,
}

impl<F> LevelPolicy<F>
where
    F: Fn(ViewerId) -> AuthLevel + Send + Sync,
{
    pub fn new(minimum: AuthLevel, level_of: F) -> Self {
        LevelPolicy { minimum, level_of }
    }
}

impl<F> AccessPolicy for LevelPolicy<F>
where
    F: Fn(ViewerId) -> AuthLevel + Send + Sync,
{
    fn can_access(&self, viewer: ViewerId) -> bool {
        (self.level_of)(viewer) >= self.minimum
    }
}

/// Lets every viewer in.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn can_access(&self, _viewer: ViewerId) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(AuthLevel::Owner > AuthLevel::Moderator);
        assert!(AuthLevel::Moderator > AuthLevel::Player);
    }

    #[test]
    fn test_level_policy() {
        let policy = LevelPolicy::new(AuthLevel::Moderator, |viewer: ViewerId| match viewer {
            1 => AuthLevel::Owner,
            2 => AuthLevel::Moderator,
            _ => AuthLevel::Player,
        });
        assert!(policy.can_access(1));
        assert!(policy.can_access(2));
        assert!(!policy.can_access(3));
    }

    #[test]
    fn test_player_minimum_admits_everyone() {
        let policy = LevelPolicy::new(AuthLevel::Player, |_: ViewerId| AuthLevel::Player);
        assert!(policy.can_access(99));
    }

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.can_access(0));
    }

    #[test]
    fn test_auth_level_serde() {
        let json = serde_json::to_string(&AuthLevel::Owner).unwrap();
        assert_eq!(json, "\"owner\"");
        let level: AuthLevel = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(level, AuthLevel::Moderator);
    }
}
