//! Moderation table: the set of banned nicknames.
//!
//! Entries persist for the lifetime of the server process: a ban survives
//! the banned user's disconnect and reconnect under the same nickname.

use std::collections::HashMap;

/// Mapping nickname → banned. A nickname absent from the table has never
/// been banned.
#[derive(Debug, Default)]
pub struct ModerationTable {
    banned: HashMap<String, bool>,
}

impl ModerationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a nickname as banned or unbanned.
    ///
    /// Unbanning keeps the entry with `false` rather than removing it,
    /// mirroring how ban state is recorded for the whole server run.
    pub fn set_banned(&mut self, nickname: &str, banned: bool) {
        self.banned.insert(nickname.to_string(), banned);
    }

    /// Whether a nickname is currently banned.
    pub fn is_banned(&self, nickname: &str) -> bool {
        self.banned.get(nickname).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_nickname_is_not_banned() {
        // テスト項目: 一度も ban されていないニックネームは banned ではない
        // given (前提条件):
        let table = ModerationTable::new();

        // when (操作) / then (期待する結果):
        assert!(!table.is_banned("alice"));
    }

    #[test]
    fn test_ban_and_unban() {
        // テスト項目: ban / unban の状態遷移が反映される
        // given (前提条件):
        let mut table = ModerationTable::new();

        // when (操作): ban する
        table.set_banned("carol", true);

        // then (期待する結果):
        assert!(table.is_banned("carol"));

        // when (操作): unban する
        table.set_banned("carol", false);

        // then (期待する結果):
        assert!(!table.is_banned("carol"));
    }

    #[test]
    fn test_ban_is_per_nickname() {
        // テスト項目: ban は対象のニックネームにのみ作用する
        // given (前提条件):
        let mut table = ModerationTable::new();

        // when (操作):
        table.set_banned("carol", true);

        // then (期待する結果):
        assert!(table.is_banned("carol"));
        assert!(!table.is_banned("alice"));
    }
}
