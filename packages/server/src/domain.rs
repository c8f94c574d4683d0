//! Pure helpers for message dispatch.
//!
//! This module contains pure functions that implement the server's text
//! interpretation rules without side effects, making them easy to test.

/// A recognized in-band moderation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationCommand {
    Ban(String),
    Unban(String),
}

/// Interpret a text body as a moderation command.
///
/// A body is a command only if it tokenizes into exactly two
/// whitespace-separated words and the first word is `ban` or `unban`
/// (case-sensitive). Everything else, including other two-word bodies,
/// is ordinary chat text.
///
/// # Returns
///
/// `Some(command)` with the second word as the target nickname, or `None`
/// for ordinary chat.
pub fn parse_moderation_command(body: &str) -> Option<ModerationCommand> {
    let words: Vec<&str> = body.split_whitespace().collect();
    if words.len() != 2 {
        return None;
    }
    match words[0] {
        "ban" => Some(ModerationCommand::Ban(words[1].to_string())),
        "unban" => Some(ModerationCommand::Unban(words[1].to_string())),
        _ => None,
    }
}

/// Build the relayed form of a message body: `"<nickname> <HH:MM>: <body>"`.
pub fn stamp_body(nickname: &str, stamp: &str, body: &str) -> String {
    format!("{nickname} {stamp}: {body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ban_command() {
        // テスト項目: "ban <nickname>" が Ban コマンドとして解釈される
        // given (前提条件):
        let body = "ban carol";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, Some(ModerationCommand::Ban("carol".to_string())));
    }

    #[test]
    fn test_parse_unban_command() {
        // テスト項目: "unban <nickname>" が Unban コマンドとして解釈される
        // given (前提条件):
        let body = "unban carol";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, Some(ModerationCommand::Unban("carol".to_string())));
    }

    #[test]
    fn test_two_word_chat_is_not_a_command() {
        // テスト項目: コマンドでない 2 語の本文は通常のチャットとして扱われる
        // given (前提条件):
        let body = "hello there";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_command_word_alone_is_not_a_command() {
        // テスト項目: 対象のない "ban" 単体はコマンドではない
        // given (前提条件):
        let body = "ban";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_three_words_are_not_a_command() {
        // テスト項目: 3 語の本文はコマンドではない
        // given (前提条件):
        let body = "ban carol now";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_command_is_case_sensitive() {
        // テスト項目: コマンド語は大文字・小文字を区別する
        // given (前提条件):
        let body = "BAN carol";

        // when (操作):
        let result = parse_moderation_command(body);

        // then (期待する結果):
        assert_eq!(result, None);
    }

    #[test]
    fn test_stamp_body_format() {
        // テスト項目: 配信本文が "<nickname> <HH:MM>: <body>" 形式になる
        // given (前提条件):

        // when (操作):
        let stamped = stamp_body("alice", "12:30", "hi");

        // then (期待する結果):
        assert_eq!(stamped, "alice 12:30: hi");
    }
}
