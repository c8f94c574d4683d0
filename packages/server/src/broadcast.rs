//! Broadcast engine: fans one message out to every registered session.

use idobata_shared::message::ChatMessage;

use crate::controller::ServerState;
use crate::domain::stamp_body;
use crate::registry::SessionCommand;

/// Relay a message to every session currently in the registry.
///
/// The sender's nickname is resolved through the registry; an unresolvable
/// id means the sender is already gone and the message is dropped silently.
/// A banned sender's message is suppressed entirely: the session layer
/// already filters banned text, but server-generated notices reach this
/// point without passing through that check, so the ban is enforced here
/// as well.
///
/// Each recipient gets a copy whose body is stamped as
/// `"<nickname> <HH:MM>: <body>"`; `sender_id` and `kind` are preserved.
/// Delivery failure to one recipient removes that recipient from the
/// registry but never aborts delivery to the rest.
pub async fn broadcast(state: &ServerState, message: &ChatMessage) {
    fan_out(state, message, None).await;
}

/// Relay a message to every session except the one with `excluded_id`.
///
/// Used for notices the excluded session must not see, such as its own
/// join announcement.
pub async fn broadcast_except(state: &ServerState, message: &ChatMessage, excluded_id: i32) {
    fan_out(state, message, Some(excluded_id)).await;
}

async fn fan_out(state: &ServerState, message: &ChatMessage, excluded_id: Option<i32>) {
    let Some(nickname) = state.registry.lock().await.nickname(message.sender_id) else {
        tracing::debug!(
            "dropping broadcast from unknown sender id {}",
            message.sender_id
        );
        return;
    };

    if state.moderation.lock().await.is_banned(&nickname) {
        tracing::debug!("suppressing broadcast from banned user '{nickname}'");
        return;
    }

    let stamped = stamp_body(&nickname, &state.clock.wall_time(), &message.body);

    // Fan out over a snapshot so a session disconnecting mid-broadcast
    // cannot invalidate the iteration.
    let handles = state.registry.lock().await.handles();
    let mut unreachable = Vec::new();
    for handle in handles {
        if excluded_id == Some(handle.id) {
            continue;
        }
        let copy = ChatMessage::new(message.sender_id, message.kind, stamped.clone());
        if handle.tx.send(SessionCommand::Deliver(copy)).is_err() {
            unreachable.push((handle.id, handle.nickname));
        }
    }

    if !unreachable.is_empty() {
        let mut registry = state.registry.lock().await;
        for (id, nickname) in unreachable {
            if registry.remove_by_id(id).is_some() {
                tracing::warn!("removed unreachable session '{nickname}' (id {id})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use idobata_shared::message::MessageKind;
    use idobata_shared::time::FixedClock;

    use crate::registry::ClientHandle;

    fn test_state() -> ServerState {
        ServerState::new(Arc::new(FixedClock::new("12:30")))
    }

    async fn register(
        state: &ServerState,
        id: i32,
        nickname: &str,
    ) -> mpsc::UnboundedReceiver<SessionCommand> {
        let (tx, rx) = mpsc::unbounded_channel();
        state
            .registry
            .lock()
            .await
            .try_insert(ClientHandle {
                id,
                nickname: nickname.to_string(),
                tx,
            })
            .unwrap();
        rx
    }

    fn expect_delivery(rx: &mut mpsc::UnboundedReceiver<SessionCommand>) -> ChatMessage {
        match rx.try_recv() {
            Ok(SessionCommand::Deliver(msg)) => msg,
            other => panic!("expected delivery, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_broadcast_stamps_and_reaches_every_session() {
        // テスト項目: 全セッションに送信者名・時刻つきの本文が届く
        // given (前提条件):
        let state = test_state();
        let mut alice_rx = register(&state, 1, "alice").await;
        let mut bob_rx = register(&state, 2, "bob").await;

        // when (操作):
        broadcast(&state, &ChatMessage::text(1, "hi")).await;

        // then (期待する結果): 送信者自身を含む全員に届く
        let to_alice = expect_delivery(&mut alice_rx);
        let to_bob = expect_delivery(&mut bob_rx);
        assert_eq!(to_alice.body, "alice 12:30: hi");
        assert_eq!(to_bob.body, "alice 12:30: hi");
        assert_eq!(to_bob.sender_id, 1);
        assert_eq!(to_bob.kind, MessageKind::Text);
    }

    #[tokio::test]
    async fn test_broadcast_except_skips_the_excluded_session() {
        // テスト項目: 除外された受信者には届かず、他の受信者には届く
        // given (前提条件):
        let state = test_state();
        let mut alice_rx = register(&state, 1, "alice").await;
        let mut bob_rx = register(&state, 2, "bob").await;

        // when (操作): bob (id 2) を除外して配信する
        broadcast_except(&state, &ChatMessage::text(2, "bob has joined the chat"), 2).await;

        // then (期待する結果): alice には届き、bob 自身には届かない
        assert_eq!(
            expect_delivery(&mut alice_rx).body,
            "bob 12:30: bob has joined the chat"
        );
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_from_unknown_sender_is_dropped() {
        // テスト項目: 送信者 ID を解決できないメッセージは誰にも届かない
        // given (前提条件):
        let state = test_state();
        let mut bob_rx = register(&state, 2, "bob").await;

        // when (操作): 登録されていない ID 99 から送信する
        broadcast(&state, &ChatMessage::text(99, "ghost")).await;

        // then (期待する結果):
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_banned_sender_is_suppressed() {
        // テスト項目: ban 中の送信者のメッセージは誰にも配信されない
        // given (前提条件):
        let state = test_state();
        let mut carol_rx = register(&state, 1, "carol").await;
        let mut bob_rx = register(&state, 2, "bob").await;
        state.moderation.lock().await.set_banned("carol", true);

        // when (操作):
        broadcast(&state, &ChatMessage::text(1, "can you hear me?")).await;

        // then (期待する結果): 誰にも届かない
        assert!(carol_rx.try_recv().is_err());
        assert!(bob_rx.try_recv().is_err());

        // when (操作): unban 後は再び配信される
        state.moderation.lock().await.set_banned("carol", false);
        broadcast(&state, &ChatMessage::text(1, "back")).await;

        // then (期待する結果):
        assert_eq!(expect_delivery(&mut bob_rx).body, "carol 12:30: back");
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_abort_fanout() {
        // テスト項目: 1 受信者への配信失敗が他の受信者への配信を妨げない
        // given (前提条件):
        let state = test_state();
        let mut alice_rx = register(&state, 1, "alice").await;
        let bob_rx = register(&state, 2, "bob").await;
        let mut carol_rx = register(&state, 3, "carol").await;

        // bob の接続は既に壊れている（受信側が閉じられている）
        drop(bob_rx);

        // when (操作):
        broadcast(&state, &ChatMessage::text(1, "hello")).await;

        // then (期待する結果): 他の受信者には届き、bob はレジストリから外される
        assert_eq!(expect_delivery(&mut alice_rx).body, "alice 12:30: hello");
        assert_eq!(expect_delivery(&mut carol_rx).body, "alice 12:30: hello");
        let registry = state.registry.lock().await;
        assert!(!registry.contains("bob"));
        assert_eq!(registry.len(), 2);
    }
}
