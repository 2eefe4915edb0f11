mod common;

use chrono::Utc;
use common::{wait_for_state, TestApp, TEST_USER_NAME};
use stalk_client::models::{ChatMessage, MessageKind};
use stalk_client::session::protocol::SignalFrame;
use stalk_client::ConnectionState;
use stalk_core::AppError;
use std::time::Duration;

fn remote_message(id: &str, text: &str) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        sender: "Kim Advisor".to_string(),
        text: text.to_string(),
        timestamp: Utc::now(),
        kind: MessageKind::User,
    }
}

#[tokio::test]
async fn send_before_connect_is_not_ready() {
    let app = TestApp::spawn().await;
    let session = app.session().await;
    let chat = session.chat();

    let err = chat.send("hello").await.unwrap_err();
    assert!(matches!(err, AppError::ChannelNotReady));
    assert!(chat.history().await.is_empty());
}

#[tokio::test]
async fn idle_channel_is_not_ready_for_any_text() {
    let app = TestApp::spawn().await;
    let session = app.session().await;
    let chat = session.chat();

    for text in ["", "   ", "hello"] {
        let err = chat.send(text).await.unwrap_err();
        assert!(
            matches!(err, AppError::ChannelNotReady),
            "send({:?}) returned {:?}",
            text,
            err
        );
    }
    assert!(chat.history().await.is_empty());
}

#[tokio::test]
async fn remote_then_local_messages_keep_arrival_order() {
    let mut app = TestApp::spawn().await;
    let (session, mut peer) = app.connected_session(42).await;
    let chat = session.chat();
    let mut appended = chat.subscribe();

    let m1 = remote_message("m1", "Good afternoon, shall we start?");
    assert!(peer.send(SignalFrame::Chat { message: m1.clone() }).await);
    let received = tokio::time::timeout(Duration::from_secs(2), appended.recv())
        .await
        .expect("Timed out waiting for M1")
        .unwrap();
    assert_eq!(received, m1);

    let m2 = chat.send("Yes, please").await.unwrap();
    assert_eq!(m2.kind, MessageKind::User);
    assert_eq!(m2.sender, TEST_USER_NAME);

    let history = chat.history().await;
    assert_eq!(history, vec![m1, m2.clone()]);

    assert_eq!(peer.recv().await, Some(SignalFrame::Chat { message: m2 }));
}

#[tokio::test]
async fn each_send_appends_exactly_one_message() {
    let mut app = TestApp::spawn().await;
    let (session, mut peer) = app.connected_session(42).await;
    let chat = session.chat();

    for (i, text) in ["one", "two", "three"].iter().enumerate() {
        chat.send(text).await.unwrap();
        assert_eq!(chat.history().await.len(), i + 1);
    }

    let texts: Vec<String> = chat.history().await.into_iter().map(|m| m.text).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);

    for expected in ["one", "two", "three"] {
        match peer.recv().await {
            Some(SignalFrame::Chat { message }) => assert_eq!(message.text, expected),
            other => panic!("unexpected frame {:?}", other),
        }
    }
}

#[tokio::test]
async fn participant_notices_become_system_messages() {
    let mut app = TestApp::spawn().await;
    let (session, peer) = app.connected_session(42).await;
    let chat = session.chat();
    let mut appended = chat.subscribe();

    assert!(
        peer.send(SignalFrame::ParticipantJoined {
            name: "Kim Advisor".into()
        })
        .await
    );
    let notice = tokio::time::timeout(Duration::from_secs(2), appended.recv())
        .await
        .expect("Timed out waiting for notice")
        .unwrap();

    assert_eq!(notice.kind, MessageKind::System);
    assert_eq!(notice.text, "Kim Advisor joined the session");
}

#[tokio::test]
async fn send_after_remote_close_is_not_ready() {
    let mut app = TestApp::spawn().await;
    let (session, peer) = app.connected_session(42).await;
    let chat = session.chat();

    peer.close();
    wait_for_state(&session, ConnectionState::Disconnected).await;

    let err = chat.send("still there?").await.unwrap_err();
    assert!(matches!(err, AppError::ChannelNotReady));
    assert!(!chat.is_ready());
}

#[tokio::test]
async fn send_after_leave_is_not_ready() {
    let mut app = TestApp::spawn().await;
    let (session, _peer) = app.connected_session(42).await;
    let chat = session.chat();

    chat.send("bye").await.unwrap();
    session.disconnect().await;

    let err = chat.send("hello again").await.unwrap_err();
    assert!(matches!(err, AppError::ChannelNotReady));
    assert_eq!(chat.history().await.len(), 1, "history survives the session end");
}

#[tokio::test]
async fn blank_messages_are_rejected() {
    let mut app = TestApp::spawn().await;
    let (session, _peer) = app.connected_session(42).await;
    let chat = session.chat();

    let err = chat.send("   ").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(chat.history().await.is_empty());
}
