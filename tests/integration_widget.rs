use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use shopchat::chat::{BestEffort, ChatBackend, ChatReply, Role, TransportError};
use shopchat::constants::LAYOUT_KEY;
use shopchat::layout::{GeometryState, Position, Size, Viewport};
use shopchat::session::IdentityKey;
use shopchat::storage::{FileStore, KeyValueStore};
use shopchat::widget::{self, ChatWidget};

const VIEWPORT: Viewport = Viewport::new(1280, 800);

#[derive(Default)]
struct FakeBackend {
    resets: AtomicUsize,
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl ChatBackend for FakeBackend {
    async fn chat(&self, message: &str) -> Result<ChatReply, TransportError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.to_string());
        }
        if self.fail {
            return Err(TransportError::Network("connection refused".into()));
        }
        Ok(ChatReply {
            reply: Some(format!("echo: {message}")),
        })
    }

    async fn reset(&self) -> BestEffort {
        self.resets.fetch_add(1, Ordering::SeqCst);
        BestEffort::failed(TransportError::Network("offline".into()))
    }
}

#[tokio::test]
async fn guest_to_user_resets_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());
    let backend = FakeBackend::default();
    let mut w = ChatWidget::mount(store.clone(), VIEWPORT, IdentityKey::Guest);
    widget::dispatch_remote_resets(&mut w, &backend).await;
    assert_eq!(backend.resets.load(Ordering::SeqCst), 0);

    w.open();
    assert!(widget::send(&mut w, &backend, "hello").await);
    assert_eq!(w.transcript().len(), 3);
    assert!(store.get(LAYOUT_KEY).is_some());

    let alice = IdentityKey::User("alice".into());
    widget::observe_identity(&mut w, &backend, alice.clone()).await;
    widget::observe_identity(&mut w, &backend, alice).await;
    assert_eq!(backend.resets.load(Ordering::SeqCst), 1);
    assert_eq!(w.transcript().len(), 1);
    assert!(w.transcript().messages()[0].content.starts_with("Hi alice!"));
    assert_eq!(*w.geometry(), GeometryState::initial());
    assert!(store.get(LAYOUT_KEY).is_none());
}

#[tokio::test]
async fn transport_failure_clears_sending() {
    let store = shopchat::storage::MemoryStore::new();
    let backend = FakeBackend {
        fail: true,
        ..FakeBackend::default()
    };
    let mut w = ChatWidget::mount(store, VIEWPORT, IdentityKey::Guest);
    assert!(widget::send(&mut w, &backend, "  where is my order  ").await);
    assert!(!w.sending());
    let last = w.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Error: connection refused");
    assert_eq!(
        backend.sent.lock().unwrap().as_slice(),
        ["where is my order".to_string()]
    );
}

#[tokio::test]
async fn blank_messages_never_reach_the_server() {
    let store = shopchat::storage::MemoryStore::new();
    let backend = FakeBackend::default();
    let mut w = ChatWidget::mount(store, VIEWPORT, IdentityKey::Guest);
    assert!(!widget::send(&mut w, &backend, "   ").await);
    assert!(backend.sent.lock().unwrap().is_empty());
    assert_eq!(w.transcript().len(), 1);
}

#[test]
fn layout_survives_remount_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());
    {
        let mut w = ChatWidget::mount(store.clone(), VIEWPORT, IdentityKey::Guest);
        w.open();
        w.start_drag(900, 500);
        w.pointer_move(800, 450);
        w.pointer_release();
        assert!(w.start_resize(700, 300));
        w.pointer_move(650, 250);
        w.pointer_release();
    }
    let reopened = FileStore::in_dir(dir.path());
    let w = ChatWidget::mount(reopened, VIEWPORT, IdentityKey::Guest);
    assert_eq!(
        *w.geometry(),
        GeometryState {
            minimized: false,
            position: Position {
                right: 118,
                bottom: 68
            },
            size: Size {
                width: 470,
                height: 630
            },
        }
    );
}

#[test]
fn corrupt_layout_blob_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());
    store.set(LAYOUT_KEY, "{not json").unwrap();
    let w = ChatWidget::mount(store, VIEWPORT, IdentityKey::Guest);
    assert_eq!(*w.geometry(), GeometryState::initial());
}

#[test]
fn restored_layout_is_clamped_to_a_smaller_screen() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::in_dir(dir.path());
    store
        .set(
            LAYOUT_KEY,
            r#"{"minimized":false,"right":5000,"bottom":-40,"w":2000,"h":100}"#,
        )
        .unwrap();
    let w = ChatWidget::mount(store, Viewport::new(800, 600), IdentityKey::Guest);
    let g = *w.geometry();
    assert_eq!(
        g.size,
        Size {
            width: 776,
            height: 460
        }
    );
    assert_eq!(
        g.position,
        Position {
            right: 14,
            bottom: 10
        }
    );
}
