//! The floating assistant widget: geometry, gestures, conversation and the
//! identity-driven resets, owned by one logical instance.
//!
//! All mutation is synchronous. Network work is split into a `begin_*` step
//! that records intent and a `finish_*` step that applies the outcome, so the
//! UI loop can keep handling pointer events while a request is in flight.

use crate::chat::{
    BestEffort, ChatBackend, ChatReply, Message, PendingSend, SAMPLE_QUESTIONS, Transcript,
    TransportError, reply_message,
};
use crate::layout::floating::Gestures;
use crate::layout::{GeometryState, Viewport};
use crate::session::{IdentityKey, IdentityTransition, SessionContinuity};
use crate::storage::{KeyValueStore, LayoutStore};

#[derive(Debug)]
pub struct ChatWidget<S> {
    layout: LayoutStore<S>,
    geometry: GeometryState,
    viewport: Viewport,
    gestures: Gestures,
    transcript: Transcript,
    session: SessionContinuity,
    identity: IdentityKey,
    input: String,
    sending: bool,
    epoch: u64,
    remote_resets: usize,
}

impl<S: KeyValueStore> ChatWidget<S> {
    /// Restore the persisted layout, clamp it to `viewport`, and greet
    /// `identity`. The first observation never triggers a remote reset.
    pub fn mount(store: S, viewport: Viewport, identity: IdentityKey) -> Self {
        let layout = LayoutStore::new(store);
        let restored = layout.load();
        let mut widget = Self {
            layout,
            geometry: restored,
            viewport,
            gestures: Gestures::new(),
            transcript: Transcript::new(),
            session: SessionContinuity::new(),
            identity: identity.clone(),
            input: String::new(),
            sending: false,
            epoch: 0,
            remote_resets: 0,
        };
        widget.commit(restored.clamped(viewport));
        widget.transcript.set_follow(!widget.geometry.minimized);
        widget.observe_identity(identity);
        widget
    }

    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn gestures(&self) -> &Gestures {
        &self.gestures
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn take_scroll_request(&mut self) -> bool {
        self.transcript.take_scroll_request()
    }

    pub fn identity(&self) -> &IdentityKey {
        &self.identity
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fill the input with one of the canned prompts.
    pub fn use_sample(&mut self, index: usize) -> bool {
        match SAMPLE_QUESTIONS.get(index) {
            Some(question) => {
                self.input = (*question).to_string();
                true
            }
            None => false,
        }
    }

    pub fn sending(&self) -> bool {
        self.sending
    }

    pub fn can_send(&self) -> bool {
        !self.sending && !self.input.trim().is_empty()
    }

    /// Conversation generation; bumped by every reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of best-effort remote reset calls the caller still has to issue.
    pub fn take_remote_resets(&mut self) -> usize {
        std::mem::take(&mut self.remote_resets)
    }

    // ---- identity ----

    pub fn observe_identity(&mut self, key: IdentityKey) -> IdentityTransition {
        let transition = self.session.observe(&key);
        match &transition {
            IdentityTransition::Initialized => {
                self.identity = key;
                self.welcome();
            }
            IdentityTransition::Changed { previous } => {
                tracing::info!(from = %previous, to = %key, "identity changed; resetting assistant");
                self.identity = key;
                self.reset_everything();
            }
            IdentityTransition::Unchanged => {}
        }
        transition
    }

    /// The header "Reset" control: same wipe as an identity change, identity kept.
    /// Ignored while a message is sending.
    pub fn manual_reset(&mut self) -> bool {
        if self.sending {
            return false;
        }
        tracing::info!(identity = %self.identity, "assistant reset requested");
        self.reset_everything();
        true
    }

    fn welcome(&mut self) {
        self.transcript.clear();
        self.transcript.append(Message::assistant(self.identity.welcome()));
    }

    fn reset_everything(&mut self) {
        self.epoch += 1;
        self.remote_resets += 1;
        self.input.clear();
        self.sending = false;
        self.welcome();
        self.reset_layout();
    }

    fn reset_layout(&mut self) {
        self.gestures.release_all();
        self.geometry = self.layout.reset().clamped(self.viewport);
        self.transcript.set_follow(!self.geometry.minimized);
    }

    // ---- sending ----

    /// Append `text` as a user message and mark the widget as sending.
    ///
    /// Returns `None` (and changes nothing) for blank text or while another
    /// message is in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        let text = text.trim();
        if text.is_empty() || self.sending {
            return None;
        }
        self.transcript.append(Message::user(text));
        self.sending = true;
        Some(PendingSend {
            text: text.to_string(),
            epoch: self.epoch,
        })
    }

    /// [`Self::begin_send`] with the input box contents, clearing it on success.
    pub fn submit_input(&mut self) -> Option<PendingSend> {
        let text = self.input.clone();
        let pending = self.begin_send(&text)?;
        self.input.clear();
        Some(pending)
    }

    /// Apply the outcome of a send. Replies belonging to a conversation that
    /// has since been reset are dropped; returns whether the reply was kept.
    pub fn finish_send(
        &mut self,
        pending: &PendingSend,
        result: Result<ChatReply, TransportError>,
    ) -> bool {
        if pending.epoch != self.epoch {
            tracing::debug!(
                sent_in = pending.epoch,
                current = self.epoch,
                "dropping reply from a reset conversation"
            );
            return false;
        }
        if let Err(err) = &result {
            tracing::warn!(%err, "assistant request failed");
        }
        self.transcript.append(reply_message(result));
        self.sending = false;
        true
    }

    // ---- geometry ----

    fn commit(&mut self, next: GeometryState) {
        self.geometry = next.clamped(self.viewport);
        self.layout.save(&self.geometry);
    }

    /// Re-clamp for a new viewport. No-op when the size did not change.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.commit(self.geometry);
    }

    pub fn open(&mut self) {
        if !self.geometry.minimized {
            return;
        }
        self.commit(GeometryState {
            minimized: false,
            ..self.geometry
        });
        self.transcript.set_follow(true);
    }

    pub fn minimize(&mut self) {
        if self.geometry.minimized {
            return;
        }
        self.gestures.end_resize();
        self.commit(GeometryState {
            minimized: true,
            ..self.geometry
        });
        self.transcript.set_follow(false);
    }

    pub fn toggle(&mut self) {
        if self.geometry.minimized {
            self.open();
        } else {
            self.minimize();
        }
    }

    pub fn start_drag(&mut self, x: i32, y: i32) {
        self.gestures.start_drag(x, y, &self.geometry);
    }

    /// The resize handle only exists on the open panel.
    pub fn start_resize(&mut self, x: i32, y: i32) -> bool {
        if self.geometry.minimized {
            return false;
        }
        self.gestures.start_resize(x, y, &self.geometry);
        true
    }

    /// Returns whether the geometry changed.
    pub fn pointer_move(&mut self, x: i32, y: i32) -> bool {
        let Some(next) = self
            .gestures
            .pointer_move(x, y, self.viewport, &self.geometry)
        else {
            return false;
        };
        if next == self.geometry {
            return false;
        }
        self.commit(next);
        true
    }

    pub fn pointer_release(&mut self) {
        self.gestures.release_all();
    }
}

/// Send `text` and wait for the reply. The sending flag is cleared on every
/// path, including transport failure.
pub async fn send<S, B>(widget: &mut ChatWidget<S>, backend: &B, text: &str) -> bool
where
    S: KeyValueStore,
    B: ChatBackend,
{
    let Some(pending) = widget.begin_send(text) else {
        return false;
    };
    let result = backend.chat(&pending.text).await;
    widget.finish_send(&pending, result)
}

/// Observe `key` and fire any remote resets it calls for, ignoring their outcome.
pub async fn observe_identity<S, B>(
    widget: &mut ChatWidget<S>,
    backend: &B,
    key: IdentityKey,
) -> IdentityTransition
where
    S: KeyValueStore,
    B: ChatBackend,
{
    let transition = widget.observe_identity(key);
    dispatch_remote_resets(widget, backend).await;
    transition
}

/// Issue every pending remote reset. Local state has already been reset.
pub async fn dispatch_remote_resets<S, B>(widget: &mut ChatWidget<S>, backend: &B)
where
    S: KeyValueStore,
    B: ChatBackend,
{
    for _ in 0..widget.take_remote_resets() {
        let outcome: BestEffort = backend.reset().await;
        outcome.ignore();
    }
}
