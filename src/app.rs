//! The interactive terminal app: a SmartShop host screen with the floating
//! assistant on top.
//!
//! Everything runs on the UI thread except network calls, which are spawned on
//! the tokio runtime and report back through a channel drained every tick.

use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use thiserror::Error;
use tokio::runtime::Handle;

use crate::actions::Action;
use crate::api::{ApiClient, TokenPair};
use crate::auth::{AuthError, AuthSession};
use crate::chat::{BestEffort, ChatBackend, ChatReply, PendingSend, TransportError};
use crate::components::{ChatPanel, Component, HitTarget, PanelView, StatusBar};
use crate::constants::IDENTITY_POLL_MS;
use crate::drivers::OutputDriver;
use crate::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::keybindings::KeyBindings;
use crate::layout::{CellSize, Viewport};
use crate::prefs::{ProductPrefs, SortMode, ViewMode};
use crate::session::IdentityTransition;
use crate::storage::KeyValueStore;
use crate::theme;
use crate::ui::UiFrame;
use crate::widget::ChatWidget;

const SCROLL_STEP: usize = 3;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Terminal size as reported by the output driver:
/// `(columns, rows, pixel_width, pixel_height)`.
pub type WindowSize = (u16, u16, u16, u16);

/// Outcome of work spawned on the runtime.
#[derive(Debug)]
pub enum Completion {
    Reply {
        pending: PendingSend,
        result: Result<ChatReply, TransportError>,
    },
    Login {
        username: String,
        result: Result<TokenPair, TransportError>,
    },
    Reset(BestEffort),
}

/// Commands typed into the input box instead of a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Login { username: String, password: String },
    Logout,
    Unknown(String),
}

impl SlashCommand {
    /// `None` when `input` is an ordinary message.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let rest = input.strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let command = match (name, parts.next(), parts.next(), parts.next()) {
            ("login", Some(username), Some(password), None) => SlashCommand::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("logout", None, _, _) => SlashCommand::Logout,
            _ => SlashCommand::Unknown(input.to_string()),
        };
        Some(command)
    }
}

pub struct App<S> {
    widget: ChatWidget<S>,
    auth: AuthSession<S>,
    prefs: ProductPrefs<S>,
    shown_prefs: (ViewMode, SortMode),
    panel: ChatPanel,
    status: StatusBar,
    keys: KeyBindings,
    cell: CellSize,
    runtime: Handle,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    last_reload: Instant,
    reload_every: Duration,
    login_in_flight: bool,
}

impl<S: KeyValueStore + Clone> App<S> {
    pub fn new(store: S, api: ApiClient, runtime: Handle, size: WindowSize) -> Self {
        let (columns, rows, pixel_width, pixel_height) = size;
        let cell = CellSize::from_window(columns, rows, pixel_width, pixel_height);
        let viewport = Viewport::from_cells(columns, rows, cell);
        let auth = AuthSession::restore(store.clone(), api);
        let widget = ChatWidget::mount(store.clone(), viewport, auth.identity());
        let keys = KeyBindings::default();
        let mut status = StatusBar::new();
        status.set_left("SmartShop");
        status.set_right(key_hints(&keys));
        let prefs = ProductPrefs::new(store);
        let shown_prefs = (prefs.view(), prefs.sort());
        let (tx, rx) = mpsc::channel();
        tracing::info!(
            api = auth.api().base_url(),
            identity = %auth.identity(),
            ?viewport,
            "assistant mounted"
        );
        Self {
            widget,
            auth,
            prefs,
            shown_prefs,
            panel: ChatPanel::new(),
            status,
            keys,
            cell,
            runtime,
            tx,
            rx,
            last_reload: Instant::now(),
            reload_every: Duration::from_millis(IDENTITY_POLL_MS),
            login_in_flight: false,
        }
    }

    pub fn widget(&self) -> &ChatWidget<S> {
        &self.widget
    }

    pub fn auth(&self) -> &AuthSession<S> {
        &self.auth
    }

    /// Product list preferences as last read from storage.
    pub fn product_prefs(&self) -> (ViewMode, SortMode) {
        self.shown_prefs
    }

    pub fn panel(&self) -> &ChatPanel {
        &self.panel
    }

    pub fn status_mut(&mut self) -> &mut StatusBar {
        &mut self.status
    }

    pub fn set_reload_interval(&mut self, every: Duration) {
        self.reload_every = every;
    }

    pub fn resize(&mut self, size: WindowSize) {
        let (columns, rows, pixel_width, pixel_height) = size;
        self.cell = CellSize::from_window(columns, rows, pixel_width, pixel_height);
        self.widget
            .set_viewport(Viewport::from_cells(columns, rows, self.cell));
    }

    // ---- tick ----

    /// Apply finished network work, pick up external session changes and
    /// fire any remote resets the widget asked for.
    pub fn tick(&mut self) {
        while let Ok(done) = self.rx.try_recv() {
            self.complete(done);
        }
        if self.last_reload.elapsed() >= self.reload_every {
            self.last_reload = Instant::now();
            self.shown_prefs = (self.prefs.view(), self.prefs.sort());
            if !self.login_in_flight && self.auth.reload() {
                tracing::debug!("stored session changed outside the widget");
                self.sync_identity();
            }
        }
        self.dispatch_remote_resets();
        if self.widget.take_scroll_request() {
            self.panel.scroll_to_bottom();
        }
    }

    fn complete(&mut self, done: Completion) {
        match done {
            Completion::Reply { pending, result } => {
                self.widget.finish_send(&pending, result);
            }
            Completion::Login { username, result } => {
                self.login_in_flight = false;
                match self.auth.complete_login(&username, result) {
                    Ok(()) => self.status.notify(format!("Signed in as {username}")),
                    Err(err) => self.status.notify(err.to_string()),
                }
                self.sync_identity();
            }
            Completion::Reset(outcome) => outcome.ignore(),
        }
    }

    fn sync_identity(&mut self) {
        let key = self.auth.identity();
        if let IdentityTransition::Changed { .. } = self.widget.observe_identity(key) {
            self.panel.scroll_to_bottom();
        }
    }

    fn dispatch_remote_resets(&mut self) {
        for _ in 0..self.widget.take_remote_resets() {
            let api = self.auth.api().clone();
            let tx = self.tx.clone();
            self.runtime.spawn(async move {
                let outcome = api.reset().await;
                deliver(&tx, Completion::Reset(outcome));
            });
        }
    }

    // ---- input ----

    pub fn handle_event(&mut self, event: &Event) -> ControlFlow {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                ControlFlow::Continue
            }
            Event::Paste(text) => {
                if !self.widget.geometry().minimized {
                    self.widget.input_mut().push_str(text);
                }
                ControlFlow::Continue
            }
            _ => ControlFlow::Continue,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> ControlFlow {
        if key.kind == KeyEventKind::Release {
            return ControlFlow::Continue;
        }
        if let Some(action) = self.keys.action_for_key(key) {
            return self.apply(action);
        }
        if self.widget.geometry().minimized {
            return ControlFlow::Continue;
        }
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.widget.input_mut().push(c);
            }
            KeyCode::Backspace => {
                self.widget.input_mut().pop();
            }
            _ => {}
        }
        ControlFlow::Continue
    }

    pub fn apply(&mut self, action: Action) -> ControlFlow {
        match action {
            Action::Quit => return ControlFlow::Quit,
            Action::Send => self.submit(),
            Action::Newline => {
                if !self.widget.geometry().minimized {
                    self.widget.input_mut().push('\n');
                }
            }
            Action::ToggleOpen => self.widget.toggle(),
            Action::Minimize => self.widget.minimize(),
            Action::Reset => self.reset(),
            Action::Sample(index) => {
                self.widget.open();
                self.widget.use_sample(index);
            }
            Action::ScrollUp => self.panel.scroll_up(SCROLL_STEP),
            Action::ScrollDown => self.panel.scroll_down(SCROLL_STEP),
        }
        ControlFlow::Continue
    }

    fn reset(&mut self) {
        if self.widget.manual_reset() {
            self.panel.scroll_to_bottom();
        } else {
            self.status.notify("Wait for the assistant to answer before resetting.");
        }
    }

    /// The Send control: either a slash command or a chat message.
    pub fn submit(&mut self) {
        if self.widget.geometry().minimized {
            return;
        }
        if let Some(command) = SlashCommand::parse(self.widget.input()) {
            self.widget.set_input("");
            self.run_command(command);
            return;
        }
        let Some(pending) = self.widget.submit_input() else {
            return;
        };
        let api = self.auth.api().clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = api.chat(&pending.text).await;
            deliver(&tx, Completion::Reply { pending, result });
        });
    }

    fn run_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::Login { username, password } => {
                if self.login_in_flight {
                    self.status.notify("A login is already in progress.");
                    return;
                }
                self.login_in_flight = true;
                self.status.notify(format!("Signing in as {username}…"));
                let api = self.auth.api().clone();
                let tx = self.tx.clone();
                self.runtime.spawn(async move {
                    let result = api.login(&username, &password).await;
                    deliver(&tx, Completion::Login { username, result });
                });
            }
            SlashCommand::Logout => {
                // The widget's own reset covers the remote conversation.
                self.auth.sign_out();
                self.status.notify("Signed out");
                self.sync_identity();
            }
            SlashCommand::Unknown(text) => {
                self.status
                    .notify(format!("Unknown command {text}; try /login <user> <password> or /logout"));
            }
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) {
        let (x, y) = self.cell.to_pixels(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.panel.hit_test(mouse.column, mouse.row) {
                    Some(HitTarget::Bubble) => self.widget.open(),
                    Some(HitTarget::Header) => self.widget.start_drag(x, y),
                    Some(HitTarget::ResizeCorner) => {
                        self.widget.start_resize(x, y);
                    }
                    Some(HitTarget::Reset) => self.reset(),
                    Some(HitTarget::Minimize) => self.widget.minimize(),
                    Some(HitTarget::Sample(index)) => {
                        self.widget.use_sample(index);
                    }
                    Some(HitTarget::Send) => self.submit(),
                    Some(HitTarget::Transcript | HitTarget::Input) | None => {}
                }
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                self.widget.pointer_move(x, y);
            }
            MouseEventKind::Up(_) => self.widget.pointer_release(),
            MouseEventKind::ScrollUp => {
                if self.panel.hit_test(mouse.column, mouse.row).is_some() {
                    self.panel.scroll_up(SCROLL_STEP);
                }
            }
            MouseEventKind::ScrollDown => {
                if self.panel.hit_test(mouse.column, mouse.row).is_some() {
                    self.panel.scroll_down(SCROLL_STEP);
                }
            }
            _ => {}
        }
    }

    // ---- drawing ----

    pub fn draw(&mut self, mut frame: UiFrame<'_>) {
        let area = frame.area();
        if area.width == 0 || area.height == 0 {
            return;
        }
        let status_area = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        let host = Rect {
            height: area.height - 1,
            ..area
        };
        self.render_host(&mut frame, host);
        self.status.render(&mut frame, status_area);

        let view = PanelView {
            geometry: self.widget.geometry(),
            cell: self.cell,
            transcript: self.widget.transcript(),
            input: self.widget.input(),
            sending: self.widget.sending(),
            username: self.auth.user(),
            dragging: self.widget.gestures().active(),
        };
        self.panel.render(&mut frame, &view);
    }

    fn render_host(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let heading = Style::default()
            .fg(theme::accent())
            .add_modifier(Modifier::BOLD);
        let muted = Style::default().fg(theme::status_fg());
        let who = match self.auth.user() {
            Some(name) => format!("Signed in as {name}"),
            None => "Browsing as guest".to_string(),
        };
        let lines = vec![
            Line::from(Span::styled("SmartShop", heading)),
            Line::from(Span::styled(who, muted)),
            Line::default(),
            Line::from(format!(
                "Products · view: {} · sort: {}",
                self.shown_prefs.0, self.shown_prefs.1
            )),
            Line::default(),
            Line::from(Span::styled(
                "Open the assistant with the bubble in the corner or Ctrl+O.",
                muted,
            )),
            Line::from(Span::styled(
                "Type /login <user> <password> or /logout in the assistant to switch accounts.",
                muted,
            )),
        ];
        let padded = Rect {
            x: area.x.saturating_add(2),
            y: area.y.saturating_add(1),
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(1),
        };
        frame.render_widget(Paragraph::new(lines), padded);
    }
}

fn key_hints(keys: &KeyBindings) -> String {
    [Action::ToggleOpen, Action::Reset, Action::Quit]
        .into_iter()
        .filter_map(|action| {
            keys.first_combo(action)
                .map(|combo| format!("{combo} {}", hint_label(action)))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn hint_label(action: Action) -> &'static str {
    match action {
        Action::ToggleOpen => "assistant",
        Action::Reset => "reset",
        Action::Quit => "quit",
        _ => "",
    }
}

/// Hand finished work back to the UI thread. The receiver is gone once the
/// app has shut down, so the outcome is logged and dropped.
fn deliver(tx: &mpsc::Sender<Completion>, done: Completion) -> bool {
    match tx.send(done) {
        Ok(()) => true,
        Err(mpsc::SendError(lost)) => {
            tracing::debug!(?lost, "completion arrived after the app closed");
            false
        }
    }
}

/// Take over the terminal and run the assistant until the user quits.
pub fn run<S>(store: S, api: ApiClient, runtime: Handle, tick: Duration) -> Result<(), AppError>
where
    S: KeyValueStore + Clone,
{
    let mut output = ConsoleOutputDriver::new()?;
    let size = output.window_size()?;
    let mut app = App::new(store, api, runtime, size);
    output.enter()?;
    let mut event_loop = EventLoop::new(ConsoleInputDriver::new(), tick);
    let result = event_loop.run(|_, event| {
        match event {
            None => {
                app.tick();
                output.draw(|frame| app.draw(frame))?;
                Ok(ControlFlow::Continue)
            }
            Some(Event::Resize(..)) => {
                app.resize(output.window_size()?);
                Ok(ControlFlow::Continue)
            }
            Some(event) => Ok(app.handle_event(&event)),
        }
    });
    output.exit()?;
    tracing::info!("assistant closed");
    Ok(result?)
}
