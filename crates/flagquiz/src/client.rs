//! The quiz client: connection, router, reducer and countdowns in one
//! event loop.
//!
//! [`QuizClient`] is a cheap handle to an actor task. The task owns the
//! [`Session`], the [`TimerTable`] and the [`ConnectionManager`] handle,
//! and processes three inputs strictly in arrival order:
//!
//! - **commands** from the handle (user actions, connect, shutdown);
//! - **connection events** (state changes and raw server frames);
//! - **countdown events** (time-up from the timer table).
//!
//! Server frames go through the [`MessageRouter`]; the resulting
//! [`Effect`]s are carried out before the next input is read. The
//! session is published through a `watch` channel after every change and
//! phase changes are reported as [`ClientEvent`]s.

use flagquiz_countdown::{
    Clock, CountdownConfig, CountdownEvent, SystemClock, TimerPurpose, TimerTable,
};
use flagquiz_protocol::{ClientMessage, CountryCode, RoomSettings, UserId};
use flagquiz_room::{Session, Transition, leave_room, submit_answer};
use flagquiz_session::{ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState};
use flagquiz_transport::{Connector, WebSocketConnector};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use crate::collaborators::{
    AudioCues, Level, Notifier, SettingsReader, SilentAudio, StaticSettings, TracingNotifier,
};
use crate::router::{Context, Effect, MessageRouter};
use crate::FlagquizError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a [`QuizClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub connection: ConnectionConfig,
    pub countdown: CountdownConfig,
}

impl ClientConfig {
    /// Creates a config for `url` with default timings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            connection: ConnectionConfig::new(url),
            countdown: CountdownConfig::default(),
        }
    }

    /// Clamps out-of-range values in every section.
    pub fn validated(self) -> Self {
        Self {
            connection: self.connection.validated(),
            countdown: self.countdown.validated(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events and actions
// ---------------------------------------------------------------------------

/// Something subscribers may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The connection state machine moved.
    Connection(ConnectionState),
    /// The game phase changed, or the room was entered or left.
    PhaseChanged(Transition),
    /// A countdown ran out.
    TimeUp(TimerPurpose),
    /// The server closed this session because it was opened elsewhere.
    Superseded,
    /// Reconnection was abandoned.
    ReconnectFailed { attempts: u32 },
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    CreateRoom {
        username: String,
        settings: RoomSettings,
    },
    JoinRoom {
        invite_code: String,
        username: String,
    },
    LeaveRoom,
    StartGame,
    RestartGame,
    StopGame,
    SubmitAnswer(CountryCode),
    UpdateSettings(RoomSettings),
    KickUser(UserId),
}

type Reply<T = ()> = oneshot::Sender<Result<T, FlagquizError>>;

enum Command {
    Connect { reply: Reply },
    Disconnect { reply: Reply },
    Act { action: Action, reply: Reply },
    VisibilityRegained,
    Countdown {
        purpose: TimerPurpose,
        reply: oneshot::Sender<Option<watch::Receiver<u32>>>,
    },
    Shutdown { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`QuizClient`].
///
/// # Example
///
/// ```rust,no_run
/// # async fn run() -> Result<(), flagquiz::FlagquizError> {
/// use flagquiz::prelude::*;
///
/// let (client, mut events) = QuizClient::builder()
///     .url("wss://quiz.example.com/ws")
///     .settings(StaticSettings { sound_effects: false })
///     .build_websocket();
/// client.connect().await?;
/// client.join_room("QZ4K2P", "ana").await?;
/// while let Some(event) = events.recv().await {
///     println!("{event:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct QuizClientBuilder<K: Clock + Clone = SystemClock> {
    config: ClientConfig,
    clock: K,
    router: MessageRouter,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioCues>,
    settings: Box<dyn SettingsReader>,
    command_buffer: usize,
}

impl QuizClientBuilder<SystemClock> {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            clock: SystemClock,
            router: MessageRouter::new(),
            notifier: Box::new(TracingNotifier),
            audio: Box::new(SilentAudio),
            settings: Box::new(StaticSettings::default()),
            command_buffer: 64,
        }
    }
}

impl Default for QuizClientBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clock + Clone> QuizClientBuilder<K> {
    /// Sets the server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.connection.url = url.into();
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the connection and reconnection settings.
    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.config.connection = connection;
        self
    }

    /// Sets the countdown task settings.
    pub fn countdown(mut self, countdown: CountdownConfig) -> Self {
        self.config.countdown = countdown;
        self
    }

    pub fn notifier(mut self, notifier: impl Notifier) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn audio(mut self, audio: impl AudioCues) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn settings(mut self, settings: impl SettingsReader) -> Self {
        self.settings = Box::new(settings);
        self
    }

    /// Uses a custom router, e.g. one with extra handlers registered.
    pub fn router(mut self, router: MessageRouter) -> Self {
        self.router = router;
        self
    }

    /// Uses another wall-clock source for countdowns and default anchors.
    pub fn clock<K2: Clock + Clone>(self, clock: K2) -> QuizClientBuilder<K2> {
        QuizClientBuilder {
            config: self.config,
            clock,
            router: self.router,
            notifier: self.notifier,
            audio: self.audio,
            settings: self.settings,
            command_buffer: self.command_buffer,
        }
    }

    /// Spawns the client over a WebSocket connection.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn build_websocket(self) -> (QuizClient, mpsc::UnboundedReceiver<ClientEvent>) {
        self.build(WebSocketConnector)
    }

    /// Spawns the client over `connector`.
    ///
    /// Must be called from inside a Tokio runtime. The client starts
    /// disconnected; call [`QuizClient::connect`].
    pub fn build<C: Connector>(
        self,
        connector: C,
    ) -> (QuizClient, mpsc::UnboundedReceiver<ClientEvent>) {
        let config = self.config.validated();
        let (connection, conn_events) = ConnectionManager::spawn(connector, config.connection);
        let (timers, timer_events) = TimerTable::new(self.clock.clone(), config.countdown);
        let (cmd_tx, cmd_rx) = mpsc::channel(self.command_buffer);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = watch::channel(Session::new());

        let handle = QuizClient {
            commands: cmd_tx,
            session: session_rx,
            connection: connection.subscribe(),
        };

        let actor = ClientActor {
            connection,
            conn_events,
            commands: cmd_rx,
            router: self.router,
            timers,
            timer_events,
            clock: self.clock,
            session: Session::new(),
            session_tx,
            events: event_tx,
            notifier: self.notifier,
            audio: self.audio,
            settings: self.settings,
            connection_lost: false,
        };
        tokio::spawn(actor.run());

        (handle, event_rx)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to the client event loop. Cheap to clone.
#[derive(Clone)]
pub struct QuizClient {
    commands: mpsc::Sender<Command>,
    session: watch::Receiver<Session>,
    connection: watch::Receiver<ConnectionState>,
}

impl QuizClient {
    pub fn builder() -> QuizClientBuilder {
        QuizClientBuilder::new()
    }

    /// Opens the connection. A no-op unless disconnected.
    pub async fn connect(&self) -> Result<(), FlagquizError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Connect { reply }, rx).await?
    }

    /// Closes the connection cleanly and cancels any pending reconnect.
    pub async fn disconnect(&self) -> Result<(), FlagquizError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Disconnect { reply }, rx).await?
    }

    pub async fn create_room(
        &self,
        username: impl Into<String>,
        settings: RoomSettings,
    ) -> Result<(), FlagquizError> {
        self.act(Action::CreateRoom {
            username: username.into(),
            settings,
        })
        .await
    }

    pub async fn join_room(
        &self,
        invite_code: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<(), FlagquizError> {
        self.act(Action::JoinRoom {
            invite_code: invite_code.into(),
            username: username.into(),
        })
        .await
    }

    /// Tells the server and forgets the room locally.
    pub async fn leave_room(&self) -> Result<(), FlagquizError> {
        self.act(Action::LeaveRoom).await
    }

    pub async fn start_game(&self) -> Result<(), FlagquizError> {
        self.act(Action::StartGame).await
    }

    pub async fn restart_game(&self) -> Result<(), FlagquizError> {
        self.act(Action::RestartGame).await
    }

    pub async fn stop_game(&self) -> Result<(), FlagquizError> {
        self.act(Action::StopGame).await
    }

    /// Locks in an answer for the open question.
    ///
    /// # Errors
    /// Returns [`FlagquizError::Reduce`] if no question is open, an
    /// answer was already given or `answer` is not one of the options.
    /// Returns [`FlagquizError::NotConnected`] while the connection is
    /// down; the answer is not recorded, so it can be retried once
    /// reconnected. Nothing is sent in either case.
    pub async fn submit_answer(&self, answer: CountryCode) -> Result<(), FlagquizError> {
        self.act(Action::SubmitAnswer(answer)).await
    }

    pub async fn update_settings(&self, settings: RoomSettings) -> Result<(), FlagquizError> {
        self.act(Action::UpdateSettings(settings)).await
    }

    pub async fn kick_user(&self, user_id: UserId) -> Result<(), FlagquizError> {
        self.act(Action::KickUser(user_id)).await
    }

    /// Recomputes every running countdown right away, e.g. after the
    /// window was hidden.
    pub async fn visibility_regained(&self) -> Result<(), FlagquizError> {
        self.send(Command::VisibilityRegained).await
    }

    /// Display updates (whole seconds) of the countdown for `purpose`,
    /// if one is running.
    pub async fn countdown(
        &self,
        purpose: TimerPurpose,
    ) -> Result<Option<watch::Receiver<u32>>, FlagquizError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Countdown { purpose, reply }, rx).await
    }

    /// A snapshot of the session.
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// A receiver that observes every session change.
    pub fn subscribe_session(&self) -> watch::Receiver<Session> {
        self.session.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    /// Cancels every countdown, disconnects and stops the event loop.
    pub async fn shutdown(&self) -> Result<(), FlagquizError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Shutdown { reply }, rx).await
    }

    async fn act(&self, action: Action) -> Result<(), FlagquizError> {
        let (reply, rx) = oneshot::channel();
        self.request(Command::Act { action, reply }, rx).await?
    }

    async fn request<T>(
        &self,
        cmd: Command,
        rx: oneshot::Receiver<T>,
    ) -> Result<T, FlagquizError> {
        self.send(cmd).await?;
        rx.await.map_err(|_| FlagquizError::Closed)
    }

    async fn send(&self, cmd: Command) -> Result<(), FlagquizError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| FlagquizError::Closed)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct ClientActor<K: Clock + Clone> {
    connection: ConnectionManager,
    conn_events: mpsc::UnboundedReceiver<ConnectionEvent>,
    commands: mpsc::Receiver<Command>,
    router: MessageRouter,
    timers: TimerTable<K>,
    timer_events: mpsc::UnboundedReceiver<CountdownEvent>,
    clock: K,
    session: Session,
    session_tx: watch::Sender<Session>,
    events: mpsc::UnboundedSender<ClientEvent>,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioCues>,
    settings: Box<dyn SettingsReader>,
    /// Set while recovering from an abnormal close.
    connection_lost: bool,
}

impl<K: Clock + Clone> ClientActor<K> {
    async fn run(mut self) {
        debug!("quiz client started");

        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown { reply }) => {
                        self.commands.close();
                        self.stop().await;
                        let _ = reply.send(());
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                    None => {
                        self.stop().await;
                        break;
                    }
                },
                Some(event) = self.conn_events.recv() => {
                    self.handle_connection_event(event).await;
                }
                Some(done) = self.timer_events.recv() => self.handle_time_up(done),
            }
        }

        debug!("quiz client stopped");
    }

    async fn stop(&mut self) {
        self.timers.cancel_all();
        if let Err(e) = self.connection.shutdown().await {
            debug!(error = %e, "connection manager already stopped");
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => {
                let result = self.connection.connect().await.map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Disconnect { reply } => {
                let result = self.connection.disconnect().await.map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::Act { action, reply } => {
                let result = self.act(action).await;
                let _ = reply.send(result);
            }
            Command::VisibilityRegained => self.timers.visibility_regained(),
            Command::Countdown { purpose, reply } => {
                let _ = reply.send(self.timers.get(purpose).map(|h| h.subscribe()));
            }
            Command::Shutdown { .. } => {}
        }
    }

    async fn act(&mut self, action: Action) -> Result<(), FlagquizError> {
        let message = match action {
            Action::CreateRoom { username, settings } => {
                ClientMessage::CreateRoom { username, settings }
            }
            Action::JoinRoom {
                invite_code,
                username,
            } => ClientMessage::JoinRoom {
                invite_code,
                username,
            },
            Action::LeaveRoom => {
                let transition = leave_room(&mut self.session)?;
                self.timers.cancel_all();
                self.after_change(transition);
                ClientMessage::LeaveRoom {}
            }
            Action::StartGame => ClientMessage::StartGame {},
            Action::RestartGame => ClientMessage::RestartGame {},
            Action::StopGame => ClientMessage::StopGame {},
            Action::SubmitAnswer(answer) => {
                if !self.connection.state().is_connected() {
                    // The manager drops it and raises the offline warning.
                    let question_id = self.session.game().and_then(|g| {
                        g.current_question.as_ref().map(|q| q.question_number)
                    });
                    if let Some(question_id) = question_id {
                        self.connection
                            .send(ClientMessage::SubmitAnswer {
                                answer,
                                question_id,
                            })
                            .await?;
                    }
                    return Err(FlagquizError::NotConnected);
                }
                let question_id = submit_answer(&mut self.session, answer.clone())?;
                self.publish();
                ClientMessage::SubmitAnswer {
                    answer,
                    question_id,
                }
            }
            Action::UpdateSettings(settings) => ClientMessage::UpdateRoomSettings { settings },
            Action::KickUser(user_id) => ClientMessage::KickUser { user_id },
        };
        self.connection.send(message).await?;
        Ok(())
    }

    async fn handle_connection_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::StateChanged(state) => {
                self.on_state_changed(state);
                self.emit(ClientEvent::Connection(state));
            }
            ConnectionEvent::Message(frame) => self.handle_frame(&frame).await,
            ConnectionEvent::Superseded => {
                self.drop_room();
                self.notifier.notify(
                    Level::Warning,
                    "This session was opened somewhere else and has been disconnected",
                );
                self.emit(ClientEvent::Superseded);
            }
            ConnectionEvent::ReconnectFailed { attempts } => {
                self.drop_room();
                self.notifier.notify(
                    Level::Error,
                    &format!("Could not reconnect after {attempts} attempts"),
                );
                self.emit(ClientEvent::ReconnectFailed { attempts });
            }
            ConnectionEvent::SendDropped { kind } => {
                debug!(kind, "action not sent while disconnected");
                self.notifier
                    .notify(Level::Warning, "Not connected. Your action was not sent.");
            }
        }
    }

    /// Tears the room down after a disconnect that will not recover.
    fn drop_room(&mut self) {
        self.timers.cancel_all();
        match leave_room(&mut self.session) {
            Ok(transition) => self.after_change(transition),
            Err(e) => debug!(error = %e, "no room to drop"),
        }
    }

    fn on_state_changed(&mut self, state: ConnectionState) {
        match state {
            ConnectionState::Reconnecting { attempt } => {
                if !self.connection_lost {
                    self.notifier
                        .notify(Level::Warning, "Connection lost. Reconnecting...");
                }
                self.connection_lost = true;
                debug!(attempt, "waiting to reconnect");
            }
            ConnectionState::Connected if self.connection_lost => {
                self.connection_lost = false;
                info!("connection restored");
                self.notifier.notify(Level::Success, "Reconnected");
            }
            ConnectionState::Disconnected => self.connection_lost = false,
            ConnectionState::Connecting | ConnectionState::Connected => {}
        }
    }

    async fn handle_frame(&mut self, frame: &str) {
        let from = self.session.phase();
        let effects = {
            let mut cx = Context {
                session: &mut self.session,
                now_ms: self.clock.now_ms(),
            };
            self.router.dispatch(&mut cx, frame)
        };
        for effect in effects {
            self.apply(effect).await;
        }
        self.after_change(Transition {
            from,
            to: self.session.phase(),
        });
    }

    async fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Notify(level, message) => self.notifier.notify(level, &message),
            Effect::PlayCue(cue) => {
                if self.settings.sound_effects_enabled() {
                    self.audio.play_cue(cue);
                }
            }
            Effect::InstallTimer(purpose, timer) => {
                self.timers.install(purpose, timer);
            }
            Effect::CancelTimer(purpose) => {
                self.timers.cancel(purpose);
            }
            Effect::CancelAllTimers => self.timers.cancel_all(),
            Effect::Send(message) => {
                let kind = message.kind();
                if let Err(e) = self.connection.send(message).await {
                    warn!(kind, error = %e, "reply not sent");
                }
            }
        }
    }

    fn handle_time_up(&mut self, done: CountdownEvent) {
        if self.timers.accept(&done) {
            debug!(purpose = %done.purpose, "time up");
            self.emit(ClientEvent::TimeUp(done.purpose));
        }
    }

    /// Publishes the session and reports a phase change, if any.
    fn after_change(&mut self, transition: Transition) {
        self.publish();
        if transition.changed() {
            self.emit(ClientEvent::PhaseChanged(transition));
        }
    }

    fn publish(&self) {
        self.session_tx.send_if_modified(|published| {
            if *published == self.session {
                return false;
            }
            published.clone_from(&self.session);
            true
        });
    }

    fn emit(&self, event: ClientEvent) {
        let _ = self.events.send(event);
    }
}
