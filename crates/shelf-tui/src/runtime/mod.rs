//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - Handlers send `UiEvent`s directly to `inbox_tx`
//! - Runtime drains `inbox_rx` each frame to collect results
//! - Cache change notices and socket events arrive the same way
//!
//! Structure:
//! - `mod.rs`: Core runtime (TuiRuntime, event loop, effect dispatch)
//! - `inbox.rs`: Inbox channel types
//! - `handlers.rs`: Effect handler implementations

mod handlers;
mod inbox;

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{UiEventReceiver, UiEventSender};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use shelf_core::AppContext;
use shelf_core::cache::QueryResult;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Target frame rate while something is loading (60fps = ~16ms per frame).
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
/// Longer timeout reduces CPU usage when nothing is happening.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen TUI runtime.
///
/// Owns the terminal, the state and the service context. Terminal state is
/// restored on drop or panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state (split: tui + overlay).
    pub state: AppState,
    ctx: AppContext,
    /// Inbox sender - handlers send events here.
    inbox_tx: UiEventSender,
    /// Inbox receiver - runtime drains this each frame.
    inbox_rx: UiEventReceiver,
    /// Cancels the live notification watcher, if one runs.
    notifications: Option<CancellationToken>,
    /// Last time a Tick event was emitted.
    last_tick: Instant,
    /// Last time a terminal event was received (for fast tick during interaction).
    last_terminal_event: Instant,
}

impl TuiRuntime {
    /// Creates the runtime. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the terminal cannot be set up.
    pub fn new(ctx: AppContext) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();

        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;
        let state = AppState::new(ctx.config.notification_limit());
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        tokio::spawn(handlers::forward_cache_updates(
            ctx.cache.subscribe(),
            inbox_tx.clone(),
        ));

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            ctx,
            inbox_tx,
            inbox_rx,
            notifications: None,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Runs the main event loop until the user quits.
    ///
    /// # Errors
    /// Returns an error if reading input or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;

        let effects = update::start(&mut self.state, self.ctx.session.current());
        self.execute_effects(effects);
        let result = self.event_loop();

        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true; // Start dirty to ensure initial render

        while !self.state.tui.should_quit {
            let mut events = self.collect_events()?;

            // Layout-dependent state sees the current size before anything else.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }

                // Only Tick triggers render - this caps frame rate at tick cadence
                if matches!(&event, UiEvent::Tick) {
                    dirty = true;
                }
                self.dispatch_event(event);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    // ========================================================================
    // Event Collection
    // ========================================================================

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let tick_interval = if self.state.tui.is_busy() || recent_terminal_activity {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        // Block until the next tick only when nothing is waiting.
        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    // ========================================================================
    // Effect Dispatch
    // ========================================================================

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        if !effects.is_empty() {
            self.execute_effects(effects);
        }
    }

    /// Spawns an async effect and sends its result event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::Fetch { query } => {
                let cache = self.ctx.cache.clone();
                self.spawn_effect(move || handlers::fetch_query(cache, query));
            }
            UiEffect::Refetch { query } => {
                let cache = self.ctx.cache.clone();
                self.spawn_effect(move || handlers::refetch_query(cache, query));
            }
            UiEffect::ReadCached { query } => {
                let snapshot = self.ctx.cache.read(&query);
                if snapshot == QueryResult::default() {
                    // Evicted: load it again.
                    self.execute_effect(UiEffect::Fetch { query });
                } else {
                    self.dispatch_event(UiEvent::QueryLoaded {
                        key: query.key(),
                        result: snapshot,
                    });
                }
            }
            UiEffect::Mutate {
                task,
                kind,
                mutation,
            } => {
                let cache = self.ctx.cache.clone();
                self.spawn_effect(move || handlers::run_mutation(cache, task, kind, mutation));
            }
            UiEffect::SetSession { user, token } => {
                self.ctx.session.set_session(user, token);
                self.dispatch_event(UiEvent::SessionChanged(self.ctx.session.current()));
            }
            UiEffect::Logout => {
                self.ctx.logout();
                self.dispatch_event(UiEvent::SessionChanged(None));
            }
            UiEffect::OpenNotifications { user_id } => self.open_notifications(user_id),
            UiEffect::CloseNotifications => self.close_notifications(),
        }
    }

    fn open_notifications(&mut self, user_id: String) {
        self.close_notifications();
        let url = match self.ctx.config.effective_notifications_url() {
            Ok(url) => url,
            Err(error) => {
                self.dispatch_event(UiEvent::NotificationsFailed {
                    error: format!("{error:#}"),
                });
                return;
            }
        };
        let cancel = CancellationToken::new();
        tokio::spawn(handlers::watch_notifications(
            url,
            user_id,
            cancel.clone(),
            self.inbox_tx.clone(),
        ));
        self.notifications = Some(cancel);
    }

    fn close_notifications(&mut self) {
        if let Some(cancel) = self.notifications.take() {
            cancel.cancel();
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.close_notifications();
        let _ = terminal::restore_terminal();
    }
}
