use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info};

use crate::config::SessionSettings;
use crate::metrics::Metrics;
use crate::session::{FinishReason, SessionState, WordView};
use crate::ui::TITLE;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Raw event as delivered by the terminal
#[derive(Clone, Debug)]
pub enum TermEvent {
    Key(KeyEvent),
    Resize,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait KeySource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// A zero timeout turns this into a non-blocking poll.
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TermEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(TermEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(TermEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TermEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TermEvent>) -> Self {
        Self { rx }
    }
}

impl KeySource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TermEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// A keystroke as the session engine sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Separator,
    Delete,
    Printable(char),
    Abort,
    Other,
}

impl From<KeyEvent> for KeyInput {
    fn from(key: KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return KeyInput::Other;
        }

        match key.code {
            KeyCode::Esc => KeyInput::Abort,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                KeyInput::Abort
            }
            KeyCode::Char(_)
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                KeyInput::Other
            }
            KeyCode::Char(' ') => KeyInput::Separator,
            KeyCode::Char(c) if !c.is_control() => KeyInput::Printable(c),
            KeyCode::Backspace => KeyInput::Delete,
            _ => KeyInput::Other,
        }
    }
}

/// Everything the terminal needs to redraw the dynamic regions for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicState {
    pub seconds_remaining: u64,
    pub words: Vec<WordView>,
    pub input: String,
    pub stats: String,
}

impl DynamicState {
    pub fn capture(session: &SessionState, metrics: &Metrics) -> Self {
        Self {
            seconds_remaining: session.seconds_remaining(),
            words: session.word_views(),
            input: session.input_buffer().to_string(),
            stats: metrics.to_string(),
        }
    }
}

/// Final figures handed to the results screen
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub reason: FinishReason,
    pub metrics: Metrics,
}

/// Drawing and input surface the session loop talks to
pub trait TerminalLayer {
    /// Static framing (border, title), drawn once when the session starts.
    fn render_frame(&mut self, title: &str) -> io::Result<()>;
    /// Redraw timer, word list and stats.
    fn render(&mut self, state: &DynamicState) -> io::Result<()>;
    /// Next pending keystroke, without blocking.
    fn poll_key(&mut self) -> io::Result<Option<KeyInput>>;
    fn wait_for_any_key(&mut self) -> io::Result<()>;
    fn render_welcome(&mut self) -> io::Result<()>;
    fn render_results(&mut self, results: &SessionResults) -> io::Result<()>;
}

/// Monotonic time since the session began
pub trait Clock {
    fn elapsed(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    started_at: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Hand-driven clock for tests. Clones share the same reading.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.millis.store(to.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Apply one keystroke to the session. Returns true if the user asked to abort.
pub fn dispatch(session: &mut SessionState, key: KeyInput) -> bool {
    match key {
        KeyInput::Separator => session.submit_word(),
        KeyInput::Delete => session.delete_back(),
        KeyInput::Printable(c) => session.append_char(c),
        KeyInput::Abort => return true,
        KeyInput::Other => {}
    }
    false
}

/// Cooperative polling loop that drives a session to completion
pub struct Runner<C: Clock, T: Ticker> {
    clock: C,
    ticker: T,
    abort: Arc<AtomicBool>,
}

impl<C: Clock, T: Ticker> Runner<C, T> {
    pub fn new(clock: C, ticker: T) -> Self {
        Self {
            clock,
            ticker,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that, once set, makes the loop exit on its next tick.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    /// Run one tick. Returns the finish reason once the session is over.
    pub fn step<L: TerminalLayer>(
        &self,
        session: &mut SessionState,
        term: &mut L,
    ) -> io::Result<Option<FinishReason>> {
        session.set_elapsed(self.clock.elapsed());

        if self.abort.load(Ordering::SeqCst) {
            return Ok(Some(FinishReason::Aborted));
        }
        if let Some(reason) = session.finish_reason() {
            return Ok(Some(reason));
        }

        if let Some(key) = term.poll_key()? {
            if dispatch(session, key) {
                debug!("abort_requested");
                self.abort.store(true, Ordering::SeqCst);
            }
        }

        let metrics = Metrics::from_session(session);
        term.render(&DynamicState::capture(session, &metrics))?;
        Ok(None)
    }

    /// Tick until the session finishes or an abort is requested, sleeping
    /// out the rest of each polling interval.
    pub fn run<L: TerminalLayer>(
        &self,
        session: &mut SessionState,
        term: &mut L,
    ) -> io::Result<SessionResults> {
        info!(
            words = session.words().len(),
            time_limit_secs = session.time_limit().as_secs(),
            "session_started"
        );

        let reason = loop {
            let tick_started = Instant::now();
            if let Some(reason) = self.step(session, term)? {
                break reason;
            }
            thread::sleep(self.ticker.interval().saturating_sub(tick_started.elapsed()));
        };

        let metrics = Metrics::from_session(session);
        info!(
            reason = ?reason,
            words_typed = metrics.words_typed,
            correct_words = metrics.correct_words,
            accuracy = metrics.accuracy_percent,
            wpm = metrics.wpm,
            "session_finished"
        );

        Ok(SessionResults { reason, metrics })
    }
}

/// Welcome screen, one timed session, then the results screen.
/// The clock starts once the welcome screen has been dismissed.
pub fn run_app<L: TerminalLayer>(
    term: &mut L,
    settings: SessionSettings,
) -> io::Result<SessionResults> {
    term.render_welcome()?;
    term.wait_for_any_key()?;

    let mut session = SessionState::new(settings.words, settings.time_limit);
    term.render_frame(TITLE)?;

    let runner = Runner::new(
        MonotonicClock::start(),
        FixedTicker::new(settings.poll_interval),
    );
    let results = runner.run(&mut session, term)?;

    term.render_results(&results)?;
    term.wait_for_any_key()?;
    Ok(results)
}
