use std::io;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

use crate::runtime::{
    DynamicState, KeyInput, KeySource, SessionResults, TermEvent, TerminalLayer,
};
use crate::session::{WordStyle, WordView};

pub const TITLE: &str = "wordsprint";

const HORIZONTAL_MARGIN: u16 = 1;
const WAIT_SLICE: Duration = Duration::from_millis(250);

/// What is currently on screen, kept so a resize can redraw it.
#[derive(Debug, Clone)]
enum Screen {
    Blank,
    Welcome,
    Session(Option<DynamicState>),
    Results(SessionResults),
}

/// ratatui-backed terminal layer
pub struct TuiTerminal<B: Backend, E: KeySource> {
    terminal: Terminal<B>,
    events: E,
    title: String,
    screen: Screen,
}

impl<B: Backend, E: KeySource> TuiTerminal<B, E> {
    pub fn new(terminal: Terminal<B>, events: E) -> Self {
        Self {
            terminal,
            events,
            title: TITLE.to_string(),
            screen: Screen::Blank,
        }
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn redraw(&mut self) -> io::Result<()> {
        let title = self.title.as_str();
        let screen = &self.screen;
        self.terminal.draw(|f| match screen {
            Screen::Blank => {}
            Screen::Welcome => draw_welcome(f),
            Screen::Session(state) => {
                let inner = draw_frame(f, title);
                if let Some(state) = state {
                    draw_session(f, inner, state);
                }
            }
            Screen::Results(results) => {
                let inner = draw_frame(f, title);
                draw_results(f, inner, results);
            }
        })?;
        Ok(())
    }
}

impl<B: Backend, E: KeySource> TerminalLayer for TuiTerminal<B, E> {
    fn render_frame(&mut self, title: &str) -> io::Result<()> {
        self.title = title.to_string();
        self.screen = Screen::Session(None);
        self.redraw()
    }

    fn render(&mut self, state: &DynamicState) -> io::Result<()> {
        self.screen = Screen::Session(Some(state.clone()));
        self.redraw()
    }

    fn poll_key(&mut self) -> io::Result<Option<KeyInput>> {
        loop {
            match self.events.recv_timeout(Duration::ZERO) {
                Ok(TermEvent::Key(key)) => return Ok(Some(KeyInput::from(key))),
                Ok(TermEvent::Resize) => self.redraw()?,
                Err(_) => return Ok(None),
            }
        }
    }

    fn wait_for_any_key(&mut self) -> io::Result<()> {
        loop {
            match self.events.recv_timeout(WAIT_SLICE) {
                Ok(TermEvent::Key(key)) if key.kind != KeyEventKind::Release => return Ok(()),
                Ok(TermEvent::Key(_)) | Err(RecvTimeoutError::Timeout) => {}
                Ok(TermEvent::Resize) => self.redraw()?,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }
    }

    fn render_welcome(&mut self) -> io::Result<()> {
        self.screen = Screen::Welcome;
        self.redraw()
    }

    fn render_results(&mut self, results: &SessionResults) -> io::Result<()> {
        self.screen = Screen::Results(results.clone());
        self.redraw()
    }
}

fn draw_frame(f: &mut Frame, title: &str) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let inner = block.inner(f.area());
    f.render_widget(block, f.area());
    inner
}

/// Vertical slot for `lines` rows, centered in `area`.
fn centered_rows(area: Rect, lines: u16) -> Rect {
    let top = area.height.saturating_sub(lines) / 2;
    Rect {
        x: area.x,
        y: area.y + top,
        width: area.width,
        height: lines.min(area.height),
    }
}

fn draw_welcome(f: &mut Frame) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled(format!("Welcome to {TITLE}!"), bold_style)),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to start typing...",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    let area = centered_rows(f.area(), lines.len() as u16);
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn word_style(style: WordStyle) -> Style {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    match style {
        WordStyle::Correct => bold_style.fg(Color::Green),
        WordStyle::Incorrect => bold_style.fg(Color::Red),
        WordStyle::Active => bold_style
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        WordStyle::Pending => Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
    }
}

/// Break words into rows no wider than `width` columns, one space after each
/// word. A word wider than the row gets a row of its own.
pub fn wrap_words(words: &[WordView], width: u16) -> Vec<Vec<&WordView>> {
    let width = width as usize;
    let mut rows: Vec<Vec<&WordView>> = Vec::new();
    let mut row: Vec<&WordView> = Vec::new();
    let mut col = 0;

    for word in words {
        let needed = word.text.width() + 1;
        if !row.is_empty() && col + needed > width {
            rows.push(std::mem::take(&mut row));
            col = 0;
        }
        row.push(word);
        col += needed;
    }
    if !row.is_empty() {
        rows.push(row);
    }
    rows
}

fn draw_session(f: &mut Frame, area: Rect, state: &DynamicState) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // timer
            Constraint::Length(1), // padding
            Constraint::Min(1),    // words
            Constraint::Length(1), // input
            Constraint::Length(1), // stats
        ])
        .split(area);

    let timer = Paragraph::new(Span::styled(
        format!("Time: {:02}s", state.seconds_remaining),
        bold_style,
    ))
    .alignment(Alignment::Right);
    f.render_widget(timer, chunks[0]);

    let lines = wrap_words(&state.words, chunks[2].width)
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .flat_map(|word| {
                        [
                            Span::styled(word.text.clone(), word_style(word.style)),
                            Span::raw(" "),
                        ]
                    })
                    .collect::<Vec<Span>>(),
            )
        })
        .collect::<Vec<Line>>();
    f.render_widget(Paragraph::new(lines), chunks[2]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", dim_style),
        Span::styled(state.input.clone(), bold_style),
    ]));
    f.render_widget(input, chunks[3]);

    let stats = Paragraph::new(Span::styled(state.stats.clone(), bold_style))
        .alignment(Alignment::Center);
    f.render_widget(stats, chunks[4]);
}

fn draw_results(f: &mut Frame, area: Rect, results: &SessionResults) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(results.reason.to_string(), bold_style)),
        Line::from(""),
    ];
    lines.extend(results.metrics.summary_lines().into_iter().map(Line::from));

    let body = centered_rows(area, lines.len() as u16);
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);

    let footer = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: area.height.min(1),
        ..area
    };
    let exit = Paragraph::new(Span::styled(
        "Press any key to exit...",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    f.render_widget(exit, footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::runtime::TestEventSource;
    use crate::session::FinishReason;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn tui(
        width: u16,
        height: u16,
    ) -> (
        TuiTerminal<TestBackend, TestEventSource>,
        mpsc::Sender<TermEvent>,
    ) {
        let (tx, rx) = mpsc::channel();
        let terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        (TuiTerminal::new(terminal, TestEventSource::new(rx)), tx)
    }

    fn screen_text(t: &TuiTerminal<TestBackend, TestEventSource>) -> String {
        let buf = t.terminal().backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn view(text: &str, style: WordStyle) -> WordView {
        WordView {
            text: text.to_string(),
            style,
        }
    }

    #[test]
    fn wrap_words_respects_width() {
        let words = ["the", "quick", "brown", "fox"]
            .map(|w| view(w, WordStyle::Pending))
            .to_vec();
        let rows = wrap_words(&words, 12);
        let texts: Vec<Vec<&str>> = rows
            .iter()
            .map(|r| r.iter().map(|w| w.text.as_str()).collect())
            .collect();
        assert_eq!(texts, vec![vec!["the", "quick"], vec!["brown", "fox"]]);
    }

    #[test]
    fn wrap_words_gives_long_word_its_own_row() {
        let words = vec![
            view("a", WordStyle::Pending),
            view("extraordinarily", WordStyle::Pending),
            view("b", WordStyle::Pending),
        ];
        let rows = wrap_words(&words, 6);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0].text, "extraordinarily");
    }

    #[test]
    fn wrap_words_uses_display_width() {
        let words = vec![view("日本", WordStyle::Pending), view("ab", WordStyle::Pending)];
        // "日本" takes four columns plus a space
        assert_eq!(wrap_words(&words, 7).len(), 2);
        assert_eq!(wrap_words(&words, 8).len(), 1);
    }

    #[test]
    fn session_screen_shows_timer_words_and_stats() {
        let (mut t, _tx) = tui(50, 10);
        t.render_frame(TITLE).unwrap();
        let state = DynamicState {
            seconds_remaining: 7,
            words: vec![
                view("teh", WordStyle::Incorrect),
                view("quick", WordStyle::Active),
                view("brown", WordStyle::Pending),
            ],
            input: "qu".into(),
            stats: "Words: 1 | Accuracy: 0.00% | WPM: 6.00".into(),
        };
        t.render(&state).unwrap();

        let text = screen_text(&t);
        assert!(text.contains(TITLE));
        assert!(text.contains("Time: 07s"));
        assert!(text.contains("teh quick brown"));
        assert!(text.contains("> qu"));
        assert!(text.contains("Words: 1 | Accuracy: 0.00% | WPM: 6.00"));
    }

    #[test]
    fn word_styles_are_colored() {
        let (mut t, _tx) = tui(30, 8);
        let state = DynamicState {
            seconds_remaining: 30,
            words: vec![
                view("ok", WordStyle::Correct),
                view("no", WordStyle::Incorrect),
                view("go", WordStyle::Active),
            ],
            input: String::new(),
            stats: String::new(),
        };
        t.render(&state).unwrap();

        // border + margin puts the first word at column 2, row 3
        let buf = t.terminal().backend().buffer();
        assert_eq!(buf[(2, 3)].symbol(), "o");
        assert_eq!(buf[(2, 3)].fg, Color::Green);
        assert_eq!(buf[(5, 3)].fg, Color::Red);
        assert_eq!(buf[(8, 3)].fg, Color::Blue);
    }

    #[test]
    fn welcome_and_results_screens() {
        let (mut t, _tx) = tui(60, 14);
        t.render_welcome().unwrap();
        let text = screen_text(&t);
        assert!(text.contains("Welcome to wordsprint!"));
        assert!(text.contains("Press any key to start typing..."));

        let results = SessionResults {
            reason: FinishReason::TimeUp,
            metrics: Metrics {
                words_typed: 3,
                correct_words: 2,
                accuracy_percent: 200.0 / 3.0,
                wpm: 6.0,
            },
        };
        t.render_results(&results).unwrap();
        let text = screen_text(&t);
        assert!(text.contains("Time's up!"));
        assert!(text.contains("Words typed: 3"));
        assert!(text.contains("Correct words: 2"));
        assert!(text.contains("Accuracy: 66.67%"));
        assert!(text.contains("Words per minute: 6.00"));
        assert!(text.contains("Press any key to exit..."));
    }

    #[test]
    fn poll_key_skips_resize_and_classifies() {
        let (mut t, tx) = tui(20, 6);
        assert_eq!(t.poll_key().unwrap(), None);

        tx.send(TermEvent::Resize).unwrap();
        tx.send(TermEvent::Key(KeyEvent::new(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
        )))
        .unwrap();
        assert_eq!(t.poll_key().unwrap(), Some(KeyInput::Separator));
        assert_eq!(t.poll_key().unwrap(), None);
    }

    #[test]
    fn wait_for_any_key_returns_on_key_or_disconnect() {
        let (mut t, tx) = tui(20, 6);
        tx.send(TermEvent::Resize).unwrap();
        tx.send(TermEvent::Key(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )))
        .unwrap();
        t.wait_for_any_key().unwrap();

        drop(tx);
        t.wait_for_any_key().unwrap();
    }
}
