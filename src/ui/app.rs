//! Main TUI application state and logic

use crate::layout::TimelineLayout;
use crate::snapshot::Timeline;
use crate::ui::panes::heap::COLUMN_WIDTH;
use crate::ui::panes::{self, HeapRenderData, HeapScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Heap,
    Log,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Heap => FocusedPane::Log,
            FocusedPane::Log => FocusedPane::Heap,
        }
    }
}

/// The main application state
pub struct App {
    pub timeline: Timeline,
    pub layout: TimelineLayout,

    /// Index of the snapshot on screen
    pub position: usize,

    pub focused_pane: FocusedPane,
    pub heap_scroll: HeapScrollState,
    pub log_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    /// `layout` must have been computed from `timeline`.
    pub fn new(timeline: Timeline, layout: TimelineLayout) -> Self {
        App {
            timeline,
            layout,
            position: 0,
            focused_pane: FocusedPane::Heap,
            heap_scroll: HeapScrollState::default(),
            log_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_secs(1) {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so auto-play keeps ticking
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(8),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let Some(snapshot) = self.timeline.get(self.position) else {
            return;
        };
        let rows = self
            .layout
            .snapshots
            .get(self.position)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        panes::render_heap_pane(
            frame,
            main_chunks[0],
            HeapRenderData {
                grid: self.layout.boundaries.as_slice(),
                snapshot,
                rows,
            },
            self.focused_pane == FocusedPane::Heap,
            &mut self.heap_scroll,
        );

        panes::render_log_pane(
            frame,
            main_chunks[1],
            snapshot,
            self.focused_pane == FocusedPane::Log,
            &mut self.log_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[2],
            &self.status_message,
            self.position,
            self.timeline.len(),
            snapshot.has_errors(),
            self.is_playing,
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1);
                let mut stepped = 0;
                for _ in 0..n {
                    if !self.step_forward() {
                        break;
                    }
                    stepped += 1;
                }
                self.status_message = format!("Stepped forward {} step(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first snapshot".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already at the last snapshot".to_string()
                };
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Heap => {
                    self.heap_scroll.line = self.heap_scroll.line.saturating_sub(1);
                }
                FocusedPane::Log => {
                    self.log_scroll = self.log_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Heap => {
                    self.heap_scroll.line = self.heap_scroll.line.saturating_add(1);
                }
                FocusedPane::Log => {
                    self.log_scroll = self.log_scroll.saturating_add(1);
                }
            },
            KeyCode::Char('h') => {
                self.heap_scroll.column = self.heap_scroll.column.saturating_sub(COLUMN_WIDTH);
            }
            KeyCode::Char('l') => {
                self.heap_scroll.column = self.heap_scroll.column.saturating_add(COLUMN_WIDTH);
            }
            KeyCode::Char(' ') => {
                // 200ms debounce against key repeat
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(Duration::from_secs(1))
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.position = self.timeline.len().saturating_sub(1);
                self.log_scroll = 0;
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.position = 0;
                self.log_scroll = 0;
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    /// Move to the next snapshot; false at the end of the timeline.
    pub fn step_forward(&mut self) -> bool {
        if self.position + 1 >= self.timeline.len() {
            return false;
        }
        self.position += 1;
        self.log_scroll = 0;
        true
    }

    /// Move to the previous snapshot; false at the start.
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position -= 1;
        self.log_scroll = 0;
        true
    }
}
