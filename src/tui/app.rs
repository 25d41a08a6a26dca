//! Main application logic for the terminal user interface.
//!
//! `App` is a small state machine over a borrowed [`TaskStore`]. Every key
//! event is dispatched on the current [`Mode`], applied to the store, and the
//! screen is redrawn from [`App::view_lines`]. The store is saved when the user
//! quits, and after every change when autosave is on.
//!
//! Cursor invariant: `cursor == 0` on an empty list, otherwise
//! `cursor < store.len()`. It is re-clamped after every structural change.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info, trace};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use crate::banner::{banner_lines, banner_width};
use crate::error::StoreError;
use crate::store::{TaskStore, Toggle};
use crate::tui::{
    colors::{DARK_GREEN, DARK_PURPLE, GOLD},
    enums::Mode,
    input::InputField,
    utils::centered_rect,
};

pub const HEADER: &str = "Todo List";
pub const EMPTY_MESSAGE: &str = "The list is empty, press 'o' to add a task";
pub const FOOTER: &str =
    "j/k move  space select  x done  o add  e edit  d delete  q quit";

const CURSOR_MARKER: &str = "> ";
const NO_CURSOR: &str = "  ";
const INPUT_CURSOR: char = '_';
/// Selection marks. `[x]` stays reserved for done tasks in the menu and `list`.
const SELECTED: &str = "[*]";
const UNSELECTED: &str = "[ ]";

/// Interactive task screen.
pub struct App<'a> {
    store: &'a mut TaskStore,
    mode: Mode,
    cursor: usize,
    input: InputField,
    show_banner: bool,
    status_message: String,
    autosave: bool,
}

impl<'a> App<'a> {
    /// Create the app in `Navigating` mode with the cursor on the first task.
    pub fn new(store: &'a mut TaskStore, autosave: bool) -> Self {
        App {
            store,
            mode: Mode::Navigating,
            cursor: 0,
            input: InputField::new(),
            show_banner: false,
            status_message: String::new(),
            autosave,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn input(&self) -> &str {
        &self.input.value
    }

    pub fn store(&self) -> &TaskStore {
        &*self.store
    }

    pub fn banner_visible(&self) -> bool {
        self.show_banner
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn clamp_cursor(&mut self) {
        self.cursor = match self.store.len() {
            0 => 0,
            len => self.cursor.min(len - 1),
        };
    }

    /// Save after a change when autosave is on.
    fn changed(&mut self) -> Result<(), StoreError> {
        if self.autosave {
            self.store.save()?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Navigating
    // ---------------------------------------------------------------------

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.store.len() {
            self.cursor += 1;
        }
    }

    pub fn move_first(&mut self) {
        self.cursor = 0;
    }

    pub fn move_last(&mut self) {
        self.cursor = self.store.len().saturating_sub(1);
    }

    /// Mark or unmark the task under the cursor. No-op on an empty list.
    pub fn toggle_select(&mut self) -> Result<(), StoreError> {
        if self.store.is_empty() {
            return Ok(());
        }
        self.store.toggle_selected(self.cursor)?;
        self.changed()
    }

    /// Flip the completion flag of the task under the cursor.
    pub fn toggle_done(&mut self) -> Result<(), StoreError> {
        if self.store.is_empty() {
            return Ok(());
        }
        match self.store.toggle_done(self.cursor)? {
            Toggle::AllDone => {
                info!("All {} task(s) done", self.store.len());
                self.show_banner = true;
            }
            Toggle::Completed => self.set_status_message("Marked task as complete"),
            Toggle::Reopened => self.set_status_message("Marked task as incomplete"),
        }
        self.changed()
    }

    /// Remove the task under the cursor and keep the cursor in range.
    pub fn delete_current(&mut self) -> Result<(), StoreError> {
        if self.store.is_empty() {
            return Ok(());
        }
        let removed = self.store.remove(self.cursor)?;
        self.cursor = self.cursor.saturating_sub(1);
        self.clamp_cursor();
        self.set_status_message(format!("Deleted \"{}\"", removed.name));
        self.changed()
    }

    /// Start composing a new task with an empty buffer.
    pub fn begin_add(&mut self) {
        if self.mode != Mode::AddingTask {
            self.input.clear();
            self.mode = Mode::AddingTask;
        }
    }

    /// Start renaming the task under the cursor. No-op on an empty list.
    pub fn begin_edit(&mut self) {
        if let Some(task) = self.store.get(self.cursor) {
            self.input = InputField::with_value(&task.name);
            self.mode = Mode::EditingTask;
        }
    }

    // ---------------------------------------------------------------------
    // Adding / editing
    // ---------------------------------------------------------------------

    /// Commit the input buffer. A blank buffer keeps the current mode.
    pub fn confirm_input(&mut self) -> Result<(), StoreError> {
        if self.input.is_blank() {
            self.set_status_message("Task name cannot be empty");
            return Ok(());
        }
        match self.mode {
            Mode::AddingTask => {
                self.cursor = self.store.add(&self.input.value)?;
            }
            Mode::EditingTask => {
                self.store.rename(self.cursor, &self.input.value)?;
            }
            Mode::Navigating => return Ok(()),
        }
        self.input.clear();
        self.mode = Mode::Navigating;
        self.changed()
    }

    /// Leave add/edit mode without touching the list.
    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.mode = Mode::Navigating;
    }

    /// Save and report that the app should exit.
    pub fn quit(&mut self) -> Result<bool, StoreError> {
        info!("Saving {} task(s) and quitting", self.store.len());
        self.store.save()?;
        Ok(true)
    }

    // ---------------------------------------------------------------------
    // Key dispatch
    // ---------------------------------------------------------------------

    /// Apply one key event.
    ///
    /// Returns true if the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool, StoreError> {
        if key.kind != KeyEventKind::Press {
            return Ok(false);
        }
        trace!("Key {:?} with {:?} in {:?}", key.code, key.modifiers, self.mode);

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.quit();
        }

        self.status_message.clear();

        if self.show_banner {
            self.show_banner = false;
            return Ok(false);
        }

        match self.mode {
            Mode::Navigating => self.handle_navigate_input(key.code),
            Mode::AddingTask | Mode::EditingTask => self.handle_text_input(key.code),
        }
    }

    /// Keys while browsing the list.
    fn handle_navigate_input(&mut self, key: KeyCode) -> Result<bool, StoreError> {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return self.quit(),
            KeyCode::Up | KeyCode::Char('k') => self.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(),
            KeyCode::Home | KeyCode::Char('g') => self.move_first(),
            KeyCode::End | KeyCode::Char('G') => self.move_last(),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_select()?,
            KeyCode::Char('x') => self.toggle_done()?,
            KeyCode::Char('o') => self.begin_add(),
            KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('d') => self.delete_current()?,
            _ => {}
        }
        Ok(false)
    }

    /// Keys while typing a task name.
    fn handle_text_input(&mut self, key: KeyCode) -> Result<bool, StoreError> {
        match key {
            KeyCode::Esc => self.cancel_input(),
            KeyCode::Enter => self.confirm_input()?,
            KeyCode::Backspace => self.input.handle_backspace(),
            KeyCode::Delete => self.input.handle_delete(),
            KeyCode::Left => self.input.move_cursor_left(),
            KeyCode::Right => self.input.move_cursor_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Char(c) => self.input.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// The screen as styled lines: header, one line per task (or the empty
    /// message), the input line while adding or editing, and the footer.
    pub fn view_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(HEADER, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
        ];

        if self.store.is_empty() {
            lines.push(Line::from(Span::styled(
                EMPTY_MESSAGE,
                Style::default().fg(Color::DarkGray),
            )));
        }

        for (i, task) in self.store.tasks().iter().enumerate() {
            let marker = if i == self.cursor { CURSOR_MARKER } else { NO_CURSOR };
            let check = if self.store.is_selected(i) { SELECTED } else { UNSELECTED };

            let mut name_style = Style::default();
            if task.is_done {
                name_style = name_style.fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            }
            if i == self.cursor && self.mode == Mode::Navigating {
                name_style = name_style.add_modifier(Modifier::BOLD);
            }

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::raw(format!("{check} ")),
                Span::styled(task.name.clone(), name_style),
            ];
            if task.is_done {
                spans.push(Span::styled(" (done)", Style::default().fg(Color::Green)));
            }
            lines.push(Line::from(spans));
        }

        if let Some(prompt) = self.mode.prompt() {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(CURSOR_MARKER, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{prompt}: "), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(self.input.with_cursor_mark(INPUT_CURSOR)),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(FOOTER, Style::default().fg(Color::DarkGray))));
        lines
    }

    /// The screen as plain text, one string per line.
    pub fn view_text(&self) -> Vec<String> {
        self.view_lines()
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    /// Row of the highlighted line inside `view_lines`.
    fn focus_row(&self) -> usize {
        let first_task_row = 2;
        match self.mode {
            Mode::Navigating => first_task_row + self.cursor,
            _ => first_task_row + self.store.len().max(1) + 1,
        }
    }

    fn status_color(&self) -> Color {
        match self.mode {
            Mode::Navigating => Color::Blue,
            Mode::AddingTask => DARK_GREEN,
            Mode::EditingTask => GOLD,
        }
    }

    fn render_tasks(&self, f: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let focus = self.focus_row();
        let scroll = if visible > 0 && focus >= visible { focus + 1 - visible } else { 0 };

        let paragraph = Paragraph::new(self.view_lines())
            .block(Block::default().borders(Borders::ALL))
            .scroll((scroll as u16, 0));
        f.render_widget(paragraph, area);

        if self.mode != Mode::Navigating {
            let prefix = CURSOR_MARKER.chars().count()
                + self.mode.prompt().map_or(0, |p| p.chars().count() + 2);
            let x = area.x + 1 + (prefix + self.input.cursor) as u16;
            let y = area.y + 1 + (focus - scroll) as u16;
            if x < area.right() && y < area.bottom() {
                f.set_cursor_position(Position::new(x, y));
            }
        }
    }

    fn render_banner(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = banner_lines().map(Line::from).collect();
        let width = banner_width() as u16 + 4;
        let height = lines.len() as u16 + 2;
        let area = centered_rect(width, height, area);

        let block = Block::default()
            .title("All done")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_PURPLE).fg(Color::White));

        f.render_widget(Clear, area);
        f.render_widget(Paragraph::new(lines).block(block).alignment(Alignment::Left), area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else {
            format!(
                "{} | {} task(s), {} done, {} selected | {}",
                self.mode.label(),
                self.store.len(),
                self.store.done_count(),
                self.store.selected().len(),
                self.store.path().display()
            )
        };

        let bg = self.status_color();
        let fg = match bg {
            GOLD => Color::Rgb(20, 20, 20),
            _ => Color::White,
        };
        let status = Paragraph::new(status_text)
            .style(Style::default().bg(bg).fg(fg))
            .alignment(Alignment::Left);

        f.render_widget(status, area);
    }

    /// Draw the whole screen.
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_tasks(f, chunks[0]);
        if self.show_banner {
            self.render_banner(f, chunks[0]);
        }
        self.render_status_bar(f, chunks[1]);
    }

    /// Main event loop: draw, block for the next key, apply it.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if let Event::Key(key) = event::read()? {
                debug!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);
                if self.handle_key(key)? {
                    break;
                }
            }
        }
        Ok(())
    }
}
