use std::collections::VecDeque;
use std::mem;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::error::ShelfError;
use crate::shelf::{Bookshelf, Dispatched, Notice};
use crate::view::{Bucket, Projection};

use super::forms::{BookField, BookForm, SearchState};
use super::helpers::{action_keys, card_lines, centered_rect, severity_style, visible_window};

/// Height allocation per book card, borders included.
const CARD_HEIGHT: u16 = 6;
/// Tabs row plus its border.
const HEADER_HEIGHT: u16 = 3;

/// The shelf as the binary wires it: storage picked at runtime.
pub type ShelfHandle = Bookshelf<Box<dyn KeyValueStore>>;

/// Modes scoped to the single shelf screen.
enum Mode {
    Normal,
    Adding(BookForm),
    /// `id` is the editing cursor; leaving this mode clears it.
    Editing {
        id: i64,
        form: BookForm,
    },
    Searching(SearchState),
}

struct ShownNotice {
    notice: Notice,
    shown_at: Instant,
}

/// Central application state shared across the TUI.
pub struct App {
    shelf: ShelfHandle,
    selected: usize,
    mode: Mode,
    notices: VecDeque<ShownNotice>,
    notice_ttl: Duration,
    max_notices: usize,
}

impl App {
    pub fn new(shelf: ShelfHandle, config: &Config) -> Self {
        let mut app = Self {
            shelf,
            selected: 0,
            mode: Mode::Normal,
            notices: VecDeque::new(),
            notice_ttl: config.notice_ttl(),
            max_notices: config.ui.max_notices.max(1),
        };
        app.collect_notices();
        app
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Adding(form) => self.handle_form(code, None, form),
            Mode::Editing { id, form } => self.handle_form(code, Some(id), form),
            Mode::Searching(state) => self.handle_search(code, state),
        };

        self.collect_notices();
        self.clamp_selection();
        Ok(exit)
    }

    /// Fire due timers and expire old notices.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if self.shelf.tick_at(now) > 0 {
            self.clamp_selection();
        }
        let ttl = self.notice_ttl;
        self.notices
            .retain(|shown| now.saturating_duration_since(shown.shown_at) < ttl);
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.shelf.view().is_filtered() {
                    self.shelf.show_all();
                } else {
                    *exit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                let next = self.shelf.view().active().other();
                self.shelf.activate(next);
                self.selected = 0;
            }
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected += 1,
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = usize::MAX,
            KeyCode::Char('a') => return Mode::Adding(BookForm::default()),
            KeyCode::Char('/') => return Mode::Searching(SearchState::default()),
            _ => return self.handle_card_key(code),
        }
        Mode::Normal
    }

    /// Keys not bound to the screen go to the selected card, which decides
    /// which actions it offers.
    fn handle_card_key(&mut self, code: KeyCode) -> Mode {
        let Some(card) = self.shelf.view().active_bucket().cards.get(self.selected) else {
            return Mode::Normal;
        };
        let id = card.id;
        let Some(action) = card
            .actions()
            .into_iter()
            .find(|action| action_keys(*action).contains(&code))
        else {
            return Mode::Normal;
        };

        match self.shelf.dispatch(id, action) {
            Dispatched::Editing(draft) => Mode::Editing {
                id,
                form: BookForm::from_draft(draft),
            },
            _ => Mode::Normal,
        }
    }

    /// Shared by add and edit. `editing` is the cursor; `None` means a new book.
    fn handle_form(&mut self, code: KeyCode, editing: Option<i64>, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                let draft = form.draft();
                let saved = match editing {
                    Some(id) => self.shelf.update(id, &draft).map(|_| ()),
                    None => self.shelf.add(&draft).map(|_| ()),
                };
                match saved {
                    Ok(()) => return Mode::Normal,
                    Err(ShelfError::Validation { field, reason }) => {
                        form.focus(field.into());
                        form.error = Some(reason);
                    }
                    Err(err) => form.error = Some(err.to_string()),
                }
            }
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        match editing {
            Some(id) => Mode::Editing { id, form },
            None => Mode::Adding(form),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Enter => {
                self.shelf.search(&state.query);
                self.selected = 0;
                return Mode::Normal;
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => {}
        }
        Mode::Searching(state)
    }

    fn collect_notices(&mut self) {
        let now = Instant::now();
        for notice in self.shelf.take_notices() {
            self.notices.push_back(ShownNotice {
                notice,
                shown_at: now,
            });
        }
        while self.notices.len() > self.max_notices {
            self.notices.pop_front();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.shelf.view().active_bucket().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = self.footer_height().min(area.height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        self.draw_bucket(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Adding(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::Editing { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let view = self.shelf.view();
        let titles: Vec<Line> = Bucket::ALL
            .iter()
            .map(|bucket| Line::from(format!("{} ({})", bucket, view.bucket(*bucket).len())))
            .collect();

        let mut title = String::from("Bookshelf");
        if let Projection::Filtered {
            keyword,
            match_count,
        } = view.projection()
        {
            title = format!("Bookshelf | search \"{keyword}\": {match_count} match(es)");
        }
        if !self.shelf.is_durable() {
            title.push_str(" | not saved");
        }

        let selected = match view.active() {
            Bucket::Incomplete => 0,
            Bucket::Complete => 1,
        };
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title(title))
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_bucket(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }
        let bucket = self.shelf.view().active_bucket();

        if bucket.is_empty() {
            let text = bucket
                .empty_message
                .clone()
                .unwrap_or_else(|| "Nothing here yet. Press [a] to add a book.".to_string());
            let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let capacity = (area.height / CARD_HEIGHT).max(1) as usize;
        let (start, end) = visible_window(bucket.len(), capacity, self.selected);
        let constraints: Vec<Constraint> = (start..end)
            .map(|_| Constraint::Length(CARD_HEIGHT))
            .collect();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (chunk, index) in rows.iter().zip(start..end) {
            if chunk.height == 0 {
                continue;
            }
            let card = &bucket.cards[index];
            let is_selected = index == self.selected;
            let mut block = Block::default().borders(Borders::ALL);
            if is_selected {
                block = block.style(Style::default().fg(Color::Yellow));
            }
            let paragraph = Paragraph::new(card_lines(card, is_selected))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, *chunk);
        }
    }

    fn footer_height(&self) -> u16 {
        // border + notices + instructions
        1 + self.max_notices as u16 + 1
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = self
            .notices
            .iter()
            .map(|shown| {
                Line::from(Span::styled(
                    shown.notice.message.clone(),
                    severity_style(shown.notice.severity),
                ))
            })
            .collect();
        while lines.len() < self.max_notices {
            lines.push(Line::from(""));
        }
        lines.push(self.footer_instructions());

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let pairs: &[(&'static str, &'static str)] = match &self.mode {
            Mode::Adding(_) | Mode::Editing { .. } => &[
                ("[Tab]", " Next field   "),
                ("[Space]", " Tick finished   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Searching(_) => &[("[Enter]", " Search titles   "), ("[Esc]", " Cancel")],
            Mode::Normal => &[
                ("[Tab]", " Switch   "),
                ("[↑↓]", " Select   "),
                ("[a]", " Add   "),
                ("[/]", " Search   "),
                ("[Esc]", " Clear filter   "),
                ("[q]", " Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = pairs
            .iter()
            .flat_map(|(key, text)| [Span::styled(*key, key_style), Span::raw(*text)])
            .collect();
        Line::from(spans)
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search titles");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = [
            BookField::Title,
            BookField::Author,
            BookField::Year,
            BookField::Finished,
        ]
        .into_iter()
        .map(|field| form.build_line(field))
        .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let prefix = format!("{}: ", form.active.label()).len() as u16;
        let cursor_x = inner.x + prefix + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + form.active.row()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::persistence::PersistenceBridge;

    fn app() -> App {
        let storage: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        let shelf = Bookshelf::open(PersistenceBridge::new(storage)).unwrap();
        App::new(shelf, &Config::default())
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn add_book(app: &mut App, title: &str, year: &str) {
        app.handle_key(KeyCode::Char('a')).unwrap();
        type_text(app, title);
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(app, "Author");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(app, year);
        app.handle_key(KeyCode::Enter).unwrap();
    }

    #[test]
    fn form_submission_adds_book() {
        let mut app = app();
        add_book(&mut app, "Dune", "1965");
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.shelf.books().len(), 1);
        assert_eq!(app.shelf.view().bucket(Bucket::Incomplete).len(), 1);
    }

    #[test]
    fn invalid_form_stays_open_on_offending_field() {
        let mut app = app();
        add_book(&mut app, "Dune", "");
        match &app.mode {
            Mode::Adding(form) => {
                assert_eq!(form.active, BookField::Year);
                assert!(form.error.is_some());
            }
            _ => panic!("form should still be open"),
        }
        assert!(app.shelf.books().is_empty());
    }

    #[test]
    fn edit_keeps_id_and_clears_cursor() {
        let mut app = app();
        add_book(&mut app, "Dune", "1965");
        let id = app.shelf.books()[0].id;

        app.handle_key(KeyCode::Char('e')).unwrap();
        assert!(matches!(app.mode, Mode::Editing { id: editing, .. } if editing == id));
        type_text(&mut app, " Messiah");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.shelf.books()[0].id, id);
        assert_eq!(app.shelf.books()[0].title, "Dune Messiah");
    }

    #[test]
    fn notices_are_capped_and_expire() {
        let mut app = app();
        for n in 0..5 {
            add_book(&mut app, &format!("Book {n}"), "2000");
        }
        assert_eq!(app.notices.len(), 3);
        app.tick_at(Instant::now() + Duration::from_secs(10));
        assert!(app.notices.is_empty());
    }

    #[test]
    fn toggle_moves_selected_card() {
        let mut app = app();
        add_book(&mut app, "Dune", "1965");
        app.handle_key(KeyCode::Char('t')).unwrap();
        assert!(app.shelf.view().bucket(Bucket::Incomplete).is_empty());
        assert_eq!(app.shelf.view().bucket(Bucket::Complete).len(), 1);
    }

    #[test]
    fn delete_key_removes_selected_card_and_unbound_keys_do_nothing() {
        let mut app = app();
        add_book(&mut app, "Dune", "1965");
        add_book(&mut app, "Emma", "1815");

        app.handle_key(KeyCode::Char('x')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.shelf.books().len(), 2);

        app.handle_key(KeyCode::Delete).unwrap();
        assert_eq!(app.shelf.books().len(), 1);
        assert_eq!(app.shelf.books()[0].title, "Emma");
    }

    #[test]
    fn card_keys_on_empty_bucket_are_ignored() {
        let mut app = app();
        app.handle_key(KeyCode::Char('e')).unwrap();
        app.handle_key(KeyCode::Char('d')).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
        assert!(app.shelf.books().is_empty());
    }

    #[test]
    fn escape_clears_filter_before_quitting() {
        let mut app = app();
        add_book(&mut app, "Dune", "1965");
        app.handle_key(KeyCode::Char('/')).unwrap();
        type_text(&mut app, "dune");
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.shelf.view().is_filtered());

        assert!(!app.handle_key(KeyCode::Esc).unwrap());
        assert!(!app.shelf.view().is_filtered());
        assert!(app.handle_key(KeyCode::Esc).unwrap());
    }
}
