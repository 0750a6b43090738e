use std::{
    cmp::min,
    io::{self, Stdout},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::{Alignment, Constraint, CrosstermBackend, Direction, Layout},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Terminal,
};
use tracing::warn;

use crate::error::TodoResult;
use crate::model::TodoListView;
use crate::render::{item_line, list_line};
use crate::service::TodoService;

#[derive(Debug, Copy, Clone)]
enum InputField {
    ListName,
    ItemName,
    ItemText,
}

enum AppState {
    Browse,
    CreateItem,
    CreateList,
    Input(InputField),
}

struct State {
    pub list_name: String,
    pub item_name: String,
    pub item_text: String,
    pub state: AppState,
    pub input: String,
    pub lists_list_state: ListState,
    pub items_list_state: ListState,
    pub selecting_list: bool,
    pub status: Option<String>,
}

impl State {
    fn new() -> Self {
        State {
            list_name: String::new(),
            item_name: String::new(),
            item_text: String::new(),
            state: AppState::Browse,
            input: String::new(),
            lists_list_state: ListState::default(),
            items_list_state: ListState::default(),
            selecting_list: true,
            status: None,
        }
    }

    /// Keeps the outcome of an action visible in the status line.
    fn report<T>(&mut self, result: TodoResult<T>) -> Option<T> {
        match result {
            Ok(value) => {
                self.status = None;
                Some(value)
            }
            Err(err) => {
                warn!(error = %err, "tui action failed");
                self.status = Some(err.to_string());
                None
            }
        }
    }
}

pub fn run(service: &mut TodoService) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, service, State::new());
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(terminal.show_cursor()?)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    service: &mut TodoService,
    mut state: State,
) -> Result<()> {
    loop {
        let lists = service.list_todolists()?;
        if matches!(state.lists_list_state.selected(), Some(i) if i >= lists.len()) {
            state.lists_list_state.select(None);
            state.items_list_state.select(None);
            state.selecting_list = true;
        }
        // a list deleted by another process between the two reads just shows empty
        let current = match state.lists_list_state.selected() {
            Some(index) => service.get_todolist(lists[index].id).ok(),
            None => None,
        };
        let item_count = current.as_ref().map_or(0, |list| list.items.len());
        if matches!(state.items_list_state.selected(), Some(i) if i >= item_count) {
            state.items_list_state.select(item_count.checked_sub(1));
        }

        match state.state {
            AppState::Browse => draw_browse(terminal, &lists, current.as_ref(), &mut state)?,
            AppState::CreateItem => draw_create_item(terminal, &state)?,
            AppState::CreateList => draw_create_list(terminal, &state)?,
            AppState::Input(field) => draw_input(terminal, &state, field)?,
        }

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let key = match event::read()? {
            Event::Key(key) => key,
            _ => continue,
        };

        match state.state {
            AppState::Browse => match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('N') => {
                    if current.is_some() {
                        state.state = AppState::CreateItem
                    }
                }
                KeyCode::Char('L') => state.state = AppState::CreateList,
                KeyCode::Char('D') => match (state.selecting_list, &current) {
                    (true, Some(list)) => {
                        let result = service.delete_todolist(list.id);
                        state.report(result);
                        state.lists_list_state.select(None);
                        state.items_list_state.select(None);
                    }
                    (false, Some(list)) => {
                        if let Some(index) = state.items_list_state.selected() {
                            let result = service.delete_item(list.id, list.items[index].id);
                            state.report(result);
                        }
                    }
                    _ => {}
                },
                KeyCode::Char('j') => match state.selecting_list {
                    true => move_down(&mut state.lists_list_state, lists.len()),
                    false => move_down(&mut state.items_list_state, item_count),
                },
                KeyCode::Char('k') => match state.selecting_list {
                    true => move_up(&mut state.lists_list_state),
                    false => move_up(&mut state.items_list_state),
                },
                KeyCode::Char('h') => {
                    if !state.selecting_list {
                        state.selecting_list = true;
                        state.items_list_state.select(None);
                    }
                }
                KeyCode::Char('l') => match state.selecting_list {
                    true => {
                        if item_count > 0 {
                            state.selecting_list = false;
                            state.items_list_state.select(Some(0));
                        }
                    }
                    false => toggle_item(service, &mut state, current.as_ref()),
                },
                KeyCode::Char(' ') => {
                    if !state.selecting_list {
                        toggle_item(service, &mut state, current.as_ref());
                    }
                }
                _ => {}
            },

            AppState::CreateItem => match key.code {
                KeyCode::Char('q') => state.state = AppState::Browse,
                KeyCode::Char('n') => state.state = AppState::Input(InputField::ItemName),
                KeyCode::Char('t') => state.state = AppState::Input(InputField::ItemText),
                KeyCode::Char('s') => {
                    if let Some(list) = &current {
                        let result = service.create_item(list.id, &state.item_name, &state.item_text);
                        if state.report(result).is_some() {
                            state.item_name.clear();
                            state.item_text.clear();
                        }
                    }
                    state.state = AppState::Browse;
                }
                _ => {}
            },

            AppState::CreateList => match key.code {
                KeyCode::Char('q') => state.state = AppState::Browse,
                KeyCode::Char('n') => state.state = AppState::Input(InputField::ListName),
                KeyCode::Char('s') => {
                    let result = service.create_todolist(&state.list_name);
                    if state.report(result).is_some() {
                        state.list_name.clear();
                    }
                    state.state = AppState::Browse;
                }
                _ => {}
            },

            AppState::Input(field) => match key.code {
                KeyCode::Char(c) => state.input.push(c),
                KeyCode::Backspace => {
                    state.input.pop();
                }
                KeyCode::Esc => {
                    state.input.clear();
                    state.state = AppState::Browse
                }
                KeyCode::Enter => {
                    let value = std::mem::take(&mut state.input);
                    state.state = match field {
                        InputField::ListName => {
                            state.list_name = value;
                            AppState::CreateList
                        }
                        InputField::ItemName => {
                            state.item_name = value;
                            AppState::CreateItem
                        }
                        InputField::ItemText => {
                            state.item_text = value;
                            AppState::CreateItem
                        }
                    };
                }
                _ => {}
            },
        }
    }
}

fn toggle_item(service: &mut TodoService, state: &mut State, current: Option<&TodoListView>) {
    let (list, index) = match (current, state.items_list_state.selected()) {
        (Some(list), Some(index)) => (list, index),
        _ => return,
    };
    let item = &list.items[index];
    let result = service.update_item(list.id, item.id, &item.name, &item.text, Some(!item.is_done));
    state.report(result);
}

fn move_up(list_state: &mut ListState) {
    match list_state.selected() {
        Some(0) => list_state.select(None),
        Some(v) => list_state.select(Some(v - 1)),
        None => list_state.select(Some(0)),
    }
}

fn move_down(list_state: &mut ListState, len: usize) {
    if len == 0 {
        return;
    }
    match list_state.selected() {
        Some(v) => list_state.select(Some(min(v + 1, len - 1))),
        None => list_state.select(Some(0)),
    }
}

fn field_title(field: InputField) -> &'static str {
    match field {
        InputField::ListName => "List name",
        InputField::ItemName => "Item name",
        InputField::ItemText => "Item text",
    }
}

fn draw_input(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &State,
    field: InputField,
) -> Result<()> {
    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Length(4),
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(frame.size());

        frame.render_widget(
            Paragraph::new(field_title(field)).alignment(Alignment::Center),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(state.input.clone())
                .block(
                    Block::default()
                        .title(field_title(field))
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .alignment(Alignment::Center),
            chunks[1],
        );
    })?;
    Ok(())
}

fn draw_create_list(terminal: &mut Terminal<CrosstermBackend<Stdout>>, state: &State) -> Result<()> {
    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Min(5),
                    Constraint::Length(4),
                ]
                .as_ref(),
            )
            .split(frame.size());

        let text = vec![
            Line::from("(n) Input name"),
            Line::from("(s) Save list".green().italic()),
            Line::from("(q) Cancel".red()),
        ];

        frame.render_widget(
            Paragraph::new("New list").alignment(Alignment::Center),
            chunks[0],
        );
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), chunks[1]);
        frame.render_widget(
            Paragraph::new(state.list_name.clone())
                .block(
                    Block::default()
                        .title("Name")
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .alignment(Alignment::Center),
            chunks[2],
        );
    })?;
    Ok(())
}

fn draw_create_item(terminal: &mut Terminal<CrosstermBackend<Stdout>>, state: &State) -> Result<()> {
    terminal.draw(|frame| {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(2)
            .constraints(
                [
                    Constraint::Min(2),
                    Constraint::Min(5),
                    Constraint::Length(4),
                    Constraint::Length(4),
                ]
                .as_ref(),
            )
            .split(frame.size());

        let text = vec![
            Line::from("(n) Input name"),
            Line::from("(t) Input text"),
            Line::from("(s) Save item".green().italic()),
            Line::from("(q) Cancel".red()),
        ];

        frame.render_widget(
            Paragraph::new("New item").alignment(Alignment::Center),
            chunks[0],
        );
        frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), chunks[1]);
        frame.render_widget(
            Paragraph::new(state.item_name.clone())
                .block(
                    Block::default()
                        .title("Name")
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .alignment(Alignment::Center),
            chunks[2],
        );
        frame.render_widget(
            Paragraph::new(state.item_text.clone())
                .block(
                    Block::default()
                        .title("Text")
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded),
                )
                .alignment(Alignment::Center),
            chunks[3],
        );
    })?;
    Ok(())
}

fn draw_browse(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    lists: &[TodoListView],
    current: Option<&TodoListView>,
    state: &mut State,
) -> Result<()> {
    let lists_items: Vec<ListItem> = lists
        .iter()
        .map(|list| ListItem::new(list_line(list)))
        .collect();
    let lists_ui = List::new(lists_items)
        .block(Block::default().title("Lists").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");

    let item_rows: Vec<ListItem> = current
        .map(|list| {
            list.items
                .iter()
                .map(|item| ListItem::new(item_line(item)))
                .collect()
        })
        .unwrap_or_default();
    let items_ui = List::new(item_rows)
        .block(Block::default().title("Items").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC))
        .highlight_symbol(">>");

    let progress = current.map_or(0.0, |list| list.progress);
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio((progress / 100.0).clamp(0.0, 1.0))
        .label(format!("{progress:.0}%"));

    let status = state
        .status
        .clone()
        .unwrap_or_else(|| "(L) new list  (N) new item  (D) delete  (space) toggle  (q) quit".to_string());

    terminal.draw(|frame| {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([Constraint::Min(3), Constraint::Length(1)].as_ref())
            .split(frame.size());
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Min(2)].as_ref())
            .split(rows[0]);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(3)].as_ref())
            .split(columns[1]);

        frame.render_stateful_widget(lists_ui, columns[0], &mut state.lists_list_state);
        frame.render_stateful_widget(items_ui, right[0], &mut state.items_list_state);
        frame.render_widget(gauge, right[1]);
        frame.render_widget(Paragraph::new(status), rows[1]);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_down_stops_at_last_row() {
        let mut list_state = ListState::default();
        move_down(&mut list_state, 2);
        move_down(&mut list_state, 2);
        move_down(&mut list_state, 2);
        assert_eq!(list_state.selected(), Some(1));
    }

    #[test]
    fn move_down_on_empty_list_keeps_nothing_selected() {
        let mut list_state = ListState::default();
        move_down(&mut list_state, 0);
        assert_eq!(list_state.selected(), None);
    }

    #[test]
    fn move_up_from_top_clears_selection() {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        move_up(&mut list_state);
        assert_eq!(list_state.selected(), None);
    }
}
