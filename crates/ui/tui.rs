use crate::data::{Edge, Panel, Source};
use std::{error::Error, io};

use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    },
    layout::{Constraint, Layout, Margin, Rect},
    style::{self, Color, Modifier, Style, Stylize},
    Frame, Terminal,
    text::{Line, Text},
    widgets::{
        Block, BorderType, Cell, HighlightSpacing, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table, TableState, Tabs,
    },
};
use style::palette::tailwind;
use unicode_width::UnicodeWidthStr;

const PALETTES: [tailwind::Palette; 4] = [
    tailwind::BLUE,
    tailwind::EMERALD,
    tailwind::INDIGO,
    tailwind::RED,
];
const INFO_TEXT: &str = "(Esc) quit | (↑↓) rows | (Tab) view | (←→) color | (s/S) start -/+ | (e/E) end -/+ | (r) reset";

const ITEM_HEIGHT: usize = 1;

struct TableColors {
    buffer_bg: Color,
    header_bg: Color,
    header_fg: Color,
    row_fg: Color,
    selected_style_fg: Color,
    normal_row_color: Color,
    alt_row_color: Color,
    footer_border_color: Color,
    error_fg: Color,
}

impl TableColors {
    const fn new(color: &tailwind::Palette) -> Self {
        Self {
            buffer_bg: tailwind::SLATE.c950,
            header_bg: color.c900,
            header_fg: tailwind::SLATE.c200,
            row_fg: tailwind::SLATE.c200,
            selected_style_fg: color.c400,
            normal_row_color: tailwind::SLATE.c950,
            alt_row_color: tailwind::SLATE.c900,
            footer_border_color: color.c400,
            error_fg: tailwind::RED.c400,
        }
    }
}

struct App<S: Source> {
    source: S,
    panels: Vec<Panel>,
    tab: usize,
    state: TableState,
    longest_item_lens: Vec<u16>,
    scroll_state: ScrollbarState,
    colors: TableColors,
    color_index: usize,
    status: Option<String>,
}

impl<S: Source> App<S> {
    fn new(source: S) -> Self {
        let mut app = Self {
            panels: source.panels(),
            source,
            tab: 0,
            state: TableState::default(),
            longest_item_lens: vec![],
            scroll_state: ScrollbarState::new(0),
            colors: TableColors::new(&PALETTES[0]),
            color_index: 0,
            status: None,
        };
        app.select_tab(0);
        app
    }

    fn panel(&self) -> Option<&Panel> {
        self.panels.get(self.tab)
    }

    fn rows(&self) -> usize {
        self.panel().map(|p| p.rows.len()).unwrap_or(0)
    }

    fn select_tab(&mut self, tab: usize) {
        self.tab = tab;
        self.longest_item_lens = self
            .panel()
            .map(constraint_len_calculator)
            .unwrap_or_default();
        let rows = self.rows();
        self.state.select(if rows == 0 { None } else { Some(0) });
        self.scroll_state = ScrollbarState::new(rows.saturating_sub(1) * ITEM_HEIGHT);
    }

    pub fn next_tab(&mut self) {
        if !self.panels.is_empty() {
            self.select_tab((self.tab + 1) % self.panels.len());
        }
    }

    pub fn previous_tab(&mut self) {
        let count = self.panels.len();
        if count > 0 {
            self.select_tab((self.tab + count - 1) % count);
        }
    }

    pub fn next(&mut self) {
        let rows = self.rows();
        if rows == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= rows - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    pub fn previous(&mut self) {
        let rows = self.rows();
        if rows == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    rows - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i * ITEM_HEIGHT);
    }

    pub fn next_color(&mut self) {
        self.color_index = (self.color_index + 1) % PALETTES.len();
    }

    pub fn previous_color(&mut self) {
        let count = PALETTES.len();
        self.color_index = (self.color_index + count - 1) % count;
    }

    pub fn set_colors(&mut self) {
        self.colors = TableColors::new(&PALETTES[self.color_index]);
    }

    /// Applies a window move and reloads the panels, or records why it was refused.
    fn apply(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => {
                self.status = None;
                self.panels = self.source.panels();
                let tab = self.tab.min(self.panels.len().saturating_sub(1));
                self.select_tab(tab);
            }
            Err(e) => self.status = Some(e),
        }
    }

    fn shift(&mut self, edge: Edge, days: i64) {
        let result = self.source.shift(edge, days);
        self.apply(result);
    }

    fn reset(&mut self) {
        let result = self.source.reset();
        self.apply(result);
    }
}

pub fn run<S: Source>(source: S) -> Result<(), Box<dyn Error>> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let app = App::new(source);
    let res = run_app(&mut terminal, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: Backend, S: Source>(terminal: &mut Terminal<B>, mut app: App<S>) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('j') | KeyCode::Down => app.next(),
                    KeyCode::Char('k') | KeyCode::Up => app.previous(),
                    KeyCode::Char('l') | KeyCode::Right => app.next_color(),
                    KeyCode::Char('h') | KeyCode::Left => app.previous_color(),
                    KeyCode::Tab => app.next_tab(),
                    KeyCode::BackTab => app.previous_tab(),
                    KeyCode::Char('s') => app.shift(Edge::Start, -1),
                    KeyCode::Char('S') => app.shift(Edge::Start, 1),
                    KeyCode::Char('e') => app.shift(Edge::End, -1),
                    KeyCode::Char('E') => app.shift(Edge::End, 1),
                    KeyCode::Char('r') => app.reset(),
                    _ => {}
                }
            }
        }
    }
}

fn ui<S: Source>(f: &mut Frame, app: &mut App<S>) {
    let rects = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(5),
        Constraint::Length(4),
    ])
    .split(f.area());

    app.set_colors();

    render_tabs(f, app, rects[0]);

    render_table(f, app, rects[1]);

    render_scrollbar(f, app, rects[1]);

    render_footer(f, app, rects[2]);
}

fn render_tabs<S: Source>(f: &mut Frame, app: &App<S>, area: Rect) {
    let titles: Vec<String> = app.panels.iter().map(|p| p.title.clone()).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab)
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .highlight_style(
            Style::new()
                .add_modifier(Modifier::BOLD)
                .fg(app.colors.selected_style_fg),
        )
        .block(
            Block::bordered()
                .title(format!(" Bike Sharing | {} ", app.source.window_label()))
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(tabs, area);
}

fn render_table<S: Source>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let Some(panel) = app.panels.get(app.tab) else {
        return;
    };
    let header_style = Style::default()
        .fg(app.colors.header_fg)
        .bg(app.colors.header_bg);
    let selected_style = Style::default()
        .add_modifier(Modifier::REVERSED)
        .fg(app.colors.selected_style_fg);

    let header = panel
        .header
        .iter()
        .map(|h| Cell::from(h.as_str()))
        .collect::<Row>()
        .style(header_style)
        .height(1);
    let rows: Vec<Row> = if panel.is_empty() {
        vec![Row::new([Cell::from("no records in window")])
            .style(Style::new().fg(app.colors.row_fg).bg(app.colors.normal_row_color))]
    } else {
        panel
            .rows
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let color = match i % 2 {
                    0 => app.colors.normal_row_color,
                    _ => app.colors.alt_row_color,
                };
                item.iter()
                    .map(|content| Cell::from(Text::from(content.as_str())))
                    .collect::<Row>()
                    .style(Style::new().fg(app.colors.row_fg).bg(color))
                    .height(ITEM_HEIGHT as u16)
            })
            .collect()
    };
    let widths: Vec<Constraint> = app
        .longest_item_lens
        .iter()
        // + 1 is for padding.
        .map(|len| Constraint::Min(len + 1))
        .collect();
    let bar = " █ ";
    let t = Table::new(rows, widths)
        .header(header)
        .highlight_style(selected_style)
        .highlight_symbol(Text::from(bar))
        .bg(app.colors.buffer_bg)
        .highlight_spacing(HighlightSpacing::Always);
    f.render_stateful_widget(t, area, &mut app.state);
}

/// Widest cell per column, header included.
fn constraint_len_calculator(panel: &Panel) -> Vec<u16> {
    (0..panel.width())
        .map(|col| {
            let header_len = UnicodeWidthStr::width(panel.header[col].as_str());
            let cell_len = panel
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .flat_map(|cell| cell.lines())
                .map(UnicodeWidthStr::width)
                .max()
                .unwrap_or(0);
            #[allow(clippy::cast_possible_truncation)]
            let len = header_len.max(cell_len) as u16;
            len
        })
        .collect()
}

fn render_scrollbar<S: Source>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    f.render_stateful_widget(
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None),
        area.inner(Margin {
            vertical: 1,
            horizontal: 1,
        }),
        &mut app.scroll_state,
    );
}

fn render_footer<S: Source>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut lines = vec![Line::from(INFO_TEXT)];
    if let Some(status) = &app.status {
        lines.push(Line::from(status.as_str()).fg(app.colors.error_fg));
    }
    let info_footer = Paragraph::new(lines)
        .style(Style::new().fg(app.colors.row_fg).bg(app.colors.buffer_bg))
        .centered()
        .block(
            Block::bordered()
                .border_type(BorderType::Double)
                .border_style(Style::new().fg(app.colors.footer_border_color)),
        );
    f.render_widget(info_footer, area);
}
