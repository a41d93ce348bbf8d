/// A titled table of display strings, one per view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Panel {
    pub fn new(title: impl Into<String>, header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Panel {
            title: title.into(),
            header,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Feeds the dashboard and takes its window moves.
pub trait Source {
    fn window_label(&self) -> String;
    fn panels(&self) -> Vec<Panel>;
    /// Moves one edge of the window; an error keeps the previous window.
    fn shift(&mut self, edge: Edge, days: i64) -> Result<(), String>;
    fn reset(&mut self) -> Result<(), String>;
}
