use crate::view::ViewKind;
use engine::Explorer;
use log::error;
use ui::data::{Edge, Panel, Source};

/// Drives the terminal dashboard from an explorer.
pub struct ExplorerSource {
    explorer: Explorer,
    kinds: Vec<ViewKind>,
}

impl ExplorerSource {
    pub fn new(explorer: Explorer, kinds: Vec<ViewKind>) -> Self {
        ExplorerSource { explorer, kinds }
    }
}

impl Source for ExplorerSource {
    fn window_label(&self) -> String {
        self.explorer.window().to_string()
    }

    fn panels(&self) -> Vec<Panel> {
        let views = self.explorer.views();
        self.kinds
            .iter()
            .filter_map(|kind| match kind.panel(views) {
                Ok(panel) => Some(panel),
                Err(e) => {
                    error!("failed to build {} panel: {}", kind.name(), e);
                    None
                }
            })
            .collect()
    }

    fn shift(&mut self, edge: Edge, days: i64) -> Result<(), String> {
        let result = match edge {
            Edge::Start => self.explorer.shift_start(days),
            Edge::End => self.explorer.shift_end(days),
        };
        result.map(|_| ()).map_err(|e| e.to_string())
    }

    fn reset(&mut self) -> Result<(), String> {
        self.explorer.reset().map(|_| ()).map_err(|e| e.to_string())
    }
}
