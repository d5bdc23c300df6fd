/// Bounded ring of recent internal log lines shown in the side pane.
#[derive(Debug, Default)]
pub struct LogView {
    pub entries: Vec<String>,
    pub scroll_offset: u16,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        if self.entries.len() > 200 {
            self.entries.remove(0);
        }
    }
}
