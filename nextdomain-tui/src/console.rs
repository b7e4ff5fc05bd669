use crate::UiMessage;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, List, ListItem},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

const MAX_CONSOLE_LINES: usize = 500;
const TICK: Duration = Duration::from_secs(1);

/// The realtime log console panel and the ticker task feeding it.
pub struct LogConsole {
    id: u64,
    lines: Vec<String>,
    running: Arc<AtomicBool>,
}

impl LogConsole {
    /// Opens the panel and starts a ticker that posts one [`UiMessage::Tick`] per second.
    pub fn open(id: u64, runtime: &Handle, tx: mpsc::UnboundedSender<UiMessage>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        runtime.spawn(async move {
            // First line appears one tick after opening.
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            let mut count = 0u64;
            loop {
                interval.tick().await;
                if !flag.load(Ordering::Relaxed) {
                    break;
                }
                if tx.send(UiMessage::Tick { console: id, count }).is_err() {
                    break;
                }
                count += 1;
            }
            debug!("Log console {} ticker stopped", id);
        });

        Self {
            id,
            lines: Vec::new(),
            running,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn record_tick(&mut self, count: u64) {
        self.push(format!("NEXTDOMAIN running perfectly... {}", count));
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        if self.lines.len() > MAX_CONSOLE_LINES {
            self.lines.drain(0..self.lines.len() - MAX_CONSOLE_LINES);
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, foreground: Color, border: Color) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Realtime Log Console ")
            .border_style(Style::default().fg(border));

        let inner = block.inner(area);
        f.render_widget(block, area);

        // Follow the tail.
        let height = inner.height as usize;
        let skip = self.lines.len().saturating_sub(height);
        let items: Vec<ListItem> = self
            .lines
            .iter()
            .skip(skip)
            .map(|line| ListItem::new(line.as_str()).style(Style::default().fg(foreground)))
            .collect();

        f.render_widget(List::new(items), inner);
    }
}

impl Drop for LogConsole {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
