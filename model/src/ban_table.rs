use std::sync::{Arc, Weak};
use std::time::Duration;

use banwatch_registry::{BanEntry, BanRegistry};
use banwatch_util::futures::JoinTask;
use banwatch_util::time::UnixTime;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::view::{
    CellAlignment, CellValue, DisplayIntent, ItemFlags, ModelEvent, Orientation, SortOrder,
};

/// Auto-refresh period of the table model.
pub const MODEL_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Column {
    Address,
    BannedUntil,
}

impl Column {
    pub const COUNT: usize = 2;

    pub fn title(self) -> &'static str {
        match self {
            Self::Address => "IP/Netmask",
            Self::BannedUntil => "Banned Until",
        }
    }

    fn of(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Address),
            1 => Some(Self::BannedUntil),
            _ => None,
        }
    }
}

/// Read-only table model over a [`BanRegistry`].
///
/// Keeps a cached snapshot of the banned subnets and answers row, column,
/// cell and header queries against it. The cache is rebuilt wholesale by
/// [`refresh`](Self::refresh), either on demand or from the auto-refresh
/// timer, with layout events emitted around every rebuild.
pub struct BanTableModel {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<dyn BanRegistry>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    cache: Vec<BanEntry>,
    sort_column: Option<usize>,
    sort_order: SortOrder,
    subscribers: Vec<mpsc::UnboundedSender<ModelEvent>>,
    refresh_task: Option<JoinTask<()>>,
}

impl BanTableModel {
    /// Creates the model and loads the initial snapshot.
    pub fn new(registry: Arc<dyn BanRegistry>) -> Self {
        let model = Self {
            inner: Arc::new(Inner {
                registry,
                state: Mutex::new(State::default()),
            }),
        };
        model.refresh();
        model
    }

    pub fn row_count(&self) -> usize {
        self.inner.state.lock().cache.len()
    }

    pub fn column_count(&self) -> usize {
        Column::COUNT
    }

    /// Answers a cell query. Out-of-range indices and intents the cell
    /// does not support produce [`CellValue::Empty`].
    pub fn cell_value(&self, row: usize, column: usize, intent: DisplayIntent) -> CellValue {
        let state = self.inner.state.lock();
        let (Some(entry), Some(column)) = (state.cache.get(row), Column::of(column)) else {
            return CellValue::Empty;
        };
        match (intent, column) {
            (DisplayIntent::Text, Column::Address) => CellValue::Text(entry.subnet.to_string()),
            (DisplayIntent::Text, Column::BannedUntil) => {
                CellValue::Text(format_banned_until(entry.banned_until))
            }
            (DisplayIntent::Alignment, Column::BannedUntil) => {
                CellValue::Align(CellAlignment::Right)
            }
            (DisplayIntent::Alignment, Column::Address) => CellValue::Empty,
        }
    }

    pub fn header_value(
        &self,
        section: usize,
        orientation: Orientation,
        intent: DisplayIntent,
    ) -> CellValue {
        if orientation != Orientation::Horizontal || intent != DisplayIntent::Text {
            return CellValue::Empty;
        }
        match Column::of(section) {
            Some(column) => CellValue::Text(column.title().to_owned()),
            None => CellValue::Empty,
        }
    }

    pub fn item_flags(&self, row: usize) -> ItemFlags {
        if row < self.inner.state.lock().cache.len() {
            ItemFlags::SELECTABLE | ItemFlags::ENABLED
        } else {
            ItemFlags::empty()
        }
    }

    /// Re-queries the registry and swaps the cache wholesale, emitting
    /// [`ModelEvent::LayoutAboutToChange`] before and
    /// [`ModelEvent::LayoutChanged`] after the swap.
    pub fn refresh(&self) {
        self.inner.refresh();
    }

    /// Records the requested sort state and refreshes.
    ///
    /// Any column index is accepted. The rebuild keeps the snapshot's
    /// subnet order regardless of the recorded state; see
    /// [`sort_state`](Self::sort_state).
    pub fn sort(&self, column: usize, order: SortOrder) {
        {
            let mut state = self.inner.state.lock();
            state.sort_column = Some(column);
            state.sort_order = order;
        }
        self.refresh();
    }

    pub fn sort_state(&self) -> (Option<usize>, SortOrder) {
        let state = self.inner.state.lock();
        (state.sort_column, state.sort_order)
    }

    /// Whether a host should display the ban list panel at all.
    pub fn should_show(&self) -> bool {
        !self.inner.state.lock().cache.is_empty()
    }

    /// Subscribes to layout events of all subsequent rebuilds.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ModelEvent> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.inner.state.lock().subscribers.push(events_tx);
        events_rx
    }

    /// Starts the periodic refresh task. Requires a tokio runtime.
    ///
    /// A running task is replaced, which resets the period. The task
    /// holds only a weak reference, so dropping the model stops it.
    pub fn start_auto_refresh(&self) {
        let weak = Arc::downgrade(&self.inner);
        let task = JoinTask::new(auto_refresh(weak));
        self.inner.state.lock().refresh_task = Some(task);
    }

    /// Stops the periodic refresh task. A refresh that already began is
    /// not interrupted.
    pub fn stop_auto_refresh(&self) {
        self.inner.state.lock().refresh_task = None;
    }
}

impl Inner {
    fn refresh(&self) {
        // The registry read happens under the state lock so that event
        // pairs from concurrent refreshes never interleave.
        let mut state = self.state.lock();
        state.notify(ModelEvent::LayoutAboutToChange);
        state.cache = self.registry.banned();
        state.notify(ModelEvent::LayoutChanged);
        tracing::trace!(rows = state.cache.len(), "ban list refreshed");
    }
}

impl State {
    fn notify(&mut self, event: ModelEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

async fn auto_refresh(weak: Weak<Inner>) {
    let mut interval = tokio::time::interval(MODEL_UPDATE_INTERVAL);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let Some(inner) = weak.upgrade() else { break };
        inner.refresh();
    }
}

fn format_banned_until(until: UnixTime) -> String {
    humantime::format_rfc3339_seconds(until.to_system_time()).to_string()
}
