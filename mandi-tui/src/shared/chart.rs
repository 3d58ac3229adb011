//! Chart capability.
//!
//! Charts are created through a [`ChartBackend`] and live until their [`ChartHandle`] is
//! destroyed. [`ChartSlots`] guarantees at most one live handle per [`ChartSlot`].

use derive_more::Display;
use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    fmt::Debug,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use thiserror::Error;

/// Named location that holds at most one live chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum ChartSlot {
    #[display("prediction")]
    Prediction,
    #[display("insight-{_0}")]
    Insight(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Everything a backend needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSpec {
    /// Predicted price line over the horizon.
    pub fn line(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Line,
            title: title.into(),
            labels,
            values,
        }
    }

    /// Min / Avg / Max bars.
    pub fn bar(title: impl Into<String>, labels: Vec<String>, values: Vec<f64>) -> Self {
        Self {
            kind: ChartKind::Bar,
            title: title.into(),
            labels,
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("chart {slot} has no data points")]
    EmptySeries { slot: ChartSlot },

    #[error("chart backend failed for {slot}: {message}")]
    Backend { slot: ChartSlot, message: String },
}

/// A live chart. Destroying consumes the handle.
pub trait ChartHandle: Debug + Send {
    fn destroy(self: Box<Self>);
}

/// Creates charts for a slot.
pub trait ChartBackend: Debug + Send {
    fn create(&self, slot: ChartSlot, spec: ChartSpec) -> Result<Box<dyn ChartHandle>, RenderError>;
}

/// Live chart handles keyed by slot.
#[derive(Debug, Default)]
pub struct ChartSlots {
    handles: BTreeMap<ChartSlot, Box<dyn ChartHandle>>,
}

impl ChartSlots {
    /// Destroy the handle occupying `slot` (if any), then store the handle built by `factory`.
    ///
    /// If the factory fails the slot is left empty.
    pub fn install<F>(&mut self, slot: ChartSlot, factory: F) -> Result<(), RenderError>
    where
        F: FnOnce() -> Result<Box<dyn ChartHandle>, RenderError>,
    {
        if let Some(previous) = self.handles.remove(&slot) {
            previous.destroy();
        }

        let handle = factory()?;
        self.handles.insert(slot, handle);
        Ok(())
    }

    /// Destroy every handle whose slot matches `release`. Returns how many were destroyed.
    pub fn release_where<F>(&mut self, mut release: F) -> usize
    where
        F: FnMut(&ChartSlot) -> bool,
    {
        let doomed = self
            .handles
            .keys()
            .filter(|slot| release(*slot))
            .copied()
            .collect::<Vec<_>>();

        doomed
            .iter()
            .filter_map(|slot| self.handles.remove(slot))
            .map(|handle| handle.destroy())
            .count()
    }

    pub fn contains(&self, slot: ChartSlot) -> bool {
        self.handles.contains_key(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = ChartSlot> + '_ {
        self.handles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

type LiveCharts = Arc<Mutex<BTreeMap<u64, (ChartSlot, ChartSpec)>>>;

/// [`ChartBackend`] that keeps live chart specs for the terminal widgets to draw.
///
/// Clones share the same registry, so the engine and the draw loop can each hold one.
#[derive(Debug, Clone, Default)]
pub struct TerminalCharts {
    live: LiveCharts,
    next_id: Arc<AtomicU64>,
}

impl TerminalCharts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec of the live chart in `slot`.
    pub fn spec(&self, slot: ChartSlot) -> Option<ChartSpec> {
        self.live
            .lock()
            .values()
            .find(|(live_slot, _)| *live_slot == slot)
            .map(|(_, spec)| spec.clone())
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }
}

impl ChartBackend for TerminalCharts {
    fn create(&self, slot: ChartSlot, spec: ChartSpec) -> Result<Box<dyn ChartHandle>, RenderError> {
        if spec.values.is_empty() {
            return Err(RenderError::EmptySeries { slot });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.live.lock().insert(id, (slot, spec));

        Ok(Box::new(TerminalChart {
            id,
            live: Arc::clone(&self.live),
        }))
    }
}

#[derive(Debug)]
struct TerminalChart {
    id: u64,
    live: LiveCharts,
}

impl ChartHandle for TerminalChart {
    fn destroy(self: Box<Self>) {
        self.live.lock().remove(&self.id);
    }
}
