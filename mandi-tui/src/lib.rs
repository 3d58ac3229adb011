/// Mandi TUI - Shared Library
///
/// This library provides the client engine behind the `mandi` terminal binary:
/// - AppState: the single source of truth for filters, results and chart handles
/// - Page controllers for the dashboard, compare, predictions and insights pages
/// - Router and action dispatch table mapping user input to state changes
///
/// The library also includes:
/// - View rendering into plain data nodes, drawn by ratatui widgets
/// - A chart capability with at most one live handle per slot
/// - Transient notification banners
pub mod shared;

// Re-export commonly used types for convenience
pub use shared::banner::{Banner, BannerKind, Banners};
pub use shared::chart::{
    ChartBackend, ChartHandle, ChartKind, ChartSlot, ChartSpec, RenderError, TerminalCharts,
};
pub use shared::config::ClientConfig;
pub use shared::controller::PageStatus;
pub use shared::dispatch::{binding, Binding, SubmissionStep, Trigger, UiAction};
pub use shared::engine::Engine;
pub use shared::router::{Page, Router};
pub use shared::state::{AppState, Catalog, FilterChange, FilterField, Results};
pub use shared::view::{Container, Node, View};
pub use shared::widget::{render_ui, SubmissionField};
