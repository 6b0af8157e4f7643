pub mod page_observer;
pub mod stats_aggregator;
pub mod table_extractor;
pub mod widget_presenter;

pub use page_observer::{PageObserver, Signal, SignalKind};
pub use table_extractor::{Extraction, TableExtractor};
pub use widget_presenter::{RenderOutcome, WidgetPresenter};
