//! Orchestration of the acquisition, analysis and transformation steps.

mod batch;
mod interactive;
mod state;

pub use batch::{
    BatchOrchestrator, BatchReport, BatchState, ExampleRecord, SampleLocation, SkippedItem,
    DEFAULT_ITEM_DELAY,
};
pub use interactive::{InteractiveOrchestrator, Makeover, MakeoverSummary};
pub use state::{SessionState, Stage};
