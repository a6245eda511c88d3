pub mod coordinator;
pub mod ingestion;
pub mod retry;

pub use coordinator::{DeferredRedraw, RedrawRequest, TraceCoordinator, TraceSnapshot};
pub use ingestion::{FrameSource, IngestionError, IngestionExit, IngestionSummary, IngestionWorker};
pub use retry::RetryPolicy;
