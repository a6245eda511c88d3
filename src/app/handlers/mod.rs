pub mod ingestion;
pub mod redraw;

pub use ingestion::IngestionHandler;
pub use redraw::RedrawHandler;
