mod connector;
mod document;
mod env;
mod error;
mod extractor;
mod factory;
mod loader;
pub mod log;
mod pipeline;
mod registry;
mod runtime;

pub use connector::{Connector, ConnectorConfig, ConnectorRole};
pub use document::{normalize_row, positional_name, Document, SourceValue};
pub use env::{RuntimeEnv, CONNECTOR_NAME, PIPELINE_NAME};
pub use error::{Error, Result};
pub use extractor::{validate_table_name, Extractor};
pub use factory::{ExtractorFactory, LoaderFactory};
pub use loader::{Loader, LoaderStatus};
pub use log::{LogMessage, LogPublisher, LogSubscriber, LogTransport};
pub use pipeline::{Pipeline, PipelineCount, PipelineCounters};
pub use registry::Registry;
pub use runtime::{
    assign_identity, run_extractor, run_loader, ExtractorRuntime, LoaderRuntime, MessageOutcome,
    RunStats,
};
