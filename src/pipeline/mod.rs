// Geo-aggregation pipeline: ingestion, processing, and the stage runner

pub mod ingestion;
pub mod pipeline;
pub mod processing;

pub use pipeline::{GeoPipeline, PipelineOutput};
