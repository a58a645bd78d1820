pub mod batch;
pub mod error;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod processing;
pub mod render;

pub use batch::{BatchJob, BatchOutcome, run_batch, unique_basenames};
pub use error::{Error, Result};
pub use layout::{GridShape, plan_grid};
pub use models::{BorderKind, Contour, Stage, StageArtifact, StageKind};
pub use pipeline::{
    DebugDump, PipelineParams, PipelineResult, StageSequencer, process_file, process_image,
};
pub use render::FigureWriter;
