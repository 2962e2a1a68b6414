//! Headless scene rendering
//!
//! - [`draw`] - flattens the scene into draw commands
//! - [`pipeline_manager`] - one pipeline per compiled shader program
//! - [`render_engine`] - owns the device and all GPU resources
//! - [`vertex`] - interleaved vertex format

pub mod draw;
pub mod pipeline_manager;
pub mod render_engine;
pub mod vertex;

pub use draw::{collect_draws, DrawCommand};
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::{RenderEngine, RenderError, RenderStats};
pub use vertex::Vertex3D;
