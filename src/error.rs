//! Error types for the renderer.

use thiserror::Error;

/// Everything that can go fatally wrong while loading a scene or rendering a frame.
///
/// Recoverable conditions (degenerate triangles, fragments outside the depth range, border
/// samples) are handled where they happen and never surface here.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Index buffer references a vertex that doesn't exist - the mesh data is corrupt.
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    /// Triangle list whose index count can't be split into whole triangles.
    #[error("triangle list has {index_count} indices, which is not a multiple of 3")]
    IncompleteTriangleList { index_count: usize },

    /// Unknown name for one of the settings enumerations (cull mode, shading mode, sampler).
    #[error("unknown {kind} '{value}'")]
    UnknownEnumerant { kind: &'static str, value: String },

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error("missing value for argument '{0}'")]
    MissingArgument(String),

    #[error("invalid value '{value}' for argument '{argument}'")]
    InvalidArgument { argument: String, value: String },

    /// A pool task went away (panicked) before sending its result back.
    #[error("expected {expected} results from worker threads, received {received}")]
    WorkerLost { expected: usize, received: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Obj(#[from] obj::ObjError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
