//! Error types for the viewer

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed geometry in {path}: {reason}")]
    Geometry { path: PathBuf, reason: String },

    #[error("{path}:{line}: {reason}")]
    Manifest {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("cannot decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture upload failed: {0}")]
    Texture(#[from] glium::texture::TextureCreationError),

    #[error("vertex buffer creation failed: {0}")]
    Buffer(#[from] glium::vertex::BufferCreationError),

    #[error("shader program creation failed: {0}")]
    Program(#[from] glium::program::ProgramChooserCreationError),

    #[error("framebuffer validation failed: {0}")]
    Framebuffer(#[from] glium::framebuffer::ValidationError),

    #[error("draw call failed: {0}")]
    Draw(#[from] glium::DrawError),

    #[error("frame swap failed: {0}")]
    Swap(#[from] glium::SwapBuffersError),

    #[error("unsupported graphics context: {0}")]
    Unsupported(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
