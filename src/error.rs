//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Error types
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::io;
use std::path::PathBuf;

use thiserror::Error;

//----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("no display available: {0}")]
    NoDisplay(String),

    #[error("could not query screen size: no monitor attached")]
    ScreenSize,

    #[error("no window was created alongside the GL config")]
    NoWindow,

    #[error("window handle unavailable: {0}")]
    Handle(#[from] raw_window_handle::HandleError),

    #[error("EGL: {0}")]
    Egl(#[from] glutin::error::Error),
}

//----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("could not read shader {path}: {source}")]
    Missing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("shader {name} contains a NUL byte")]
    Nul { name: String },

    #[error("{stage:?} shader {name} failed to compile:\n{log}")]
    Compile {
        stage: ShaderStage,
        name: String,
        log: String,
    },

    #[error("program {name} failed to link:\n{log}")]
    Link { name: String, log: String },
}

//----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("offscreen framebuffer incomplete (status 0x{0:04x})")]
    Incomplete(u32),
}

//----------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Display(#[from] DisplayError),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("could not present frame: {0}")]
    Present(#[source] glutin::error::Error),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, Error>;
