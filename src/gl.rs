//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// OpenGL ES 2.0 bindings, generated by build.rs
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

#![allow(clippy::all, non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code, unused)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));

//----------------------------------------------------------------------------

/// Asserts the GL error flag is clear. Only checked in debug builds.
pub fn check(gl: &Gles2) {
    if cfg!(debug_assertions) {
        let err = unsafe { gl.GetError() };
        debug_assert_eq!(err, NO_ERROR, "GL error 0x{:04x}", err);
    }
}

//----------------------------------------------------------------------------
