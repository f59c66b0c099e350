//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Offscreen render target and per-frame drawing
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::mem;
use std::ptr;
use std::time::{Duration, Instant};

use log::debug;

use crate::error::TargetError;
use crate::gl::{self, types::*, Gles2};
use crate::shaders::{self, AttribLocation, Programs};

//----------------------------------------------------------------------------

/// Full-screen quad in homogeneous coordinates, drawn as a triangle fan.
pub static QUAD_VERTICES: [GLfloat; 16] = [
    -1.0, -1.0, 1.0, 1.0,
     1.0, -1.0, 1.0, 1.0,
     1.0,  1.0, 1.0, 1.0,
    -1.0,  1.0, 1.0, 1.0,
];

pub const QUAD_VERTEX_COUNT: GLsizei = 4;
const QUAD_COMPONENTS: GLint = 4;
const QUAD_STRIDE: GLsizei = (QUAD_COMPONENTS as usize * mem::size_of::<GLfloat>()) as GLsizei;

pub static JULIA_COLOR: [f32; 4] = [0.5, 0.5, 0.8, 1.0];
pub static CLEAR_COLOR: [f32; 4] = [0.0, 1.0, 1.0, 1.0];

//----------------------------------------------------------------------------

/// Seconds since the clock was started, truncated to hundredths. Started
/// once at process start and handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> FrameClock {
        FrameClock::since(Instant::now())
    }

    pub fn since(start: Instant) -> FrameClock {
        FrameClock { start: start }
    }

    pub fn seconds(&self) -> f32 {
        quantize(self.start.elapsed())
    }
}

fn quantize(elapsed: Duration) -> f32 {
    (elapsed.as_millis() / 10) as f32 / 100.0
}

//----------------------------------------------------------------------------

/// The quad, uploaded once and only bound afterwards.
struct QuadBuffer {
    id: GLuint,
}

impl QuadBuffer {
    fn upload(gl: &Gles2) -> QuadBuffer {
        let mut id = 0;
        unsafe {
            gl.GenBuffers(1, &mut id);
            gl.BindBuffer(gl::ARRAY_BUFFER, id);
            gl.BufferData(gl::ARRAY_BUFFER,
                          mem::size_of_val(&QUAD_VERTICES) as GLsizeiptr,
                          QUAD_VERTICES.as_ptr() as *const _,
                          gl::STATIC_DRAW);
        }
        gl::check(gl);
        QuadBuffer { id: id }
    }

    fn bind(&self, gl: &Gles2, vertex: Option<AttribLocation>) {
        unsafe {
            gl.BindBuffer(gl::ARRAY_BUFFER, self.id);
            if let Some(attr) = vertex {
                gl.VertexAttribPointer(attr.index(), QUAD_COMPONENTS, gl::FLOAT, gl::FALSE,
                                       QUAD_STRIDE, ptr::null());
                gl.EnableVertexAttribArray(attr.index());
            }
        }
        gl::check(gl);
    }
}

//----------------------------------------------------------------------------

/// A screen-sized RGB565 texture with a framebuffer drawing into it.
struct OffscreenTarget {
    texture: GLuint,
    framebuffer: GLuint,
}

impl OffscreenTarget {
    fn new(gl: &Gles2, width: u32, height: u32) -> Result<OffscreenTarget, TargetError> {
        let mut texture = 0;
        let mut framebuffer = 0;
        let status = unsafe {
            gl.GenTextures(1, &mut texture);
            gl.BindTexture(gl::TEXTURE_2D, texture);
            gl.TexImage2D(gl::TEXTURE_2D, 0, gl::RGB as GLint,
                          width as GLsizei, height as GLsizei, 0,
                          gl::RGB, gl::UNSIGNED_SHORT_5_6_5, ptr::null());
            gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            // NPOT textures are incomplete on GLES 2 unless clamped
            gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl.TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::check(gl);

            gl.GenFramebuffers(1, &mut framebuffer);
            gl.BindFramebuffer(gl::FRAMEBUFFER, framebuffer);
            gl.FramebufferTexture2D(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0,
                                    gl::TEXTURE_2D, texture, 0);
            let status = gl.CheckFramebufferStatus(gl::FRAMEBUFFER);
            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
            status
        };
        gl::check(gl);

        if status != gl::FRAMEBUFFER_COMPLETE {
            return Err(TargetError::Incomplete(status));
        }
        Ok(OffscreenTarget { texture: texture, framebuffer: framebuffer })
    }
}

//----------------------------------------------------------------------------

/// Owns every GL object for the lifetime of the process. Nothing is freed;
/// the handles go away with the context at exit.
pub struct Renderer {
    gl: Gles2,
    programs: Programs,
    quad: QuadBuffer,
    target: OffscreenTarget,
    clock: FrameClock,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(gl: Gles2, programs: Programs, clock: FrameClock,
               width: u32, height: u32) -> Result<Renderer, TargetError> {
        unsafe {
            gl.ClearColor(CLEAR_COLOR[0], CLEAR_COLOR[1], CLEAR_COLOR[2], CLEAR_COLOR[3]);
        }

        let quad = QuadBuffer::upload(&gl);
        let target = OffscreenTarget::new(&gl, width, height)?;

        unsafe {
            gl.Viewport(0, 0, width as GLsizei, height as GLsizei);
        }
        gl::check(&gl);

        debug!("renderer ready: {}x{}, quad buffer {}, texture {}, framebuffer {}",
               width, height, quad.id, target.texture, target.framebuffer);

        Ok(Renderer {
            gl: gl,
            programs: programs,
            quad: quad,
            target: target,
            clock: clock,
            width: width,
            height: height,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draws the Mandelbrot set into the offscreen texture. The offscreen
    /// framebuffer is left bound.
    pub fn render_mandelbrot_to_texture(&self, cx: f32, cy: f32, scale: f32) {
        let gl = &self.gl;
        let prog = &self.programs.mandelbrot;

        unsafe { gl.BindFramebuffer(gl::FRAMEBUFFER, self.target.framebuffer) };
        gl::check(gl);

        prog.program.bind(gl);
        self.quad.bind(gl, prog.vertex);

        shaders::set_vec2(gl, prog.scale, scale, scale);
        shaders::set_vec2(gl, prog.centre, cx, cy);
        gl::check(gl);

        unsafe {
            gl.DrawArrays(gl::TRIANGLE_FAN, 0, QUAD_VERTEX_COUNT);
            gl::check(gl);
            gl.Flush();
            gl.Finish();
        }
        gl::check(gl);
    }

    /// Draws the Julia view to the screen. The caller presents the frame.
    pub fn render_frame(&self, cx: f32, cy: f32, scale: f32, x: f32, y: f32) {
        let gl = &self.gl;
        let prog = &self.programs.julia;

        unsafe {
            gl.BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl.Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
        gl::check(gl);

        prog.program.bind(gl);
        self.quad.bind(gl, prog.vertex);

        unsafe {
            gl.ActiveTexture(gl::TEXTURE0);
            gl.BindTexture(gl::TEXTURE_2D, self.target.texture);
        }
        gl::check(gl);

        shaders::set_vec4(gl, prog.color, JULIA_COLOR);
        shaders::set_vec2(gl, prog.scale, scale, scale);
        shaders::set_vec2(gl, prog.offset, x, y);
        shaders::set_vec2(gl, prog.centre, cx, cy);
        shaders::set_int(gl, prog.tex, 0);
        shaders::set_float(gl, prog.time, self.clock.seconds());
        gl::check(gl);

        unsafe {
            gl.DrawArrays(gl::TRIANGLE_FAN, 0, QUAD_VERTEX_COUNT);
            gl::check(gl);
            gl.BindBuffer(gl::ARRAY_BUFFER, 0);
            gl.Flush();
            gl.Finish();
        }
        gl::check(gl);
    }
}

//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::recording::{self, Call};
    use crate::shaders::ShaderSources;

    const WIDTH: u32 = 64;
    const HEIGHT: u32 = 48;

    fn renderer_with(clock: FrameClock, missing: &[&str]) -> Renderer {
        recording::reset(missing);
        let gl = recording::load();
        let sources = ShaderSources {
            vertex: "vert".to_string(),
            julia: "julia".to_string(),
            mandelbrot: "mandel".to_string(),
        };
        let programs = shaders::build(&gl, &sources).unwrap();
        Renderer::new(gl, programs, clock, WIDTH, HEIGHT).unwrap()
    }

    fn renderer(missing: &[&str]) -> Renderer {
        renderer_with(FrameClock::start(), missing)
    }

    fn count(calls: &[Call], f: fn(&Call) -> bool) -> usize {
        calls.iter().filter(|c| f(c)).count()
    }

    #[test]
    fn quad_uploaded_once_and_reused() {
        let r = renderer(&[]);
        let setup = recording::take();
        assert_eq!(setup.iter().filter(|c| matches!(c, Call::BufferData(_))).count(), 1);
        assert!(setup.contains(&Call::BufferData(mem::size_of_val(&QUAD_VERTICES) as GLsizeiptr)));

        for _ in 0..3 {
            r.render_mandelbrot_to_texture(32.0, 24.0, 0.003);
            r.render_frame(32.0, 24.0, 0.003, 0.0, 0.0);
        }
        let frames = recording::take();
        assert_eq!(count(&frames, |c| matches!(c, Call::BufferData(_))), 0);
        let quad_binds = frames.iter()
            .filter(|c| **c == Call::BindBuffer(gl::ARRAY_BUFFER, r.quad.id))
            .count();
        assert_eq!(quad_binds, 6);
    }

    #[test]
    fn mandelbrot_pass_draws_into_the_offscreen_target() {
        let r = renderer(&[]);
        recording::take();

        r.render_mandelbrot_to_texture(32.0, 24.0, 0.003);
        let calls = recording::take();
        assert_eq!(calls[0], Call::BindFramebuffer(r.target.framebuffer));
        assert_ne!(r.target.framebuffer, 0);
        assert!(!calls.contains(&Call::BindFramebuffer(0)));
        assert!(calls.contains(&Call::DrawArrays(gl::TRIANGLE_FAN, QUAD_VERTEX_COUNT)));
    }

    #[test]
    fn frame_rebinds_the_screen_after_a_mandelbrot_pass() {
        let r = renderer(&[]);
        r.render_mandelbrot_to_texture(32.0, 24.0, 0.003);
        recording::take();

        r.render_frame(32.0, 24.0, 0.003, 0.0, 0.0);
        let calls = recording::take();
        let first_bind = calls.iter().find(|c| matches!(c, Call::BindFramebuffer(_)));
        assert_eq!(first_bind, Some(&Call::BindFramebuffer(0)));

        let bind = calls.iter().position(|c| *c == Call::BindFramebuffer(0)).unwrap();
        let draw = calls.iter().position(|c| matches!(c, Call::DrawArrays(..))).unwrap();
        assert!(bind < draw);
        assert!(calls.contains(&Call::BindTexture(r.target.texture)));
    }

    #[test]
    fn absent_uniforms_are_never_set() {
        let r = renderer(&["offset", "time"]);
        recording::take();

        r.render_mandelbrot_to_texture(32.0, 24.0, 0.003);
        r.render_frame(32.0, 24.0, 0.003, 1.0, 2.0);
        let calls = recording::take();

        let missing = [recording::location_of("offset"), recording::location_of("time")];
        for call in &calls {
            if let Call::Uniform(loc, _) = *call {
                assert!(loc >= 0 && !missing.contains(&loc), "uniform set at {}", loc);
            }
        }
        let scale = recording::location_of("scale");
        assert!(calls.contains(&Call::Uniform(scale, vec![0.003, 0.003])));
    }

    #[test]
    fn each_pass_flushes_and_finishes_once() {
        let r = renderer(&[]);
        recording::take();

        r.render_mandelbrot_to_texture(32.0, 24.0, 0.003);
        let calls = recording::take();
        assert_eq!(count(&calls, |c| *c == Call::Flush), 1);
        assert_eq!(count(&calls, |c| *c == Call::Finish), 1);

        r.render_frame(32.0, 24.0, 0.003, 0.0, 0.0);
        let calls = recording::take();
        assert_eq!(count(&calls, |c| *c == Call::Flush), 1);
        assert_eq!(count(&calls, |c| *c == Call::Finish), 1);
        assert_eq!(count(&calls, |c| *c == Call::Clear), 1);
    }

    #[test]
    fn time_counts_from_the_clock_start() {
        let started = Instant::now() - Duration::from_secs(5);
        let r = renderer_with(FrameClock::since(started), &[]);
        recording::take();

        r.render_frame(32.0, 24.0, 0.003, 0.0, 0.0);
        let time = recording::location_of("time");
        let value = recording::take().into_iter().find_map(|c| match c {
            Call::Uniform(loc, v) if loc == time => Some(v[0]),
            _ => None,
        });
        assert!(value.unwrap() >= 5.0);
    }

    #[test]
    fn quad_is_four_homogeneous_vertices() {
        assert_eq!(QUAD_VERTICES.len(), (QUAD_VERTEX_COUNT * QUAD_COMPONENTS) as usize);
        assert_eq!(QUAD_STRIDE, 16);
        for vertex in QUAD_VERTICES.chunks(4) {
            assert_eq!(vertex[3], 1.0);
            assert!(vertex[0].abs() == 1.0 && vertex[1].abs() == 1.0);
        }
    }

    #[test]
    fn quad_winds_around_the_screen() {
        // Consecutive fan vertices differ in exactly one axis
        let corners: Vec<&[f32]> = QUAD_VERTICES.chunks(4).collect();
        for i in 0..4 {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            let changed = (a[0] != b[0]) as u32 + (a[1] != b[1]) as u32;
            assert_eq!(changed, 1);
        }
    }

    #[test]
    fn time_truncates_to_hundredths() {
        assert_eq!(quantize(Duration::from_millis(0)), 0.0);
        assert_eq!(quantize(Duration::from_millis(9)), 0.0);
        assert_eq!(quantize(Duration::from_millis(1234)), 1.23);
        assert_eq!(quantize(Duration::from_secs(90)), 90.0);
    }

    #[test]
    fn time_never_goes_backwards() {
        let clock = FrameClock::start();
        let mut last = clock.seconds();
        for _ in 0..10_000 {
            let now = clock.seconds();
            assert!(now >= last);
            last = now;
        }
    }
}
