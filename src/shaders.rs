//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Shader loading, compiling and program linking
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::ffi::{CStr, CString};
use std::fs;
use std::path::Path;
use std::ptr;

use log::info;

use crate::error::{ShaderError, ShaderStage};
use crate::gl::{self, types::*, Gles2};

pub static VERTEX_SHADER_FILE: &str = "vshader.vert";
pub static JULIA_SHADER_FILE: &str = "julia.frag";
pub static MANDELBROT_SHADER_FILE: &str = "mandelbrot.frag";

//----------------------------------------------------------------------------

/// Shader source text, read once at startup.
#[derive(Debug)]
pub struct ShaderSources {
    pub vertex: String,
    pub julia: String,
    pub mandelbrot: String,
}

impl ShaderSources {
    pub fn load(dir: &Path) -> Result<ShaderSources, ShaderError> {
        Ok(ShaderSources {
            vertex: read_source(dir, VERTEX_SHADER_FILE)?,
            julia: read_source(dir, JULIA_SHADER_FILE)?,
            mandelbrot: read_source(dir, MANDELBROT_SHADER_FILE)?,
        })
    }
}

fn read_source(dir: &Path, name: &str) -> Result<String, ShaderError> {
    let path = dir.join(name);
    fs::read_to_string(&path).map_err(|e| ShaderError::Missing { path: path, source: e })
}

//----------------------------------------------------------------------------

/// A resolved uniform slot. GL reports unknown names as -1, which never
/// makes it into one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(GLint);

impl UniformLocation {
    pub fn from_raw(raw: GLint) -> Option<UniformLocation> {
        if raw >= 0 { Some(UniformLocation(raw)) } else { None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttribLocation(GLuint);

impl AttribLocation {
    pub fn from_raw(raw: GLint) -> Option<AttribLocation> {
        if raw >= 0 { Some(AttribLocation(raw as GLuint)) } else { None }
    }

    pub fn index(self) -> GLuint {
        self.0
    }
}

pub fn set_float(gl: &Gles2, loc: Option<UniformLocation>, v: f32) {
    if let Some(UniformLocation(l)) = loc {
        unsafe { gl.Uniform1f(l, v) };
    }
}

pub fn set_int(gl: &Gles2, loc: Option<UniformLocation>, v: i32) {
    if let Some(UniformLocation(l)) = loc {
        unsafe { gl.Uniform1i(l, v) };
    }
}

pub fn set_vec2(gl: &Gles2, loc: Option<UniformLocation>, x: f32, y: f32) {
    if let Some(UniformLocation(l)) = loc {
        unsafe { gl.Uniform2f(l, x, y) };
    }
}

pub fn set_vec4(gl: &Gles2, loc: Option<UniformLocation>, v: [f32; 4]) {
    if let Some(UniformLocation(l)) = loc {
        unsafe { gl.Uniform4f(l, v[0], v[1], v[2], v[3]) };
    }
}

//----------------------------------------------------------------------------

fn compile(gl: &Gles2, stage: ShaderStage, name: &str, source: &str) -> Result<GLuint, ShaderError> {
    let src = CString::new(source).map_err(|_| ShaderError::Nul { name: name.to_string() })?;
    let kind = match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    };

    let (id, status, log) = unsafe {
        let id = gl.CreateShader(kind);
        gl.ShaderSource(id, 1, &src.as_ptr(), ptr::null());
        gl.CompileShader(id);
        gl::check(gl);

        let mut status = 0;
        gl.GetShaderiv(id, gl::COMPILE_STATUS, &mut status);
        (id, status, shader_log(gl, id))
    };

    // Always show the compile log
    info!("{}:shader {}:\n{}", id, name, log);

    if status == gl::FALSE as GLint {
        return Err(ShaderError::Compile { stage: stage, name: name.to_string(), log: log });
    }
    Ok(id)
}

unsafe fn shader_log(gl: &Gles2, id: GLuint) -> String {
    let mut len = 0;
    gl.GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
    let mut buf = vec![0u8; len.max(1) as usize];
    let mut written = 0;
    gl.GetShaderInfoLog(id, buf.len() as GLsizei, &mut written, buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn program_log(gl: &Gles2, id: GLuint) -> String {
    let mut len = 0;
    gl.GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len);
    let mut buf = vec![0u8; len.max(1) as usize];
    let mut written = 0;
    gl.GetProgramInfoLog(id, buf.len() as GLsizei, &mut written, buf.as_mut_ptr() as *mut GLchar);
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

//----------------------------------------------------------------------------

pub struct Program {
    id: GLuint,
}

impl Program {
    fn link(gl: &Gles2, name: &str, vshader: GLuint, fshader: GLuint) -> Result<Program, ShaderError> {
        let (id, status, log) = unsafe {
            let id = gl.CreateProgram();
            gl.AttachShader(id, vshader);
            gl.AttachShader(id, fshader);
            gl.LinkProgram(id);
            gl::check(gl);

            let mut status = 0;
            gl.GetProgramiv(id, gl::LINK_STATUS, &mut status);
            (id, status, program_log(gl, id))
        };

        info!("{}:program {}:\n{}", id, name, log);

        if status == gl::FALSE as GLint {
            return Err(ShaderError::Link { name: name.to_string(), log: log });
        }
        Ok(Program { id: id })
    }

    pub fn uniform(&self, gl: &Gles2, name: &CStr) -> Option<UniformLocation> {
        let loc = UniformLocation::from_raw(unsafe { gl.GetUniformLocation(self.id, name.as_ptr()) });
        if loc.is_none() {
            info!("program {}: no uniform {:?}", self.id, name);
        }
        loc
    }

    pub fn attribute(&self, gl: &Gles2, name: &CStr) -> Option<AttribLocation> {
        let loc = AttribLocation::from_raw(unsafe { gl.GetAttribLocation(self.id, name.as_ptr()) });
        if loc.is_none() {
            info!("program {}: no attribute {:?}", self.id, name);
        }
        loc
    }

    pub fn bind(&self, gl: &Gles2) {
        unsafe { gl.UseProgram(self.id) };
        gl::check(gl);
    }
}

//----------------------------------------------------------------------------

/// Renders the Julia view to the screen, sampling the Mandelbrot texture.
pub struct JuliaProgram {
    pub program: Program,
    pub vertex: Option<AttribLocation>,
    pub color: Option<UniformLocation>,
    pub scale: Option<UniformLocation>,
    pub offset: Option<UniformLocation>,
    pub tex: Option<UniformLocation>,
    pub centre: Option<UniformLocation>,
    pub time: Option<UniformLocation>,
}

impl JuliaProgram {
    fn resolve(gl: &Gles2, program: Program) -> JuliaProgram {
        JuliaProgram {
            vertex: program.attribute(gl, c"vertex"),
            color: program.uniform(gl, c"color"),
            scale: program.uniform(gl, c"scale"),
            offset: program.uniform(gl, c"offset"),
            tex: program.uniform(gl, c"tex"),
            centre: program.uniform(gl, c"centre"),
            time: program.uniform(gl, c"time"),
            program: program,
        }
    }
}

/// Renders the Mandelbrot set into the offscreen texture.
pub struct MandelbrotProgram {
    pub program: Program,
    pub vertex: Option<AttribLocation>,
    pub scale: Option<UniformLocation>,
    pub offset: Option<UniformLocation>,
    pub centre: Option<UniformLocation>,
}

impl MandelbrotProgram {
    fn resolve(gl: &Gles2, program: Program) -> MandelbrotProgram {
        MandelbrotProgram {
            vertex: program.attribute(gl, c"vertex"),
            scale: program.uniform(gl, c"scale"),
            offset: program.uniform(gl, c"offset"),
            centre: program.uniform(gl, c"centre"),
            program: program,
        }
    }
}

pub struct Programs {
    pub julia: JuliaProgram,
    pub mandelbrot: MandelbrotProgram,
}

/// Compiles the shared vertex shader and both fragment shaders, then links
/// the two programs and resolves their handles.
pub fn build(gl: &Gles2, sources: &ShaderSources) -> Result<Programs, ShaderError> {
    let vshader = compile(gl, ShaderStage::Vertex, VERTEX_SHADER_FILE, &sources.vertex)?;
    let jshader = compile(gl, ShaderStage::Fragment, JULIA_SHADER_FILE, &sources.julia)?;
    let mshader = compile(gl, ShaderStage::Fragment, MANDELBROT_SHADER_FILE, &sources.mandelbrot)?;

    let julia = Program::link(gl, "julia", vshader, jshader)?;
    let julia = JuliaProgram::resolve(gl, julia);

    let mandelbrot = Program::link(gl, "mandelbrot", vshader, mshader)?;
    let mandelbrot = MandelbrotProgram::resolve(gl, mandelbrot);
    gl::check(gl);

    Ok(Programs { julia: julia, mandelbrot: mandelbrot })
}

//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shipped() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders")
    }

    #[test]
    fn negative_locations_are_absent() {
        assert_eq!(UniformLocation::from_raw(-1), None);
        assert_eq!(UniformLocation::from_raw(0), Some(UniformLocation(0)));
        assert_eq!(AttribLocation::from_raw(-1), None);
        assert_eq!(AttribLocation::from_raw(3).map(|a| a.index()), Some(3));
    }

    #[test]
    fn loads_all_three_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_SHADER_FILE), "vert").unwrap();
        fs::write(dir.path().join(JULIA_SHADER_FILE), "julia").unwrap();
        fs::write(dir.path().join(MANDELBROT_SHADER_FILE), "mandel").unwrap();

        let sources = ShaderSources::load(dir.path()).unwrap();
        assert_eq!(sources.vertex, "vert");
        assert_eq!(sources.julia, "julia");
        assert_eq!(sources.mandelbrot, "mandel");
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(VERTEX_SHADER_FILE), "vert").unwrap();
        fs::write(dir.path().join(MANDELBROT_SHADER_FILE), "mandel").unwrap();

        match ShaderSources::load(dir.path()) {
            Err(ShaderError::Missing { path, .. }) => assert!(path.ends_with(JULIA_SHADER_FILE)),
            other => panic!("expected missing julia.frag, got {:?}", other),
        }
    }

    #[test]
    fn shipped_shaders_declare_expected_inputs() {
        let sources = ShaderSources::load(&shipped()).unwrap();

        assert!(sources.vertex.contains("attribute vec4 vertex"));
        for name in ["color", "scale", "offset", "tex", "centre", "time"] {
            assert!(sources.julia.contains(&format!(" {};", name)), "julia.frag lacks {}", name);
        }
        for name in ["scale", "offset", "centre"] {
            assert!(sources.mandelbrot.contains(&format!(" {};", name)), "mandelbrot.frag lacks {}", name);
        }
    }
}
