//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// EGL display, GLES 2 context and full-screen surface
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::ffi::CString;
use std::ptr;

use glutin::config::{Api, ColorBufferType, Config, ConfigSurfaceTypes, ConfigTemplateBuilder};
use glutin::display::GetGlDisplay;
use glutin::context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version};
use glutin::prelude::*;
use glutin::surface::{Surface, WindowSurface};
use glutin_winit::{ApiPreference, DisplayBuilder, GlWindow};
use log::info;
use raw_window_handle::HasWindowHandle;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowId};

use crate::error::DisplayError;
use crate::gl::{self, Gles2};

pub static BACKGROUND: [f32; 4] = [0.15, 0.25, 0.35, 1.0];

//----------------------------------------------------------------------------

fn template() -> ConfigTemplateBuilder {
    ConfigTemplateBuilder::new()
        .with_buffer_type(ColorBufferType::Rgb { r_size: 8, g_size: 8, b_size: 8 })
        .with_alpha_size(8)
        .with_surface_type(ConfigSurfaceTypes::WINDOW)
        .with_api(Api::GLES2)
}

fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    first_config(configs)
}

// Take the first match, as eglChooseConfig orders them best first. The
// picker cannot return an error, so an empty set aborts setup here, the
// same way any other failed negotiation would.
fn first_config<T>(mut configs: impl Iterator<Item = T>) -> T {
    match configs.next() {
        Some(config) => config,
        None => panic!("no EGL config with 8-bit RGBA window rendering"),
    }
}

//----------------------------------------------------------------------------

/// The window, surface and current context. Created once and never torn
/// down before exit.
pub struct Display {
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
    width: u32,
    height: u32,
}

impl Display {
    pub fn open(event_loop: &ActiveEventLoop) -> Result<(Display, Gles2), DisplayError> {
        let monitor = event_loop.primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or(DisplayError::ScreenSize)?;
        let size = monitor.size();
        info!("screen {}x{}", size.width, size.height);

        let attributes = Window::default_attributes()
            .with_title("mandelpi")
            .with_decorations(false)
            .with_inner_size(size)
            .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));

        let (window, config) = DisplayBuilder::new()
            .with_preference(ApiPreference::PreferEgl)
            .with_window_attributes(Some(attributes))
            .build(event_loop, template(), pick_config)
            .map_err(|e| DisplayError::NoDisplay(e.to_string()))?;
        let window = window.ok_or(DisplayError::NoWindow)?;

        let raw_handle = window.window_handle()?.as_raw();
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
            .build(Some(raw_handle));

        let egl = config.display();
        let not_current = unsafe { egl.create_context(&config, &context_attributes)? };

        let surface_attributes = window.build_surface_attributes(Default::default())?;
        let surface = unsafe { egl.create_window_surface(&config, &surface_attributes)? };
        let context = not_current.make_current(&surface)?;

        let gl = Gles2::load_with(|symbol| {
            match CString::new(symbol) {
                Ok(name) => egl.get_proc_address(name.as_c_str()).cast(),
                Err(_) => ptr::null(),
            }
        });

        unsafe {
            gl.ClearColor(BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], BACKGROUND[3]);
            gl.Clear(gl::COLOR_BUFFER_BIT);
        }
        gl::check(&gl);

        let display = Display {
            context: context,
            surface: surface,
            window: window,
            width: size.width,
            height: size.height,
        };
        Ok((display, gl))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    pub fn swap_buffers(&self) -> glutin::error::Result<()> {
        self.surface.swap_buffers(&self.context)
    }
}

//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_the_best_ranked_config() {
        assert_eq!(first_config(vec![3, 1, 2].into_iter()), 3);
    }

    #[test]
    #[should_panic(expected = "no EGL config")]
    fn empty_config_set_aborts() {
        first_config(Vec::<u32>::new().into_iter());
    }
}
