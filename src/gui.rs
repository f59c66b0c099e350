//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Window controller: setup once, then poll input and draw until told to stop
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::fs::File;

use log::info;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::WindowId;

use crate::config::Config;
use crate::display::Display;
use crate::error::{Error, Result};
use crate::keyboard::KeyboardPoller;
use crate::renderer::{FrameClock, Renderer};
use crate::shaders::{self, ShaderSources};

//----------------------------------------------------------------------------

struct Running {
    display: Display,
    renderer: Renderer,
    centre: (f32, f32),
}

pub struct WindowController {
    config: Config,
    keyboard: KeyboardPoller<File>,
    clock: FrameClock,
    running: Option<Running>,
    error: Option<Error>,
}

impl WindowController {
    pub fn new(config: Config, clock: FrameClock) -> WindowController {
        let keyboard = KeyboardPoller::device(&config.keyboard, config.quit_key);
        WindowController {
            config: config,
            keyboard: keyboard,
            clock: clock,
            running: None,
            error: None,
        }
    }

    /// The error that stopped the loop, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let (display, gl) = Display::open(event_loop)?;

        let sources = ShaderSources::load(&self.config.shader_dir)?;
        let programs = shaders::build(&gl, &sources)?;

        let (w, h) = display.dimensions();
        let renderer = Renderer::new(gl, programs, self.clock, w, h)?;

        // Centre is in pixels, scale maps pixels into the complex plane
        let centre = (w as f32 / 2.0, h as f32 / 2.0);
        renderer.render_mandelbrot_to_texture(centre.0, centre.1, self.config.scale);

        Ok(Running { display: display, renderer: renderer, centre: centre })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for WindowController {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);

        match self.start(event_loop) {
            Ok(running) => {
                let (w, h) = running.renderer.dimensions();
                info!("running at {}x{}, scale {}", w, h, self.config.scale);
                self.running = Some(running);
            },
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let ours = match self.running {
            Some(ref r) => r.display.window_id() == window_id,
            None => false,
        };
        match event {
            WindowEvent::CloseRequested if ours => {
                info!("window closed");
                event_loop.exit();
            },
            _ => {},
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if event_loop.exiting() {
            return;
        }
        let running = match self.running {
            Some(ref r) => r,
            None => return,
        };

        let status = self.keyboard.poll();
        if !status.keep_running() {
            info!("stopping: {:?}", status);
            event_loop.exit();
            return;
        }

        let (cx, cy) = running.centre;
        running.renderer.render_frame(cx, cy, self.config.scale, 0.0, 0.0);
        if let Err(e) = running.display.swap_buffers() {
            self.fail(event_loop, Error::Present(e));
        }
    }
}
