//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Main entry point
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::process;

use clap::Parser;
use log::error;
use winit::event_loop::EventLoop;

use crate::config::Config;
use crate::gui::WindowController;
use crate::renderer::FrameClock;

mod config;
mod display;
mod error;
mod gl;
mod gui;
mod keyboard;
mod logging;
mod protocol;
mod renderer;
mod shaders;

//----------------------------------------------------------------------------

fn run(config: Config, clock: FrameClock) -> error::Result<()> {
    let event_loop = EventLoop::new()?;

    let mut win_ctrl = WindowController::new(config, clock);
    event_loop.run_app(&mut win_ctrl)?;

    win_ctrl.finish()
}

fn main() {
    let clock = FrameClock::start();

    if let Err(e) = logging::init() {
        eprintln!("logger already installed: {}", e);
    }

    let config = Config::parse();

    if let Err(e) = run(config, clock) {
        error!("{}", e);
        process::exit(1);
    }
}
