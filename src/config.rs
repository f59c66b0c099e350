//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Command-line configuration
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::protocol::KEY_Q;

pub static DEFAULT_KEYBOARD: &str = "/dev/input/by-id/usb-_USB_Keyboard-event-kbd";
pub const DEFAULT_SCALE: f32 = 0.003;

//----------------------------------------------------------------------------

/// Julia set animation over a Mandelbrot texture, for the Raspberry Pi.
///
/// Run with no arguments to read shaders from the working directory and
/// quit on `q` from the USB keyboard.
#[derive(Debug, Parser)]
#[command(name = "mandelpi", version)]
pub struct Config {
    /// Directory holding vshader.vert, julia.frag and mandelbrot.frag
    #[arg(long, default_value = ".")]
    pub shader_dir: PathBuf,

    /// Keyboard event device node
    #[arg(long, default_value = DEFAULT_KEYBOARD)]
    pub keyboard: PathBuf,

    /// Linux key code that ends the program
    #[arg(long, default_value_t = KEY_Q)]
    pub quit_key: u16,

    /// Fractal scale, in complex units per pixel
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f32,
}

//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults_match_the_stock_setup() {
        let config = Config::try_parse_from(["mandelpi"]).unwrap();
        assert_eq!(config.shader_dir, Path::new("."));
        assert_eq!(config.keyboard, Path::new(DEFAULT_KEYBOARD));
        assert_eq!(config.quit_key, 16);
        assert_eq!(config.scale, 0.003);
    }

    #[test]
    fn overrides() {
        let config = Config::try_parse_from([
            "mandelpi", "--shader-dir", "shaders", "--keyboard", "/dev/input/event0",
            "--quit-key", "1", "--scale", "0.01",
        ]).unwrap();
        assert_eq!(config.shader_dir, Path::new("shaders"));
        assert_eq!(config.keyboard, Path::new("/dev/input/event0"));
        assert_eq!(config.quit_key, 1);
        assert_eq!(config.scale, 0.01);
    }

    #[test]
    fn rejects_bad_key_codes() {
        assert!(Config::try_parse_from(["mandelpi", "--quit-key", "-3"]).is_err());
    }
}
