//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Non-blocking keyboard poller reading a Linux event device
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::protocol::{InputEvent, InputStatus, EVENT_SIZE, EV_KEY};

//----------------------------------------------------------------------------

type Opener<R> = Box<dyn FnOnce() -> io::Result<R>>;

enum Source<R> {
    Pending(Opener<R>),
    Open(R),
    Unavailable,
}

pub struct KeyboardPoller<R> {
    source: Source<R>,
    quit_key: u16,
}

impl KeyboardPoller<File> {
    /// Opens `path` read-only and non-blocking on the first poll.
    pub fn device(path: &Path, quit_key: u16) -> KeyboardPoller<File> {
        let path: PathBuf = path.to_path_buf();
        KeyboardPoller::lazy(move || {
            OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NONBLOCK)
                .open(&path)
                .map_err(|e| io::Error::new(e.kind(), format!("cannot open {}: {}", path.display(), e)))
        }, quit_key)
    }
}

impl<R: Read> KeyboardPoller<R> {
    pub fn lazy<F>(opener: F, quit_key: u16) -> KeyboardPoller<R>
        where F: FnOnce() -> io::Result<R> + 'static
    {
        KeyboardPoller { source: Source::Pending(Box::new(opener)), quit_key: quit_key }
    }

    pub fn from_reader(reader: R, quit_key: u16) -> KeyboardPoller<R> {
        KeyboardPoller { source: Source::Open(reader), quit_key: quit_key }
    }

    /// Attempts a single read of one event record.
    pub fn poll(&mut self) -> InputStatus {
        if let Source::Pending(_) = self.source {
            self.open();
        }

        let reader = match self.source {
            Source::Open(ref mut r) => r,
            // No device: keep spinning without events
            _ => return InputStatus::Idle,
        };

        let mut record = [0u8; EVENT_SIZE];
        match reader.read(&mut record) {
            Ok(n) if n == EVENT_SIZE => {},
            Ok(n) => {
                warn!("keyboard: short read of {} bytes (expected {})", n, EVENT_SIZE);
                return InputStatus::DeviceLost;
            },
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock
                       || e.kind() == io::ErrorKind::Interrupted => return InputStatus::Idle,
            Err(e) => {
                warn!("keyboard: read failed: {}", e);
                return InputStatus::DeviceLost;
            },
        }

        let ev = InputEvent::decode(&record);
        if ev.key_state().is_some() {
            info!("{}", ev);
        }

        if ev.kind == EV_KEY && ev.code == self.quit_key {
            InputStatus::Quit
        } else {
            InputStatus::Event(ev)
        }
    }

    fn open(&mut self) {
        let pending = std::mem::replace(&mut self.source, Source::Unavailable);
        if let Source::Pending(opener) = pending {
            match opener() {
                Ok(r) => self.source = Source::Open(r),
                Err(e) => error!("{}", e),
            }
        }
    }
}

//----------------------------------------------------------------------------
