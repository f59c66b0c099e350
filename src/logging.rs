//============================================================================
//
// A Mandelbrot/Julia shader demo in Rust
//
// Logger setup: key events and shader logs on stdout, problems on stderr
//
// Copyright (c) 2014 Gavin Baker <gavinb@antonym.org>
// Published under the MIT license
//
//============================================================================

use env_logger::{Builder, Env, Logger, Target};
use log::{Level, Log, Metadata, Record, SetLoggerError};

//----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

pub fn stream_for(level: Level) -> Stream {
    match level {
        Level::Error | Level::Warn => Stream::Stderr,
        Level::Info | Level::Debug | Level::Trace => Stream::Stdout,
    }
}

fn builder(target: Target) -> Builder {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.target(target);
    builder
}

/// Two env_logger instances sharing one filter, picked per record.
pub struct SplitLogger {
    out: Logger,
    err: Logger,
}

impl SplitLogger {
    pub fn new() -> SplitLogger {
        SplitLogger {
            out: builder(Target::Stdout).build(),
            err: builder(Target::Stderr).build(),
        }
    }

    fn logger_for(&self, level: Level) -> &Logger {
        match stream_for(level) {
            Stream::Stdout => &self.out,
            Stream::Stderr => &self.err,
        }
    }
}

impl Log for SplitLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.logger_for(metadata.level()).enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.logger_for(record.level()).log(record);
    }

    fn flush(&self) {
        self.out.flush();
        self.err.flush();
    }
}

/// Installs the split logger; `RUST_LOG` sets the filter, default `info`.
pub fn init() -> Result<(), SetLoggerError> {
    let logger = SplitLogger::new();
    log::set_max_level(logger.out.filter());
    log::set_boxed_logger(Box::new(logger))
}

//----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problems_go_to_stderr() {
        assert_eq!(stream_for(Level::Error), Stream::Stderr);
        assert_eq!(stream_for(Level::Warn), Stream::Stderr);
    }

    #[test]
    fn chatter_goes_to_stdout() {
        assert_eq!(stream_for(Level::Info), Stream::Stdout);
        assert_eq!(stream_for(Level::Debug), Stream::Stdout);
        assert_eq!(stream_for(Level::Trace), Stream::Stdout);
    }

    #[test]
    fn both_halves_share_the_filter() {
        let logger = SplitLogger::new();
        assert_eq!(logger.out.filter(), logger.err.filter());
    }
}
