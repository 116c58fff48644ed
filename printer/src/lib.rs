// SPDX-License-Identifier: CC0-1.0

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! # `callchain-printer` — Print-Style Debugging
//!
//! A [`Printer`] writes one line per call: where the call happened, which
//! registered functions it happened in, and the values it was given.
//!
//! ```text
//! src/main.rs[14]: outer(): inner(): in inner
//! ```
//!
//! ## Resolving the reported frame
//!
//! By default the printer reports its immediate caller ([`Caller::Depth`]
//! of 1): the location is the call site captured through `#[track_caller]`
//! and the call chain starts at the innermost frame registered with
//! [`frames::enter`]. Larger depths skip registered frames, which is what a
//! `#[track_caller]` wrapper around the printer wants. An explicit
//! [`Caller::Frame`] reports that frame and its callers instead.
//!
//! When the requested frame cannot be resolved (the depth runs past module
//! scope, or the explicit frame has been popped) the printer degrades to
//! printing the values alone. It never fails for that reason.
//!
//! ## Example
//! ```
//! use std::sync::Arc;
//!
//! use printer::{MemorySink, Printer};
//!
//! let sink = Arc::new(MemorySink::new());
//! let printer = Printer::new().sink(sink.clone());
//!
//! let _outer = frames::enter("app::outer", "app");
//! let _inner = frames::enter("app::inner", "app");
//! printer.print(&[&"in inner"]).expect("write to memory");
//!
//! assert!(sink.contents().ends_with("outer(): inner(): in inner\n"));
//! ```

use std::fmt;
use std::panic::Location;
use std::sync::{Arc, OnceLock};

use config::{PrinterConfig, DEFAULT_SEPARATOR, DEFAULT_TERMINATOR};
use frames::{CallChain, FrameRef, Walk};
use path::LocationTag;

pub mod args;
pub mod sink;

pub use args::{Arg, ArgPack, Debugged, Shown};
pub use sink::{DynSink, MemorySink, Sink, StderrSink, StdoutSink};

/// Errors raised while writing a record.
#[derive(thiserror::Error, Debug)]
pub enum PrintError {
    /// The sink failed to write or flush.
    #[error("Failed to write debug output: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration named a stream the printer does not know.
    #[error("Unknown output stream '{0}'. Supported streams: stderr, stdout")]
    UnknownStream(String),
}

/// Which frame a record reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Levels back from the printer: 1 is the immediate caller, 2 skips the
    /// innermost registered frame, and so on. 0 is treated as 1.
    Depth(usize),
    /// A specific registered frame.
    Frame(FrameRef),
}

impl Default for Caller {
    fn default() -> Self { Caller::Depth(1) }
}

/// Location and call chain of a resolved frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Where the call happened.
    pub tag: LocationTag,
    /// Registered callers, outermost first.
    pub chain: CallChain,
}

/// Print-style debugging with a location and call-chain prefix.
///
/// Cheap to clone; clones share the sink.
#[derive(Clone)]
pub struct Printer {
    caller: Caller,
    max_depth: Option<usize>,
    separator: String,
    terminator: String,
    flush: bool,
    sink: DynSink,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            caller: Caller::default(),
            max_depth: None,
            separator: DEFAULT_SEPARATOR.to_string(),
            terminator: DEFAULT_TERMINATOR.to_string(),
            flush: false,
            sink: Arc::new(StderrSink),
        }
    }
}

impl fmt::Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("caller", &self.caller)
            .field("max_depth", &self.max_depth)
            .field("separator", &self.separator)
            .field("terminator", &self.terminator)
            .field("flush", &self.flush)
            .finish_non_exhaustive()
    }
}

impl Printer {
    /// A printer with the default options, writing to standard error.
    pub fn new() -> Self { Self::default() }

    /// A printer using the defaults from a configuration file.
    pub fn from_config(config: &PrinterConfig) -> Result<Self, PrintError> {
        let sink: DynSink = match config.stream.as_str() {
            "stderr" => Arc::new(StderrSink),
            "stdout" => Arc::new(StdoutSink),
            other => return Err(PrintError::UnknownStream(other.to_string())),
        };
        Ok(Self {
            caller: Caller::default(),
            max_depth: config.max_depth,
            separator: config.separator.clone(),
            terminator: config.terminator.clone(),
            flush: config.flush,
            sink,
        })
    }

    /// Report the frame `depth` levels back; see [`Caller::Depth`].
    pub fn caller_depth(mut self, depth: usize) -> Self {
        self.caller = Caller::Depth(depth);
        self
    }

    /// Report `frame` directly.
    pub fn frame(mut self, frame: FrameRef) -> Self {
        self.caller = Caller::Frame(frame);
        self
    }

    /// Render at most `depth` call-chain entries.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Render the whole call chain.
    pub fn unbounded(mut self) -> Self {
        self.max_depth = None;
        self
    }

    /// Text placed between the tag, chain entries and values.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Text written after each record.
    pub fn terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = terminator.into();
        self
    }

    /// Flush the sink after each record.
    pub fn flush(mut self, flush: bool) -> Self {
        self.flush = flush;
        self
    }

    /// Where records are written.
    pub fn sink(mut self, sink: DynSink) -> Self {
        self.sink = sink;
        self
    }

    /// Configured caller.
    pub fn caller(&self) -> Caller { self.caller }

    /// Resolves the reported frame for a call made at `location`.
    ///
    /// `None` means the frame could not be resolved and only values should
    /// be printed.
    pub fn context(&self, location: &Location<'_>) -> Option<Context> {
        match self.caller {
            Caller::Frame(frame) => {
                let Some(info) = frame.info() else {
                    tracing::debug!(frame = frame.id(), "frame is gone; printing values only");
                    return None;
                };
                Some(Context {
                    tag: LocationTag::resolve(info.file, info.line),
                    chain: frames::call_chain(Some(frame), self.max_depth),
                })
            }
            Caller::Depth(depth) => {
                let start = match frames::walk_back(depth.max(1) - 1) {
                    Walk::Frame(frame) => Some(frame),
                    Walk::Module => None,
                    Walk::PastTop => {
                        tracing::debug!(
                            depth,
                            frames = frames::depth(),
                            "caller depth runs past module scope; printing values only"
                        );
                        return None;
                    }
                };
                Some(Context {
                    tag: LocationTag::from_location(location),
                    chain: frames::call_chain(start, self.max_depth),
                })
            }
        }
    }

    /// Renders one record for a call made at `location`, terminator included.
    pub fn render(&self, location: &Location<'_>, values: &[&dyn fmt::Display]) -> String {
        let mut parts = Vec::new();
        if let Some(context) = self.context(location) {
            parts.push(context.tag.to_string());
            parts.extend(context.chain.iter().map(|name| format!("{}()", name)));
        }
        parts.extend(values.iter().map(|value| value.to_string()));

        let mut record = parts.join(&self.separator);
        record.push_str(&self.terminator);
        record
    }

    /// Prints `values` for the caller of this method.
    #[track_caller]
    pub fn print(&self, values: &[&dyn fmt::Display]) -> Result<(), PrintError> {
        self.print_at(Location::caller(), values)
    }

    /// Prints `values` as if called at `location`.
    pub fn print_at(
        &self,
        location: &Location<'_>,
        values: &[&dyn fmt::Display],
    ) -> Result<(), PrintError> {
        let record = self.render(location, values);
        self.sink.write_str(&record)?;
        if self.flush {
            self.sink.flush()?;
        }
        Ok(())
    }

    /// Prints an argument pack and hands its values back.
    ///
    /// This is what the `debug!` family of macros expands to. Write errors
    /// are logged and otherwise ignored.
    #[track_caller]
    pub fn echo<P: ArgPack>(&self, pack: P) -> P::Output {
        let location = Location::caller();
        if let Err(e) = self.print_at(location, &pack.fields()) {
            tracing::warn!("debug output dropped: {}", e);
        }
        pack.into_output()
    }
}

/// The shared default printer used by `debug!`.
pub fn global() -> &'static Printer {
    static GLOBAL: OnceLock<Printer> = OnceLock::new();
    GLOBAL.get_or_init(Printer::default)
}
