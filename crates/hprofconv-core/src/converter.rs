//! # Converter
//!
//! Two-pass orchestration for one input.
//!
//! ```text
//! header → begin banner
//!   pass 1 (Metadata): string/class-load records, roots, class dumps → CLS/ROOT lines
//!   rewind, re-read header
//!   pass 2 (Emit):     instances and arrays → OBJ/ARR lines
//! HEAP DUMP END → pending string resolution
//! ```
//!
//! Instance records carry raw bytes whose layout is only known once every
//! class dump has been seen, and class dumps may appear after the instances
//! that use them. Running the whole record stream twice is what makes the
//! second pass able to decode every instance.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hprofconv_core::converter::{ConvertOptions, Converter};
//!
//! let converter = Converter::new(ConvertOptions::default().with_resolve_strings(true));
//! let report = converter.convert_file("heap.hprof".as_ref(), &mut std::io::stdout())?;
//! println!("{}", report.counts);
//! # Ok::<(), hprofconv_core::error::ConvertError>(())
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use memmap2::Mmap;
use tracing::{debug, info, info_span, warn};

use crate::context::{DumpContext, RecordCounts};
use crate::cursor::Cursor;
use crate::emitter::Emitter;
use crate::error::ConvertResult;
use crate::header::Header;
use crate::output;
use crate::records::TopLevelDispatcher;

/// One full scan of the record stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass
{
    /// Collect strings, class names and layouts; write roots and classes
    Metadata,
    /// Decode instances and arrays against the collected layouts
    Emit,
}

impl Pass
{
    /// Both passes, in the order they run.
    pub const ALL: [Pass; 2] = [Pass::Metadata, Pass::Emit];

    /// 1-based pass number, as shown in logs.
    #[must_use]
    pub const fn number(self) -> u8
    {
        match self {
            Pass::Metadata => 1,
            Pass::Emit => 2,
        }
    }
}

/// Conversion switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOptions
{
    /// Write the ASCII dump. When off the input is only parsed.
    pub emit_output: bool,
    /// Add object header overhead to reported `sz=` values
    pub include_header_size: bool,
    /// Print every `char[]` to the console
    pub dump_char_arrays: bool,
    /// Print `String` contents to the console
    pub resolve_strings: bool,
    /// Print every string record to the console
    pub dump_names: bool,
}

impl Default for ConvertOptions
{
    fn default() -> Self
    {
        Self {
            emit_output: true,
            include_header_size: true,
            dump_char_arrays: false,
            resolve_strings: false,
            dump_names: false,
        }
    }
}

impl ConvertOptions
{
    #[must_use]
    pub const fn with_emit_output(mut self, enabled: bool) -> Self
    {
        self.emit_output = enabled;
        self
    }

    #[must_use]
    pub const fn with_header_size(mut self, enabled: bool) -> Self
    {
        self.include_header_size = enabled;
        self
    }

    #[must_use]
    pub const fn with_dump_char_arrays(mut self, enabled: bool) -> Self
    {
        self.dump_char_arrays = enabled;
        self
    }

    #[must_use]
    pub const fn with_resolve_strings(mut self, enabled: bool) -> Self
    {
        self.resolve_strings = enabled;
        self
    }

    #[must_use]
    pub const fn with_dump_names(mut self, enabled: bool) -> Self
    {
        self.dump_names = enabled;
        self
    }
}

/// Outcome of converting one input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport
{
    /// Record counts from the metadata pass
    pub counts: RecordCounts,
    /// Where the dump was written, `None` when output is disabled
    pub output_path: Option<PathBuf>,
    /// Wall time of the metadata pass
    pub metadata_pass: Duration,
    /// Wall time of the emit pass
    pub emit_pass: Duration,
    /// `String` instances whose `char[]` never turned up
    pub unresolved_strings: usize,
}

/// Binary to ASCII heap dump converter
#[derive(Debug, Clone, Default)]
pub struct Converter
{
    options: ConvertOptions,
}

impl Converter
{
    #[must_use]
    pub const fn new(options: ConvertOptions) -> Self
    {
        Self { options }
    }

    #[must_use]
    pub const fn options(&self) -> &ConvertOptions
    {
        &self.options
    }

    /// Convert the file at `path`, writing `<path>.txt`.
    ///
    /// The input is memory mapped. An existing output file is kept as
    /// `<path>.txt.prev`. When [`ConvertOptions::emit_output`] is off no file is
    /// created or touched.
    ///
    /// ## Errors
    ///
    /// Any [`ConvertError`](crate::error::ConvertError). Nothing is written for
    /// an input whose header is invalid. A failure after the banner leaves a
    /// partial dump without `HEAP DUMP END`.
    pub fn convert_file(&self, path: &Path, console: &mut dyn Write) -> ConvertResult<ConversionReport>
    {
        let span = info_span!("convert", input = %path.display());
        let _enter = span.enter();

        let file = File::open(path)?;
        // SAFETY: the map is read-only and dropped before returning. Changing the
        // file underneath a running conversion is not supported.
        let map = unsafe { Mmap::map(&file)? };
        debug!(len = map.len(), "input mapped");

        Header::parse(&mut Cursor::new(&map))?;

        if !self.options.emit_output {
            return self.convert_bytes(&map, None, console);
        }

        let output_path = output::output_path_for(path);
        output::rotate_existing(&output_path)?;
        info!(output = %output_path.display(), "writing ASCII heap dump");

        let mut writer = BufWriter::new(File::create(&output_path)?);
        let mut report = self.convert_bytes(&map, Some(&mut writer as &mut dyn Write), console)?;
        writer.flush()?;

        report.output_path = Some(output_path);
        Ok(report)
    }

    /// Convert an in-memory binary dump.
    ///
    /// `out` receives the ASCII dump, `console` the side output (strings,
    /// char arrays, string table).
    ///
    /// ## Errors
    ///
    /// Any [`ConvertError`](crate::error::ConvertError) from decoding or writing.
    pub fn convert_bytes(&self, data: &[u8], out: Option<&mut dyn Write>, console: &mut dyn Write)
        -> ConvertResult<ConversionReport>
    {
        let mut cursor = Cursor::new(data);
        let header = Header::parse(&mut cursor)?;
        debug!(
            magic = header.magic(),
            id_size = %header.id_size(),
            timestamp_ms = header.timestamp_ms(),
            "header"
        );

        let mut ctx = DumpContext::new(header.id_size());
        let emitter = Emitter::new(console);
        let mut emitter = match out {
            Some(out) => emitter.with_output(out),
            None => emitter,
        };

        emitter.begin(&header)?;

        let mut report = ConversionReport::default();
        for pass in Pass::ALL {
            let span = info_span!("pass", number = pass.number());
            let _enter = span.enter();
            let started = Instant::now();

            cursor.rewind();
            Header::parse(&mut cursor)?;
            TopLevelDispatcher::new(&mut ctx, &mut emitter, &self.options, pass).run(&mut cursor)?;

            let elapsed = started.elapsed();
            match pass {
                Pass::Metadata => report.metadata_pass = elapsed,
                Pass::Emit => report.emit_pass = elapsed,
            }
            info!(?pass, ?elapsed, "pass finished");
        }

        emitter.end()?;

        if self.options.resolve_strings {
            let pending = ctx.strings.pending_len();
            report.unresolved_strings = ctx.strings.resolve_pending(&mut emitter)?;
            debug!(pending, unresolved = report.unresolved_strings, "pending strings resolved");
            if report.unresolved_strings > 0 {
                warn!(count = report.unresolved_strings, "strings left without their char array");
            }
        }
        emitter.flush()?;

        report.counts = ctx.counts;
        info!(
            strings = ctx.counts.strings,
            class_loads = ctx.counts.class_loads,
            roots = ctx.counts.roots,
            skipped = ctx.counts.skipped,
            "{}",
            ctx.counts
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_pass_order()
    {
        assert_eq!(Pass::ALL, [Pass::Metadata, Pass::Emit]);
        assert_eq!(Pass::Metadata.number(), 1);
        assert_eq!(Pass::Emit.number(), 2);
    }

    #[test]
    fn test_default_options()
    {
        let options = ConvertOptions::default();
        assert!(options.emit_output);
        assert!(options.include_header_size);
        assert!(!options.dump_char_arrays);
        assert!(!options.resolve_strings);
        assert!(!options.dump_names);
    }

    #[test]
    fn test_option_builders()
    {
        let options = ConvertOptions::default()
            .with_emit_output(false)
            .with_header_size(false)
            .with_dump_char_arrays(true)
            .with_resolve_strings(true)
            .with_dump_names(true);
        assert!(!options.emit_output);
        assert!(!options.include_header_size);
        assert!(options.dump_char_arrays);
        assert!(options.resolve_strings);
        assert!(options.dump_names);
        assert_eq!(Converter::new(options).options(), &options);
    }

    #[test]
    fn test_header_only_input()
    {
        let mut bytes = b"JAVA PROFILE 1.0.2\0".to_vec();
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(&0u64.to_be_bytes());

        let mut out = Vec::new();
        let mut console = Vec::new();
        let report = Converter::default()
            .convert_bytes(&bytes, Some(&mut out as &mut dyn Write), &mut console)
            .unwrap();

        assert_eq!(report.counts, RecordCounts::default());
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("JAVA PROFILE 1.0.1, created Thu Jan  1 00:00:00 1970\n"));
        assert!(text.ends_with("HEAP DUMP BEGIN (0 objects, 0 bytes) Thu Jan  1 00:00:00 1970\nHEAP DUMP END\n"));
        assert!(console.is_empty());
    }
}
