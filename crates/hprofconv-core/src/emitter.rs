//! # Emitter
//!
//! Writes the legacy ASCII heap dump grammar.
//!
//! ```text
//! JAVA PROFILE 1.0.1, created Sun Mar  9 20:47:24 2008
//! <fixed banner>
//! HEAP DUMP BEGIN (0 objects, 0 bytes) Sun Mar  9 20:47:24 2008
//! ROOT 7f0010 (kind=<unknown>)
//! CLS 7f0100 (name=java.lang.Thread, trace=0)
//!         super   7f0200
//! OBJ 7f1000 (sz=24, trace=0, class=java.lang.Thread@7f0100)
//!         name    7f2000
//! ARR 7f3000 (sz=48, trace=0, nelems=2, elem type=java.lang.Object@7f0300)
//!         [0]     7f1000
//! HEAP DUMP END
//! ```
//!
//! Sub-lines are tab separated. Identifiers are bare lowercase hex.
//!
//! Besides the dump file there is a console stream for side output that is
//! not part of the dump grammar: resolved strings (`S: ...`), char array
//! dumps and string table dumps.

use std::io::{self, Write};

use crate::error::ConvertResult;
use crate::header::Header;
use crate::types::{FieldType, Id};

/// Fixed text following the first banner line.
const BANNER: &str = include_str!("banner.txt");

/// ASCII format version announced in the banner.
const ASCII_VERSION: &str = "JAVA PROFILE 1.0.1";

/// Date layout used by the banner and the `HEAP DUMP BEGIN` line.
const BANNER_DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Kind of a GC root, with the data its `ROOT` line shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind<'a>
{
    /// Root of unknown origin
    Unknown,
    /// Thread object, with its thread sequence number
    Thread
    {
        /// Thread serial number
        sequence: u32,
    },
    /// JNI global reference
    JniGlobal,
    /// Local variable in a Java frame
    JavaFrame
    {
        /// Thread serial number
        thread: u32,
    },
    /// Class held by the system class loader
    SystemClass
    {
        /// Resolved class name
        name: &'a str,
    },
    /// Reference from a thread block
    ThreadBlock
    {
        /// Thread serial number (printed in decimal)
        thread: i32,
    },
    /// Object used as a monitor
    BusyMonitor,
}

/// Writer for the dump file and the console side stream
///
/// When no dump writer is configured every dump method is a no-op, so the
/// decoder can call them unconditionally.
pub struct Emitter<'w>
{
    out: Option<&'w mut dyn Write>,
    console: &'w mut dyn Write,
}

impl std::fmt::Debug for Emitter<'_>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Emitter").field("out", &self.out.is_some()).finish_non_exhaustive()
    }
}

impl<'w> Emitter<'w>
{
    /// Create an emitter that only writes console side output.
    pub fn new(console: &'w mut dyn Write) -> Self
    {
        Self { out: None, console }
    }

    /// Attach the dump file writer.
    #[must_use]
    pub fn with_output(mut self, out: &'w mut dyn Write) -> Self
    {
        self.out = Some(out);
        self
    }

    /// Whether a dump writer is attached.
    #[must_use]
    pub fn is_enabled(&self) -> bool
    {
        self.out.is_some()
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) -> ConvertResult<()>
    {
        if let Some(out) = self.out.as_mut() {
            out.write_fmt(args)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn console_line(&mut self, args: std::fmt::Arguments<'_>) -> ConvertResult<()>
    {
        self.console.write_fmt(args)?;
        self.console.write_all(b"\n")?;
        Ok(())
    }

    /// Banner and `HEAP DUMP BEGIN` marker.
    pub fn begin(&mut self, header: &Header) -> ConvertResult<()>
    {
        let created = header
            .created()
            .map_or_else(|| "unknown".to_string(), |t| t.format(BANNER_DATE_FORMAT).to_string());
        self.line(format_args!("{ASCII_VERSION}, created {created}"))?;
        self.line(format_args!(""))?;
        if let Some(out) = self.out.as_mut() {
            out.write_all(BANNER.as_bytes())?;
        }
        self.line(format_args!(""))?;
        self.line(format_args!("HEAP DUMP BEGIN (0 objects, 0 bytes) {created}"))
    }

    /// `HEAP DUMP END` marker. Only written after both passes succeed.
    pub fn end(&mut self) -> ConvertResult<()>
    {
        self.line(format_args!("HEAP DUMP END"))?;
        self.flush()?;
        Ok(())
    }

    /// Flush both streams.
    pub fn flush(&mut self) -> io::Result<()>
    {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        self.console.flush()
    }

    /// `ROOT` line.
    pub fn root(&mut self, id: Id, kind: RootKind<'_>) -> ConvertResult<()>
    {
        match kind {
            RootKind::Unknown => self.line(format_args!("ROOT {id} (kind=<unknown>)")),
            RootKind::Thread { sequence } => {
                self.line(format_args!("ROOT {id} (kind=<thread>, id={sequence:x}, trace=0)"))
            }
            RootKind::JniGlobal => self.line(format_args!("ROOT {id} (kind=<JNI global ref>, id=0, trace=0)")),
            RootKind::JavaFrame { thread } => {
                self.line(format_args!("ROOT {id} (kind=<Java stack>, thread={thread:x}, frame=0)"))
            }
            RootKind::SystemClass { name } => self.line(format_args!("ROOT {id} (kind=<system class>, name={name})")),
            RootKind::ThreadBlock { thread } => {
                self.line(format_args!("ROOT {id} (kind=<thread block>, thread={thread})"))
            }
            RootKind::BusyMonitor => self.line(format_args!("ROOT {id} (kind=<busy monitor>)")),
        }
    }

    /// `CLS` header line.
    pub fn class(&mut self, id: Id, name: &str) -> ConvertResult<()>
    {
        self.line(format_args!("CLS {id} (name={name}, trace=0)"))
    }

    /// `super`, `loader` or `domain` line under a `CLS` block.
    pub fn class_reference(&mut self, label: &str, id: Id) -> ConvertResult<()>
    {
        self.line(format_args!("\t{label}\t{id}"))
    }

    /// Object-typed static field under a `CLS` block.
    pub fn static_field(&mut self, name: &str, id: Id) -> ConvertResult<()>
    {
        self.line(format_args!("\tstatic {name}\t{id}"))
    }

    /// `OBJ` header line.
    pub fn object(&mut self, id: Id, size: u64, class_name: &str, class_id: Id) -> ConvertResult<()>
    {
        self.line(format_args!("OBJ {id} (sz={size}, trace=0, class={class_name}@{class_id})"))
    }

    /// Object reference field under an `OBJ` block.
    pub fn field(&mut self, name: &str, id: Id) -> ConvertResult<()>
    {
        self.line(format_args!("\t{name}\t{id}"))
    }

    /// `ARR` header line for an object array.
    pub fn object_array(&mut self, id: Id, size: u64, count: u32, class_name: &str, class_id: Id)
        -> ConvertResult<()>
    {
        self.line(format_args!(
            "ARR {id} (sz={size}, trace=0, nelems={count}, elem type={class_name}@{class_id})"
        ))
    }

    /// Non-null element under an object array's `ARR` block.
    pub fn element(&mut self, index: u32, id: Id) -> ConvertResult<()>
    {
        self.line(format_args!("\t[{index}]\t{id}"))
    }

    /// `ARR` header line for a primitive array.
    pub fn primitive_array(&mut self, id: Id, size: u64, count: u32, element_type: FieldType) -> ConvertResult<()>
    {
        self.line(format_args!(
            "ARR {id} (sz={size}, trace=0, nelems={count}, elem type={element_type})"
        ))
    }

    /// Resolved string, on the console.
    pub fn string(&mut self, id: Id, text: &str) -> ConvertResult<()>
    {
        self.console_line(format_args!("S: {id} {text}"))
    }

    /// Char array contents, on the console.
    ///
    /// First line: id, text, unit count and each code unit in hex.
    /// Second line: the raw payload bytes in hex.
    pub fn char_array(&mut self, id: Id, units: &[u16], raw: &[u8]) -> ConvertResult<()>
    {
        let text = String::from_utf16_lossy(units);
        write!(self.console, "{id}: {text} // {} ", units.len())?;
        for unit in units {
            write!(self.console, "{unit:x} ")?;
        }
        writeln!(self.console)?;
        for byte in raw {
            write!(self.console, "{byte:x} ")?;
        }
        writeln!(self.console)?;
        Ok(())
    }

    /// String table entry, on the console.
    pub fn name(&mut self, id: Id, text: &str) -> ConvertResult<()>
    {
        self.console_line(format_args!("name {id} {text}"))
    }
}
