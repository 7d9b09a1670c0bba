//! # Top-level Records
//!
//! Walks the record stream following the file header. Every record is framed
//! as:
//!
//! ```text
//! u8 tag | u32 time offset | u32 body length | body
//! ```
//!
//! The body is carved out as its own region before decoding, so a record that
//! is skipped, or decoded only partly, never desynchronises the stream.

use tracing::{debug, error, trace};

use crate::context::DumpContext;
use crate::converter::{ConvertOptions, Pass};
use crate::cursor::Cursor;
use crate::emitter::Emitter;
use crate::error::{ConvertError, ConvertResult};
use crate::heap::HeapRecordProcessor;

/// Text stored for a string record whose contents could not be allocated.
pub const OUT_OF_MEMORY_TEXT: &str = "__out_of_memory_error__";

/// Top-level record tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordTag
{
    Utf8 = 0x01,
    LoadClass = 0x02,
    UnloadClass = 0x03,
    StackFrame = 0x04,
    StackTrace = 0x05,
    AllocSites = 0x06,
    HeapSummary = 0x07,
    StartThread = 0x0a,
    EndThread = 0x0b,
    HeapDump = 0x0c,
    CpuSamples = 0x0d,
    ControlSettings = 0x0e,
    LockStatsWaitTime = 0x10,
    LockStatsHoldTime = 0x11,
    HeapDumpSegment = 0x1c,
    HeapDumpEnd = 0x2c,
}

impl RecordTag
{
    /// Classify a record tag, `None` for tags outside the format.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self>
    {
        Some(match tag {
            0x01 => RecordTag::Utf8,
            0x02 => RecordTag::LoadClass,
            0x03 => RecordTag::UnloadClass,
            0x04 => RecordTag::StackFrame,
            0x05 => RecordTag::StackTrace,
            0x06 => RecordTag::AllocSites,
            0x07 => RecordTag::HeapSummary,
            0x0a => RecordTag::StartThread,
            0x0b => RecordTag::EndThread,
            0x0c => RecordTag::HeapDump,
            0x0d => RecordTag::CpuSamples,
            0x0e => RecordTag::ControlSettings,
            0x10 => RecordTag::LockStatsWaitTime,
            0x11 => RecordTag::LockStatsHoldTime,
            0x1c => RecordTag::HeapDumpSegment,
            0x2c => RecordTag::HeapDumpEnd,
            _ => return None,
        })
    }
}

/// Decode string record contents, degrading to [`OUT_OF_MEMORY_TEXT`] when
/// the buffer cannot be allocated. Invalid UTF-8 is replaced, not rejected.
fn decode_text(bytes: &[u8]) -> String
{
    let mut owned = Vec::new();
    if owned.try_reserve_exact(bytes.len()).is_err() {
        error!(len = bytes.len(), "out of memory reading string record");
        return OUT_OF_MEMORY_TEXT.to_string();
    }
    owned.extend_from_slice(bytes);
    match String::from_utf8(owned) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Drives one pass over the record stream
pub struct TopLevelDispatcher<'a, 'w>
{
    ctx: &'a mut DumpContext,
    emitter: &'a mut Emitter<'w>,
    options: &'a ConvertOptions,
    pass: Pass,
}

impl<'a, 'w> TopLevelDispatcher<'a, 'w>
{
    pub fn new(ctx: &'a mut DumpContext, emitter: &'a mut Emitter<'w>, options: &'a ConvertOptions, pass: Pass)
        -> Self
    {
        Self {
            ctx,
            emitter,
            options,
            pass,
        }
    }

    /// Dispatch records until `cursor` is exhausted.
    ///
    /// `cursor` must be positioned right after the file header.
    ///
    /// ## Errors
    ///
    /// - [`ConvertError::TruncatedRecord`] when a body runs past end of input
    /// - [`ConvertError::SegmentedHeapDump`] for segmented heap dumps
    /// - any error raised while decoding a heap dump
    pub fn run(&mut self, cursor: &mut Cursor<'_>) -> ConvertResult<()>
    {
        while !cursor.is_empty() {
            let offset = cursor.offset();
            let tag = cursor.read_u8()?;
            let _time = cursor.read_u32()?;
            let declared = cursor.read_u32()? as usize;

            let available = cursor.remaining();
            let mut body = cursor.split(declared).map_err(|_| ConvertError::TruncatedRecord {
                tag,
                offset,
                declared,
                available,
            })?;

            match RecordTag::from_u8(tag) {
                Some(RecordTag::Utf8) => self.string_record(&mut body)?,
                Some(RecordTag::LoadClass) => self.load_class(&mut body)?,
                Some(RecordTag::HeapDump) => {
                    debug!(pass = ?self.pass, offset, len = declared, "heap dump record");
                    HeapRecordProcessor::new(self.ctx, self.emitter, self.options, self.pass).process(&mut body)?;
                }
                Some(RecordTag::HeapDumpSegment | RecordTag::HeapDumpEnd) => {
                    return Err(ConvertError::SegmentedHeapDump { tag, offset });
                }
                kind => {
                    trace!(tag, ?kind, offset, len = declared, "skipping record");
                    if self.pass == Pass::Metadata {
                        self.ctx.counts.skipped += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn string_record(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        if self.pass != Pass::Metadata {
            return Ok(());
        }

        let size = self.ctx.id_size();
        if body.remaining() < size.bytes() {
            debug!(offset = body.offset(), len = body.remaining(), "string record shorter than an id, skipped");
            return Ok(());
        }

        let id = body.read_id(size)?;
        let text = decode_text(body.read_bytes(body.remaining())?);
        if self.options.dump_names {
            self.emitter.name(id, &text)?;
        }
        self.ctx.names.insert(id, text);
        self.ctx.counts.strings += 1;
        Ok(())
    }

    fn load_class(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        if self.pass != Pass::Metadata {
            return Ok(());
        }

        let size = self.ctx.id_size();
        let serial = body.read_u32()?;
        let class_id = body.read_id(size)?;
        let _trace = body.read_u32()?;
        let name_id = body.read_id(size)?;
        trace!(serial, %class_id, %name_id, "class load");

        self.ctx.class_names.insert(class_id, name_id);
        self.ctx.counts.class_loads += 1;
        Ok(())
    }
}
