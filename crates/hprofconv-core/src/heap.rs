//! # Heap Dump Sub-records
//!
//! Decodes the sub-records inside one heap-dump record.
//!
//! The same routine runs in both passes:
//!
//! - [`Pass::Metadata`]: GC roots and class dumps are written out, class
//!   layouts go into the [`ClassTable`](crate::tables::ClassTable), instance
//!   and array payloads are skipped.
//! - [`Pass::Emit`]: class dumps and roots are skipped, instances are resolved
//!   against the class layouts and written together with arrays.
//!
//! Every sub-record is fully framed in both passes, so the two passes always
//! agree on where each record starts.
//!
//! ## Instance layout
//!
//! An instance dump only carries raw field bytes. Their layout is the leaf
//! class's own fields in declaration order, then its superclass's own fields,
//! and so on up to the class whose superclass id is 0.

use tracing::{debug, error, trace};

use crate::context::DumpContext;
use crate::converter::{ConvertOptions, Pass};
use crate::cursor::Cursor;
use crate::emitter::{Emitter, RootKind};
use crate::error::{ConvertError, ConvertResult};
use crate::strings::{decode_utf16_be, is_string_class, STRING_VALUE_FIELD};
use crate::types::{ClassInfo, FieldList, FieldSpec, FieldType, Id};

/// Instance and array records between two progress log lines.
const PROGRESS_INTERVAL: u64 = 10_000;

/// GC root sub-record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RootTag
{
    /// Root of unknown origin
    Unknown = 0xff,
    /// JNI global reference
    JniGlobal = 0x01,
    /// JNI local reference
    JniLocal = 0x02,
    /// Java stack frame local
    JavaFrame = 0x03,
    /// Native stack reference
    NativeStack = 0x04,
    /// System class
    StickyClass = 0x05,
    /// Thread block reference
    ThreadBlock = 0x06,
    /// Busy monitor
    MonitorUsed = 0x07,
    /// Thread object
    ThreadObject = 0x08,
}

/// Heap dump sub-record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubRecordTag
{
    /// Any GC root
    Root(RootTag),
    /// Class layout and statics (0x20)
    ClassDump,
    /// One object's field bytes (0x21)
    InstanceDump,
    /// Array of references (0x22)
    ObjectArrayDump,
    /// Array of primitives (0x23)
    PrimitiveArrayDump,
}

impl SubRecordTag
{
    /// Classify a sub-record tag, `None` for tags outside the format.
    #[must_use]
    pub const fn from_u8(tag: u8) -> Option<Self>
    {
        Some(match tag {
            0xff => SubRecordTag::Root(RootTag::Unknown),
            0x01 => SubRecordTag::Root(RootTag::JniGlobal),
            0x02 => SubRecordTag::Root(RootTag::JniLocal),
            0x03 => SubRecordTag::Root(RootTag::JavaFrame),
            0x04 => SubRecordTag::Root(RootTag::NativeStack),
            0x05 => SubRecordTag::Root(RootTag::StickyClass),
            0x06 => SubRecordTag::Root(RootTag::ThreadBlock),
            0x07 => SubRecordTag::Root(RootTag::MonitorUsed),
            0x08 => SubRecordTag::Root(RootTag::ThreadObject),
            0x20 => SubRecordTag::ClassDump,
            0x21 => SubRecordTag::InstanceDump,
            0x22 => SubRecordTag::ObjectArrayDump,
            0x23 => SubRecordTag::PrimitiveArrayDump,
            _ => return None,
        })
    }
}

/// Decoder for the body of one heap-dump record
pub struct HeapRecordProcessor<'a, 'w>
{
    ctx: &'a mut DumpContext,
    emitter: &'a mut Emitter<'w>,
    options: &'a ConvertOptions,
    pass: Pass,
    processed: u64,
}

impl<'a, 'w> HeapRecordProcessor<'a, 'w>
{
    /// Create a processor for one pass over one heap-dump record.
    pub fn new(ctx: &'a mut DumpContext, emitter: &'a mut Emitter<'w>, options: &'a ConvertOptions, pass: Pass)
        -> Self
    {
        Self {
            ctx,
            emitter,
            options,
            pass,
            processed: 0,
        }
    }

    /// Decode sub-records until the body region is exhausted.
    ///
    /// ## Errors
    ///
    /// Unknown sub-record tags, unknown basic types and reads past the body
    /// are fatal.
    pub fn process(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        while !body.is_empty() {
            let offset = body.offset();
            let tag = body.read_u8()?;
            let kind = SubRecordTag::from_u8(tag).ok_or(ConvertError::UnknownSubRecord { tag, offset })?;

            match kind {
                SubRecordTag::Root(root) => self.root(root, body)?,
                SubRecordTag::ClassDump => self.class_dump(body)?,
                SubRecordTag::InstanceDump => {
                    self.instance_dump(body)?;
                    self.progress();
                }
                SubRecordTag::ObjectArrayDump => {
                    self.object_array_dump(body)?;
                    self.progress();
                }
                SubRecordTag::PrimitiveArrayDump => {
                    self.primitive_array_dump(body)?;
                    self.progress();
                }
            }
        }

        debug!(pass = ?self.pass, objects = self.processed, "heap dump record finished");
        Ok(())
    }

    fn progress(&mut self)
    {
        self.processed += 1;
        if self.processed % PROGRESS_INTERVAL == 0 {
            debug!(pass = ?self.pass, objects = self.processed, "heap dump progress");
        }
    }

    fn id_bytes(&self) -> u64
    {
        self.ctx.id_size().bytes() as u64
    }

    fn root(&mut self, tag: RootTag, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let id = body.read_id(size)?;

        let collect = self.pass == Pass::Metadata;
        if collect {
            self.ctx.counts.roots += 1;
        }

        let kind = match tag {
            RootTag::Unknown => Some(RootKind::Unknown),
            RootTag::ThreadObject => {
                let sequence = body.read_u32()?;
                let _trace = body.read_u32()?;
                Some(RootKind::Thread { sequence })
            }
            RootTag::JniGlobal => {
                let global_ref = body.read_id(size)?;
                trace!(%id, %global_ref, "JNI global root");
                Some(RootKind::JniGlobal)
            }
            RootTag::JniLocal => {
                let thread = body.read_u32()?;
                let frame = body.read_u32()?;
                trace!(%id, thread, frame, "JNI local root");
                None
            }
            RootTag::JavaFrame => {
                let thread = body.read_u32()?;
                let frame = body.read_u32()?;
                trace!(%id, thread, frame, "Java frame root");
                Some(RootKind::JavaFrame { thread })
            }
            RootTag::NativeStack => {
                let thread = body.read_u32()?;
                trace!(%id, thread, "native stack root");
                None
            }
            RootTag::StickyClass => Some(RootKind::SystemClass {
                name: self.ctx.class_name(id),
            }),
            RootTag::ThreadBlock => Some(RootKind::ThreadBlock {
                thread: body.read_i32()?,
            }),
            RootTag::MonitorUsed => Some(RootKind::BusyMonitor),
        };

        match kind {
            Some(kind) if collect => self.emitter.root(id, kind),
            _ => Ok(()),
        }
    }

    fn class_dump(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let class_id = body.read_id(size)?;
        let _trace = body.read_u32()?;
        let super_id = body.read_id(size)?;
        let loader_id = body.read_id(size)?;
        let _signers_id = body.read_id(size)?;
        let domain_id = body.read_id(size)?;
        let _reserved = (body.read_id(size)?, body.read_id(size)?);
        let instance_size = body.read_u32()?;

        // Pass two re-reads the record only to get past it
        let collect = self.pass == Pass::Metadata;

        if collect {
            let name = self.ctx.class_name(class_id);
            self.emitter.class(class_id, name)?;
            for (label, id) in [("super", super_id), ("loader", loader_id), ("domain", domain_id)] {
                if !id.is_null() {
                    self.emitter.class_reference(label, id)?;
                }
            }
        }

        // Constant pool values are never shown
        let constants = body.read_u16()?;
        for _ in 0..constants {
            let index = body.read_u16()?;
            let field_type = body.read_field_type()?;
            let value = body.read_value(field_type, size)?;
            if collect {
                trace!(%class_id, index, ?value, "constant pool entry");
            }
        }

        let statics = body.read_u16()?;
        for _ in 0..statics {
            let name_id = body.read_id(size)?;
            let field_type = body.read_field_type()?;
            let value = body.read_value(field_type, size)?;
            if !collect {
                continue;
            }
            if let Some(target) = value.as_reference() {
                let name = self.ctx.names.get_or_unknown(name_id);
                self.emitter.static_field(name, target)?;
            }
        }

        let field_count = body.read_u16()?;
        let mut fields = FieldList::new();
        for _ in 0..field_count {
            let name_id = body.read_id(size)?;
            let field_type = body.read_field_type()?;
            if collect {
                fields.push(FieldSpec::new(self.ctx.names.get_or_unknown(name_id), field_type));
            }
        }

        if collect {
            trace!(
                %class_id,
                %super_id,
                instance_size,
                constants,
                statics,
                fields = fields.len(),
                "class dump"
            );
            self.ctx
                .classes
                .insert(class_id, ClassInfo::new(super_id, instance_size, fields));
            self.ctx.counts.classes += 1;
        }
        Ok(())
    }

    fn instance_dump(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let object_id = body.read_id(size)?;
        let _trace = body.read_u32()?;
        let class_id = body.read_id(size)?;
        let length = body.read_u32()? as usize;

        // The outer stream moves past the field bytes here, whatever the walk does
        let mut fields = body.split(length)?;
        trace!(%object_id, %class_id, length, "instance dump");

        match self.pass {
            Pass::Metadata => {
                self.ctx.counts.instances += 1;
                Ok(())
            }
            Pass::Emit => self.emit_instance(object_id, class_id, &mut fields),
        }
    }

    fn emit_instance(&mut self, object_id: Id, class_id: Id, fields: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let class_name = self.ctx.class_name(class_id).to_owned();
        let own_size = if let Some(info) = self.ctx.classes.get(class_id) {
            u64::from(info.instance_size())
        } else {
            error!(%object_id, %class_id, class = %class_name, "no class dump for instance class");
            0
        };
        let header = if self.options.include_header_size {
            2 * self.id_bytes()
        } else {
            0
        };

        self.emitter.object(object_id, own_size + header, &class_name, class_id)?;

        let track_string = self.options.resolve_strings && is_string_class(&class_name);
        self.walk_fields(object_id, class_id, fields, track_string)
    }

    /// Walk the class chain from `class_id` and consume the instance's field bytes.
    ///
    /// Missing class metadata or a chain that never reaches 0 aborts this
    /// instance only. Reading past the instance bytes is fatal.
    fn walk_fields(&mut self, object_id: Id, class_id: Id, fields: &mut Cursor<'_>, track_string: bool)
        -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let mut current = class_id;
        let mut depth = 0usize;

        while !current.is_null() {
            let Some(info) = self.ctx.classes.get(current) else {
                error!(%object_id, class_id = %current, "class metadata missing, remaining fields skipped");
                return Ok(());
            };
            depth += 1;
            if depth > self.ctx.classes.len() {
                error!(%object_id, %class_id, "superclass chain does not terminate, remaining fields skipped");
                return Ok(());
            }

            for spec in info.fields() {
                let value = fields.read_value(spec.field_type(), size)?;
                let Some(target) = value.as_reference() else {
                    continue;
                };
                self.emitter.field(spec.name(), target)?;
                if track_string && spec.name() == STRING_VALUE_FIELD {
                    self.ctx.strings.observe(object_id, target, self.emitter)?;
                }
            }
            current = info.super_id();
        }

        if !fields.is_empty() {
            error!(
                %object_id,
                %class_id,
                left = fields.remaining(),
                "instance bytes left over after walking every field"
            );
        }
        Ok(())
    }

    fn object_array_dump(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let array_id = body.read_id(size)?;
        let _trace = body.read_u32()?;
        let count = body.read_u32()?;
        let class_id = body.read_id(size)?;

        let width = size.bytes();
        let payload = (count as usize)
            .checked_mul(width)
            .ok_or(ConvertError::ArraySizeOverflow { count, width })?;
        let mut elements = body.split(payload)?;
        trace!(%array_id, count, %class_id, "object array dump");

        match self.pass {
            Pass::Metadata => {
                self.ctx.counts.object_arrays += 1;
            }
            Pass::Emit => {
                if !self.emitter.is_enabled() {
                    return Ok(());
                }
                let id_bytes = self.id_bytes();
                let mut array_size = 4 * id_bytes + id_bytes * u64::from(count);
                if self.options.include_header_size {
                    array_size += 4 * id_bytes;
                }
                let name = self.ctx.class_name(class_id);
                self.emitter.object_array(array_id, array_size, count, name, class_id)?;

                for index in 0..count {
                    let element = elements.read_id(size)?;
                    if !element.is_null() {
                        self.emitter.element(index, element)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn primitive_array_dump(&mut self, body: &mut Cursor<'_>) -> ConvertResult<()>
    {
        let size = self.ctx.id_size();
        let array_id = body.read_id(size)?;
        let _trace = body.read_u32()?;
        let count = body.read_u32()?;
        let type_offset = body.offset();
        let element_type = body.read_field_type()?;
        if element_type == FieldType::Object {
            return Err(ConvertError::UnknownFieldType {
                tag: element_type.tag(),
                offset: type_offset,
            });
        }

        let width = element_type.width(size);
        let payload_len = (count as usize)
            .checked_mul(width)
            .ok_or(ConvertError::ArraySizeOverflow { count, width })?;
        let payload = body.read_bytes(payload_len)?;
        trace!(%array_id, count, %element_type, "primitive array dump");

        match self.pass {
            Pass::Metadata => {
                self.ctx.counts.primitive_arrays += 1;
            }
            Pass::Emit => {
                if element_type == FieldType::Char && (self.options.dump_char_arrays || self.options.resolve_strings) {
                    let units = decode_utf16_be(payload);
                    if self.options.dump_char_arrays {
                        self.emitter.char_array(array_id, &units, payload)?;
                    }
                    if self.options.resolve_strings {
                        self.ctx.strings.cache_char_array(array_id, units);
                    }
                }

                let mut array_size = payload_len as u64;
                if self.options.include_header_size {
                    array_size += 2 * self.id_bytes() + 4;
                }
                self.emitter.primitive_array(array_id, array_size, count, element_type)?;
            }
        }
        Ok(())
    }
}
