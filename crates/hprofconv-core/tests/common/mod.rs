//! Builders for small binary HPROF inputs

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const T_OBJECT: u8 = 2;
pub const T_BOOLEAN: u8 = 4;
pub const T_CHAR: u8 = 5;
pub const T_INT: u8 = 10;
pub const T_LONG: u8 = 11;

/// Identifier bytes for the given width.
pub fn id_bytes(id_size: u32, value: u64) -> Vec<u8>
{
    match id_size {
        4 => u32::try_from(value).unwrap().to_be_bytes().to_vec(),
        8 => value.to_be_bytes().to_vec(),
        other => panic!("unsupported id size {other}"),
    }
}

/// UTF-16BE bytes of an ASCII string, as stored in a `char[]` payload.
pub fn utf16_be(text: &str) -> Vec<u8>
{
    text.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Whole file: header plus top-level records
pub struct HprofBuilder
{
    id_size: u32,
    bytes: Vec<u8>,
}

impl HprofBuilder
{
    pub fn new(id_size: u32) -> Self
    {
        Self::with_timestamp(id_size, 0)
    }

    pub fn with_timestamp(id_size: u32, timestamp_ms: u64) -> Self
    {
        let mut bytes = b"JAVA PROFILE 1.0.2\0".to_vec();
        bytes.extend_from_slice(&id_size.to_be_bytes());
        bytes.extend_from_slice(&timestamp_ms.to_be_bytes());
        Self { id_size, bytes }
    }

    pub fn id_size(&self) -> u32
    {
        self.id_size
    }

    /// Any record, with a correct length field.
    pub fn record(mut self, tag: u8, body: &[u8]) -> Self
    {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&0u32.to_be_bytes());
        self.bytes.extend_from_slice(&u32::try_from(body.len()).unwrap().to_be_bytes());
        self.bytes.extend_from_slice(body);
        self
    }

    /// Record whose length field claims `declared` bytes.
    pub fn record_with_length(mut self, tag: u8, declared: u32, body: &[u8]) -> Self
    {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(&0u32.to_be_bytes());
        self.bytes.extend_from_slice(&declared.to_be_bytes());
        self.bytes.extend_from_slice(body);
        self
    }

    pub fn string(self, id: u64, text: &str) -> Self
    {
        let mut body = id_bytes(self.id_size, id);
        body.extend_from_slice(text.as_bytes());
        self.record(0x01, &body)
    }

    pub fn load_class(self, serial: u32, class_id: u64, name_id: u64) -> Self
    {
        let mut body = serial.to_be_bytes().to_vec();
        body.extend(id_bytes(self.id_size, class_id));
        body.extend_from_slice(&0u32.to_be_bytes());
        body.extend(id_bytes(self.id_size, name_id));
        self.record(0x02, &body)
    }

    pub fn heap_dump(self, heap: HeapBody) -> Self
    {
        assert_eq!(heap.id_size, self.id_size);
        self.record(0x0c, &heap.bytes)
    }

    pub fn build(self) -> Vec<u8>
    {
        self.bytes
    }
}

/// Sub-records of one heap-dump record
pub struct HeapBody
{
    id_size: u32,
    bytes: Vec<u8>,
}

impl HeapBody
{
    pub fn new(id_size: u32) -> Self
    {
        Self {
            id_size,
            bytes: Vec::new(),
        }
    }

    fn id(&mut self, value: u64)
    {
        let bytes = id_bytes(self.id_size, value);
        self.bytes.extend(bytes);
    }

    fn u32(&mut self, value: u32)
    {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    fn u16(&mut self, value: u16)
    {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self
    {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn root_unknown(mut self, id: u64) -> Self
    {
        self.bytes.push(0xff);
        self.id(id);
        self
    }

    pub fn root_thread_object(mut self, id: u64, sequence: u32) -> Self
    {
        self.bytes.push(0x08);
        self.id(id);
        self.u32(sequence);
        self.u32(0);
        self
    }

    pub fn root_jni_global(mut self, id: u64, global_ref: u64) -> Self
    {
        self.bytes.push(0x01);
        self.id(id);
        self.id(global_ref);
        self
    }

    pub fn root_jni_local(mut self, id: u64, thread: u32, frame: u32) -> Self
    {
        self.bytes.push(0x02);
        self.id(id);
        self.u32(thread);
        self.u32(frame);
        self
    }

    pub fn root_java_frame(mut self, id: u64, thread: u32, frame: u32) -> Self
    {
        self.bytes.push(0x03);
        self.id(id);
        self.u32(thread);
        self.u32(frame);
        self
    }

    pub fn root_native_stack(mut self, id: u64, thread: u32) -> Self
    {
        self.bytes.push(0x04);
        self.id(id);
        self.u32(thread);
        self
    }

    pub fn root_sticky_class(mut self, id: u64) -> Self
    {
        self.bytes.push(0x05);
        self.id(id);
        self
    }

    pub fn root_thread_block(mut self, id: u64, thread: u32) -> Self
    {
        self.bytes.push(0x06);
        self.id(id);
        self.u32(thread);
        self
    }

    pub fn root_monitor_used(mut self, id: u64) -> Self
    {
        self.bytes.push(0x07);
        self.id(id);
        self
    }

    /// Class dump without constant pool entries.
    ///
    /// `statics` are `(name id, type, value bytes)`, `fields` are `(name id, type)`.
    pub fn class_dump(
        mut self,
        class_id: u64,
        super_id: u64,
        loader_id: u64,
        instance_size: u32,
        statics: &[(u64, u8, Vec<u8>)],
        fields: &[(u64, u8)],
    ) -> Self
    {
        self.bytes.push(0x20);
        self.id(class_id);
        self.u32(0);
        self.id(super_id);
        self.id(loader_id);
        // signers, protection domain, two reserved
        for _ in 0..4 {
            self.id(0);
        }
        self.u32(instance_size);

        self.u16(0);

        self.u16(u16::try_from(statics.len()).unwrap());
        for (name_id, ty, value) in statics {
            self.id(*name_id);
            self.bytes.push(*ty);
            self.bytes.extend_from_slice(value);
        }

        self.u16(u16::try_from(fields.len()).unwrap());
        for (name_id, ty) in fields {
            self.id(*name_id);
            self.bytes.push(*ty);
        }
        self
    }

    /// Class dump with one constant pool entry of the given type.
    pub fn class_dump_with_constant(mut self, class_id: u64, ty: u8, value: &[u8]) -> Self
    {
        self.bytes.push(0x20);
        self.id(class_id);
        self.u32(0);
        for _ in 0..6 {
            self.id(0);
        }
        self.u32(0);
        self.u16(1);
        self.u16(7);
        self.bytes.push(ty);
        self.bytes.extend_from_slice(value);
        self.u16(0);
        self.u16(0);
        self
    }

    pub fn instance(mut self, object_id: u64, class_id: u64, fields: &[u8]) -> Self
    {
        self.bytes.push(0x21);
        self.id(object_id);
        self.u32(0);
        self.id(class_id);
        self.u32(u32::try_from(fields.len()).unwrap());
        self.bytes.extend_from_slice(fields);
        self
    }

    pub fn object_array(mut self, array_id: u64, class_id: u64, elements: &[u64]) -> Self
    {
        self.bytes.push(0x22);
        self.id(array_id);
        self.u32(0);
        self.u32(u32::try_from(elements.len()).unwrap());
        self.id(class_id);
        for element in elements {
            self.id(*element);
        }
        self
    }

    pub fn primitive_array(mut self, array_id: u64, ty: u8, count: u32, payload: &[u8]) -> Self
    {
        self.bytes.push(0x23);
        self.id(array_id);
        self.u32(0);
        self.u32(count);
        self.bytes.push(ty);
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn char_array(self, array_id: u64, text: &str) -> Self
    {
        let payload = utf16_be(text);
        let count = u32::try_from(payload.len() / 2).unwrap();
        self.primitive_array(array_id, T_CHAR, count, &payload)
    }
}

/// Unique path under the system temp directory.
pub fn temp_path(name: &str) -> PathBuf
{
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("hprofconv-{}-{n}-{name}", std::process::id()))
}
