//! In-memory implementation of the binary document layout.
//!
//! Layout: a document is `i32 total-length (LE), elements…, 0x00`. An element
//! is `tag byte, name as NUL-terminated UTF-8, value`. Strings are
//! `i32 length (LE, includes NUL), bytes, 0x00`. Arrays share the document
//! layout with ascending integer-string names assigned by the writer.

use bytes::{Buf, BufMut, Bytes};

use super::{DocumentReader, DocumentWriter, ElementType, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Document,
    Array,
}

#[derive(Debug)]
struct Frame {
    /// Offset of the length prefix, patched when the frame closes.
    start: usize,
    kind: FrameKind,
    next_index: u64,
}

/// Writes one document tree into an owned byte buffer.
#[derive(Debug, Default)]
pub struct RawDocumentWriter {
    buf: Vec<u8>,
    frames: Vec<Frame>,
    pending_name: Option<String>,
}

impl RawDocumentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the writer, returning the finished document bytes.
    ///
    /// Fails when a document or array is still open.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if !self.frames.is_empty() || self.pending_name.is_some() {
            return Err(Error::writer_state("all documents to be closed"));
        }
        Ok(self.buf)
    }

    fn open_frame(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            start: self.buf.len(),
            kind,
            next_index: 0,
        });
        self.buf.put_i32_le(0); // patched on close
    }

    fn close_frame(&mut self, kind: FrameKind, expected: &'static str) -> Result<()> {
        if self.pending_name.is_some() {
            return Err(Error::writer_state("a value for the written name"));
        }
        let frame = match self.frames.pop() {
            Some(frame) if frame.kind == kind => frame,
            _ => return Err(Error::writer_state(expected)),
        };
        self.buf.put_u8(ElementType::EndOfDocument as u8);
        let len = (self.buf.len() - frame.start) as i32;
        self.buf[frame.start..frame.start + 4].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    /// Emit the tag and name of the next element. Inside arrays the name is
    /// the auto-assigned element index.
    fn begin_element(&mut self, tag: ElementType) -> Result<()> {
        let name = match self.pending_name.take() {
            Some(name) => name,
            None => match self.frames.last_mut() {
                Some(frame) if frame.kind == FrameKind::Array => {
                    let index = frame.next_index;
                    frame.next_index += 1;
                    index.to_string()
                }
                _ => return Err(Error::writer_state("a field name before the value")),
            },
        };
        self.buf.put_u8(tag as u8);
        self.buf.put_slice(name.as_bytes());
        self.buf.put_u8(0);
        Ok(())
    }
}

impl DocumentWriter for RawDocumentWriter {
    fn write_start_document(&mut self) -> Result<()> {
        if !self.frames.is_empty() || self.pending_name.is_some() {
            self.begin_element(ElementType::Document)?;
        }
        self.open_frame(FrameKind::Document);
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Document, "an open document to close")
    }

    fn write_start_array(&mut self) -> Result<()> {
        self.begin_element(ElementType::Array)?;
        self.open_frame(FrameKind::Array);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Array, "an open array to close")
    }

    fn write_name(&mut self, name: &str) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::writer_state("an open document"));
        }
        if self.pending_name.is_some() {
            return Err(Error::writer_state("a value for the previous name"));
        }
        if name.as_bytes().contains(&0) {
            return Err(Error::writer_state("a field name without NUL bytes"));
        }
        self.pending_name = Some(name.to_owned());
        Ok(())
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.begin_element(ElementType::Boolean)?;
        self.buf.put_u8(u8::from(value));
        Ok(())
    }

    fn write_int32(&mut self, value: i32) -> Result<()> {
        self.begin_element(ElementType::Int32)?;
        self.buf.put_i32_le(value);
        Ok(())
    }

    fn write_int64(&mut self, value: i64) -> Result<()> {
        self.begin_element(ElementType::Int64)?;
        self.buf.put_i64_le(value);
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.begin_element(ElementType::Double)?;
        self.buf.put_f64_le(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.begin_element(ElementType::String)?;
        self.buf.put_i32_le(value.len() as i32 + 1);
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(0);
        Ok(())
    }
}

/// Reads one document tree from a byte buffer.
#[derive(Debug)]
pub struct RawDocumentReader {
    buf: Bytes,
    frames: Vec<FrameKind>,
    /// Tag consumed by the last `read_element_type`, cleared by the value
    /// read (or skip) that follows it.
    current: Option<ElementType>,
}

impl RawDocumentReader {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            buf: bytes.into(),
            frames: Vec::new(),
            current: None,
        }
    }

    fn take_bytes(&mut self, count: usize) -> Result<Bytes> {
        if self.buf.remaining() < count {
            return Err(Error::UnexpectedEof);
        }
        Ok(self.buf.split_to(count))
    }

    fn take_i32(&mut self) -> Result<i32> {
        if self.buf.remaining() < 4 {
            return Err(Error::UnexpectedEof);
        }
        Ok(self.buf.get_i32_le())
    }

    fn expect_current(&mut self, expected: ElementType) -> Result<()> {
        match self.current.take() {
            Some(actual) if actual == expected => Ok(()),
            Some(actual) => {
                self.current = Some(actual);
                Err(Error::UnexpectedElementType { expected, actual })
            }
            None => Err(Error::reader_state("an element type to have been read")),
        }
    }

    fn close_frame(&mut self, kind: FrameKind, expected: &'static str) -> Result<()> {
        self.expect_current(ElementType::EndOfDocument)?;
        match self.frames.pop() {
            Some(top) if top == kind => Ok(()),
            _ => Err(Error::reader_state(expected)),
        }
    }
}

impl DocumentReader for RawDocumentReader {
    fn read_start_document(&mut self) -> Result<()> {
        if !self.frames.is_empty() {
            self.expect_current(ElementType::Document)?;
        }
        self.take_i32()?; // total length, unused by sequential reads
        self.frames.push(FrameKind::Document);
        Ok(())
    }

    fn read_end_document(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Document, "an open document to close")
    }

    fn read_start_array(&mut self) -> Result<()> {
        self.expect_current(ElementType::Array)?;
        self.take_i32()?;
        self.frames.push(FrameKind::Array);
        Ok(())
    }

    fn read_end_array(&mut self) -> Result<()> {
        self.close_frame(FrameKind::Array, "an open array to close")
    }

    fn read_element_type(&mut self) -> Result<ElementType> {
        if self.frames.is_empty() {
            return Err(Error::reader_state("an open document"));
        }
        let tag = self.take_bytes(1)?[0];
        let element_type = ElementType::from_tag(tag)?;
        self.current = Some(element_type);
        Ok(element_type)
    }

    fn read_name(&mut self) -> Result<String> {
        match self.current {
            Some(ElementType::EndOfDocument) | None => {
                return Err(Error::reader_state("an element with a name"));
            }
            Some(_) => {}
        }
        let nul = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::UnexpectedEof)?;
        let name_bytes = self.buf.split_to(nul);
        self.buf.advance(1);
        String::from_utf8(name_bytes.to_vec()).map_err(|_| Error::InvalidUtf8)
    }

    fn skip_value(&mut self) -> Result<()> {
        let skipped = match self.current.take() {
            Some(ElementType::Boolean) => 1,
            Some(ElementType::Int32) => 4,
            Some(ElementType::Int64) | Some(ElementType::Double) => 8,
            Some(ElementType::String) => self.take_i32()? as usize,
            Some(ElementType::Document) | Some(ElementType::Array) => {
                // The length prefix covers itself.
                (self.take_i32()? as usize).saturating_sub(4)
            }
            Some(ElementType::EndOfDocument) | None => {
                return Err(Error::reader_state("a value to skip"));
            }
        };
        self.take_bytes(skipped)?;
        Ok(())
    }

    fn read_boolean(&mut self) -> Result<bool> {
        self.expect_current(ElementType::Boolean)?;
        Ok(self.take_bytes(1)?[0] != 0)
    }

    fn read_int32(&mut self) -> Result<i32> {
        self.expect_current(ElementType::Int32)?;
        self.take_i32()
    }

    fn read_int64(&mut self) -> Result<i64> {
        self.expect_current(ElementType::Int64)?;
        if self.buf.remaining() < 8 {
            return Err(Error::UnexpectedEof);
        }
        Ok(self.buf.get_i64_le())
    }

    fn read_double(&mut self) -> Result<f64> {
        self.expect_current(ElementType::Double)?;
        if self.buf.remaining() < 8 {
            return Err(Error::UnexpectedEof);
        }
        Ok(self.buf.get_f64_le())
    }

    fn read_string(&mut self) -> Result<String> {
        self.expect_current(ElementType::String)?;
        let len = self.take_i32()?;
        if len < 1 {
            return Err(Error::reader_state("a positive string length"));
        }
        let bytes = self.take_bytes(len as usize)?;
        let (content, nul) = bytes.split_at(len as usize - 1);
        if nul != [0] {
            return Err(Error::reader_state("a NUL-terminated string"));
        }
        String::from_utf8(content.to_vec()).map_err(|_| Error::InvalidUtf8)
    }
}
