//! Stateful cursor over a normalized uppercase hex string.
//!
//! `position` is always a byte-aligned, even hex-character offset. Every
//! read does a bounds check and fails with [`PcmiError::Parse`] carrying the
//! current position rather than panicking.

use crate::codec::Endian;
use crate::error::PcmiError;

#[derive(Debug, Clone)]
pub struct HexCursor {
    data: String,
    position: usize,
    endian: Endian,
    record_type: &'static str,
}

impl HexCursor {
    pub fn new(hex: &str, endian: Endian, record_type: &'static str) -> Self {
        Self {
            data: hex.to_ascii_uppercase(),
            position: 0,
            endian,
            record_type,
        }
    }

    fn fail(&self, message: impl Into<String>) -> PcmiError {
        PcmiError::Parse {
            record_type: self.record_type,
            offset: self.position,
            raw_data: format!("{}: {}", message.into(), self.data),
        }
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn remaining_bytes(&self) -> usize {
        self.remaining() / 2
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.data.len()
    }

    pub fn has_bytes(&self, n: usize) -> bool {
        self.remaining() >= n * 2
    }

    fn window(&self, n_bytes: usize, offset_bytes: usize) -> Result<&str, PcmiError> {
        let start = self.position + offset_bytes * 2;
        let end = start + n_bytes * 2;
        if end > self.data.len() {
            return Err(self.fail(format!(
                "need {n_bytes} bytes at offset {offset_bytes} but only {} remain",
                self.remaining_bytes().saturating_sub(offset_bytes)
            )));
        }
        Ok(&self.data[start..end])
    }

    fn window_bytes(&self, n_bytes: usize, offset_bytes: usize) -> Result<Vec<u8>, PcmiError> {
        let hex = self.window(n_bytes, offset_bytes)?;
        hex::decode(hex).map_err(|e| self.fail(format!("invalid hex: {e}")))
    }

    pub fn read_byte(&mut self) -> Result<u8, PcmiError> {
        let bytes = self.window_bytes(1, 0)?;
        self.position += 2;
        Ok(bytes[0])
    }

    pub fn read_signed_byte(&mut self) -> Result<i8, PcmiError> {
        Ok(self.read_byte()? as i8)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, PcmiError> {
        let bytes = self.window_bytes(n, 0)?;
        self.position += n * 2;
        Ok(bytes)
    }

    pub fn read_u16(&mut self) -> Result<u16, PcmiError> {
        let bytes = self.window_bytes(2, 0)?;
        self.position += 4;
        Ok(self.endian.read_u16([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, PcmiError> {
        let bytes = self.window_bytes(2, 0)?;
        self.position += 4;
        Ok(self.endian.read_i16([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, PcmiError> {
        let bytes = self.window_bytes(4, 0)?;
        self.position += 8;
        Ok(self.endian.read_u32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, PcmiError> {
        let bytes = self.window_bytes(4, 0)?;
        self.position += 8;
        Ok(self.endian.read_i32([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn peek_byte(&self, offset_bytes: usize) -> Result<u8, PcmiError> {
        Ok(self.window_bytes(1, offset_bytes)?[0])
    }

    pub fn peek_u16(&self, offset_bytes: usize) -> Result<u16, PcmiError> {
        let b = self.window_bytes(2, offset_bytes)?;
        Ok(self.endian.read_u16([b[0], b[1]]))
    }

    pub fn peek_i16(&self, offset_bytes: usize) -> Result<i16, PcmiError> {
        let b = self.window_bytes(2, offset_bytes)?;
        Ok(self.endian.read_i16([b[0], b[1]]))
    }

    pub fn peek_slice(&self, n: usize, offset_bytes: usize) -> Result<Vec<u8>, PcmiError> {
        self.window_bytes(n, offset_bytes)
    }

    pub fn skip(&mut self, chars: usize) -> Result<(), PcmiError> {
        if self.position + chars > self.data.len() {
            return Err(self.fail(format!("cannot skip {chars} chars past end")));
        }
        self.position += chars;
        Ok(())
    }

    pub fn skip_bytes(&mut self, n: usize) -> Result<(), PcmiError> {
        self.skip(n * 2)
    }

    pub fn seek(&mut self, position: usize) -> Result<(), PcmiError> {
        if position > self.data.len() || position % 2 != 0 {
            return Err(self.fail(format!("invalid seek target {position}")));
        }
        self.position = position;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Consumes `n` bytes and returns them as a hex substring.
    pub fn slice(&mut self, n: usize) -> Result<String, PcmiError> {
        let hex = self.window(n, 0)?.to_string();
        self.position += n * 2;
        Ok(hex)
    }

    /// Advances past `n` bytes and hands out a fresh cursor over just that window.
    pub fn create_subreader(&mut self, n: usize) -> Result<HexCursor, PcmiError> {
        let hex = self.slice(n)?;
        Ok(HexCursor::new(&hex, self.endian, self.record_type))
    }
}
