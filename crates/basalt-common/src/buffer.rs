use std::io;

use uuid::{Uuid, Variant};

use crate::chat::Chat;
use crate::constants::MAX_STRING_LENGTH;
use crate::error::BasaltError;
use crate::types::BlockPosition;
use crate::Result;

const SEGMENT_BITS: u8 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Growable byte buffer with independent read and write offsets.
///
/// Writes append at the write offset. Reads consume from the read offset and
/// never move it on failure, so a short read can be retried once more bytes
/// have been appended. All fixed width values are big-endian.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacketBuffer {
    buffer: Vec<u8>,
    read_offset: usize,
}

impl PacketBuffer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            read_offset: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            read_offset: 0,
        }
    }

    /// Creates a buffer whose managed region is exactly `bytes`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            buffer: bytes,
            read_offset: 0,
        }
    }

    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    /// Moves the read offset, typically to roll back a partial read.
    pub fn set_read_offset(&mut self, offset: usize) {
        assert!(
            offset <= self.write_offset(),
            "read offset {} past write offset {}",
            offset,
            self.write_offset()
        );
        self.read_offset = offset;
    }

    pub fn write_offset(&self) -> usize {
        self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.write_offset() - self.read_offset
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn reserve(&mut self, additional: usize) {
        self.buffer.reserve(additional);
    }

    /// Everything written so far, read or not.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes between the read and write offsets.
    pub fn unread(&self) -> &[u8] {
        &self.buffer[self.read_offset..]
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.read_offset = 0;
    }

    /// Discards consumed bytes so the read offset becomes zero.
    pub fn compact(&mut self) {
        if self.read_offset == 0 {
            return;
        }
        self.buffer.drain(..self.read_offset);
        self.read_offset = 0;
    }

    pub fn peek_byte(&self) -> Option<u8> {
        self.buffer.get(self.read_offset).copied()
    }

    pub fn advance_read_offset(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    fn take(&mut self, count: usize) -> Result<&[u8]> {
        if self.remaining() < count {
            return Err(BasaltError::OutOfBounds {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let start = self.read_offset;
        self.read_offset += count;
        Ok(&self.buffer[start..start + count])
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.take(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    /// Runs a compound read, restoring the read offset if any part fails.
    fn transaction<T>(&mut self, read: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.read_offset;
        let result = read(self);
        if result.is_err() {
            self.read_offset = start;
        }
        result
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.take(count).map(|bytes| bytes.to_vec())
    }

    pub fn read_remaining(&mut self) -> Vec<u8> {
        let bytes = self.buffer[self.read_offset..].to_vec();
        self.read_offset = self.write_offset();
        bytes
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_ubyte()? as i8)
    }

    pub fn write_byte(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    pub fn read_ubyte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn write_ubyte(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        match self.peek_byte() {
            Some(0x00) => {
                self.read_offset += 1;
                Ok(false)
            }
            Some(0x01) => {
                self.read_offset += 1;
                Ok(true)
            }
            Some(other) => Err(BasaltError::InvalidBoolean(other)),
            None => Err(BasaltError::OutOfBounds {
                needed: 1,
                remaining: 0,
            }),
        }
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    pub fn read_short(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.take_array()?))
    }

    pub fn write_short(&mut self, value: i16) {
        self.write_bytes(&value.to_be_bytes());
    }

    // Read an u16 in network (big-endian) order.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take_array()?))
    }

    // Write an u16 in network (big-endian) order.
    pub fn write_u16(&mut self, value: u16) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_int(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn write_int(&mut self, value: i32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take_array()?))
    }

    pub fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_long(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.take_array()?))
    }

    pub fn write_long(&mut self, value: i64) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.take_array()?))
    }

    pub fn write_u64(&mut self, value: u64) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.take_array()?))
    }

    pub fn write_float(&mut self, value: f32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    pub fn write_double(&mut self, value: f64) {
        self.write_bytes(&value.to_be_bytes());
    }

    /// Reads a VarInt: 7 bits per byte, least significant group first, with the
    /// high bit of each byte flagging a continuation. At most 5 bytes.
    pub fn read_varint(&mut self) -> Result<i32> {
        let start = self.read_offset;
        let mut value: u32 = 0;

        for group in 0..5 {
            let byte = match self.buffer.get(start + group) {
                Some(byte) => *byte,
                None => {
                    return Err(BasaltError::OutOfBounds {
                        needed: group + 1,
                        remaining: self.remaining(),
                    })
                }
            };

            value |= ((byte & SEGMENT_BITS) as u32) << (7 * group);

            if byte & CONTINUE_BIT == 0 {
                self.read_offset = start + group + 1;
                return Ok(value as i32);
            }
        }

        Err(BasaltError::VarIntTooBig)
    }

    /// Writes a VarInt. Negative values always take the full 5 bytes.
    pub fn write_varint(&mut self, value: i32) {
        let mut value = value as u32;
        while value & !(SEGMENT_BITS as u32) != 0 {
            self.buffer.push(((value as u8) & SEGMENT_BITS) | CONTINUE_BIT);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    pub fn read_varlong(&mut self) -> Result<i64> {
        let start = self.read_offset;
        let mut value: u64 = 0;

        for group in 0..10 {
            let byte = match self.buffer.get(start + group) {
                Some(byte) => *byte,
                None => {
                    return Err(BasaltError::OutOfBounds {
                        needed: group + 1,
                        remaining: self.remaining(),
                    })
                }
            };

            value |= ((byte & SEGMENT_BITS) as u64) << (7 * group);

            if byte & CONTINUE_BIT == 0 {
                self.read_offset = start + group + 1;
                return Ok(value as i64);
            }
        }

        Err(BasaltError::VarLongTooBig)
    }

    pub fn write_varlong(&mut self, value: i64) {
        let mut value = value as u64;
        while value & !(SEGMENT_BITS as u64) != 0 {
            self.buffer.push(((value as u8) & SEGMENT_BITS) | CONTINUE_BIT);
            value >>= 7;
        }
        self.buffer.push(value as u8);
    }

    /// Number of bytes `write_varint` produces for `value`.
    pub fn varint_size(value: i32) -> usize {
        let value = value as u32;
        match value {
            0..=0x7F => 1,
            0x80..=0x3FFF => 2,
            0x4000..=0x1F_FFFF => 3,
            0x20_0000..=0xFFF_FFFF => 4,
            _ => 5,
        }
    }

    pub fn read_string(&mut self) -> Result<String> {
        self.read_string_bounded(MAX_STRING_LENGTH)
    }

    /// Reads a VarInt-prefixed UTF-8 string whose byte length is at most `max`.
    pub fn read_string_bounded(&mut self, max: usize) -> Result<String> {
        self.transaction(|buffer| {
            let length = buffer.read_varint()?;
            if length < 0 || length as usize > max {
                return Err(BasaltError::InvalidStringLength {
                    length: length as i64,
                    max,
                });
            }
            let bytes = buffer.take(length as usize)?;
            String::from_utf8(bytes.to_vec()).map_err(|_| BasaltError::InvalidUtf8)
        })
    }

    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > MAX_STRING_LENGTH * 4 {
            return Err(BasaltError::InvalidStringLength {
                length: bytes.len() as i64,
                max: MAX_STRING_LENGTH * 4,
            });
        }
        self.write_varint(bytes.len() as i32);
        self.write_bytes(bytes);
        Ok(())
    }

    pub fn read_uuid(&mut self) -> Result<Uuid> {
        Ok(Uuid::from_bytes(self.take_array()?))
    }

    pub fn write_uuid(&mut self, value: &Uuid) {
        self.write_bytes(value.as_bytes());
    }

    /// Writes a UUID given in its hyphenated text form.
    pub fn write_uuid_str(&mut self, value: &str) -> Result<()> {
        let uuid = parse_uuid(value)?;
        self.write_uuid(&uuid);
        Ok(())
    }

    pub fn read_position(&mut self) -> Result<BlockPosition> {
        Ok(BlockPosition::unpack(self.read_u64()?))
    }

    pub fn write_position(&mut self, position: &BlockPosition) {
        self.write_u64(position.pack());
    }

    pub fn read_chat(&mut self) -> Result<Chat> {
        self.transaction(|buffer| {
            let json = buffer.read_string()?;
            Chat::from_json(&json)
        })
    }

    pub fn write_chat(&mut self, chat: &Chat) -> Result<()> {
        self.write_string(&chat.to_json()?)
    }

    /// Reads a VarInt length followed by that many raw bytes.
    pub fn read_byte_array(&mut self) -> Result<Vec<u8>> {
        self.transaction(|buffer| {
            let length = buffer.read_varint()?;
            if length < 0 {
                return Err(BasaltError::Protocol(format!(
                    "negative byte array length {}",
                    length
                )));
            }
            buffer.read_bytes(length as usize)
        })
    }

    pub fn write_byte_array(&mut self, bytes: &[u8]) {
        self.write_varint(bytes.len() as i32);
        self.write_bytes(bytes);
    }
}

/// Parses a hyphenated RFC 4122 UUID string.
pub fn parse_uuid(value: &str) -> Result<Uuid> {
    let invalid = || BasaltError::InvalidUuid(value.to_string());

    let hyphenated = value.len() == 36
        && value
            .char_indices()
            .all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphenated {
        return Err(invalid());
    }

    let uuid = Uuid::parse_str(value).map_err(|_| invalid())?;
    if uuid.is_nil() {
        return Ok(uuid);
    }
    match (uuid.get_version_num(), uuid.get_variant()) {
        (1..=5, Variant::RFC4122) => Ok(uuid),
        _ => Err(invalid()),
    }
}

impl io::Write for PacketBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl io::Read for PacketBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.remaining());
        buf[..count].copy_from_slice(&self.buffer[self.read_offset..self.read_offset + count]);
        self.read_offset += count;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::Rng;
    use std::io::{Read, Write};

    #[test]
    fn test_packet_buffer_new() {
        let buffer = PacketBuffer::new();
        assert_eq!(buffer.read_offset(), 0);
        assert_eq!(buffer.write_offset(), 0);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_packet_buffer_from_bytes() {
        let bytes = vec![1, 2, 3];
        let buffer = PacketBuffer::from_bytes(bytes.clone());
        assert_eq!(buffer.as_slice(), &bytes[..]);
        assert_eq!(buffer.remaining(), 3);
    }

    #[test]
    fn test_peek_byte() {
        let buffer = PacketBuffer::from_bytes(vec![1, 2, 3]);
        assert_eq!(buffer.peek_byte(), Some(1));

        let empty_buffer = PacketBuffer::new();
        assert_eq!(empty_buffer.peek_byte(), None);
    }

    #[test]
    fn test_varint() {
        let test_cases = vec![0, 1, 127, 128, 255, 300, 2147483647, -1, -2147483648];

        for value in test_cases {
            let mut buffer = PacketBuffer::new();
            buffer.write_varint(value);
            assert_eq!(buffer.write_offset(), PacketBuffer::varint_size(value));
            assert_eq!(buffer.read_varint().unwrap(), value);
            assert_eq!(buffer.remaining(), 0);
        }
    }

    #[test]
    fn test_varint_known_encodings() {
        let mut buffer = PacketBuffer::new();
        buffer.write_varint(300);
        assert_eq!(buffer.as_slice(), &[0xAC, 0x02]);

        let mut buffer = PacketBuffer::new();
        buffer.write_varint(0);
        assert_eq!(buffer.as_slice(), &[0x00]);

        let mut buffer = PacketBuffer::new();
        buffer.write_varint(-1);
        assert_eq!(buffer.as_slice(), &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_varlong() {
        let test_cases = vec![0i64, 1, 127, 128, 2147483647, -1, i64::MAX, i64::MIN];

        for value in test_cases {
            let mut buffer = PacketBuffer::new();
            buffer.write_varlong(value);
            assert_eq!(buffer.read_varlong().unwrap(), value);
        }

        let mut buffer = PacketBuffer::new();
        buffer.write_varlong(-1);
        assert_eq!(buffer.write_offset(), 10);
    }

    #[test]
    fn test_varint_error_handling() {
        // Six groups, every one with the continuation bit set
        let mut buffer = PacketBuffer::from_bytes(vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]);
        assert_matches!(buffer.read_varint(), Err(BasaltError::VarIntTooBig));
        assert_eq!(buffer.read_offset(), 0);

        // Continuation bit set but no more bytes
        let mut buffer = PacketBuffer::from_bytes(vec![0x80]);
        let result = buffer.read_varint();
        assert_matches!(result, Err(BasaltError::OutOfBounds { .. }));
        assert!(result.unwrap_err().is_recoverable());
        assert_eq!(buffer.read_offset(), 0);

        // Retry succeeds once the rest arrives
        buffer.write_ubyte(0x01);
        assert_eq!(buffer.read_varint().unwrap(), 128);
    }

    #[test]
    fn test_varlong_error_handling() {
        let mut buffer = PacketBuffer::from_bytes(vec![0xFF; 11]);
        assert_matches!(buffer.read_varlong(), Err(BasaltError::VarLongTooBig));
        assert_eq!(buffer.read_offset(), 0);
    }

    #[test]
    fn test_fixed_width_round_trip() {
        let mut buffer = PacketBuffer::new();
        for value in [i8::MIN, -1, 0, 1, i8::MAX] {
            buffer.write_byte(value);
            assert_eq!(buffer.read_byte().unwrap(), value);
        }
        for value in [u8::MIN, 1, u8::MAX] {
            buffer.write_ubyte(value);
            assert_eq!(buffer.read_ubyte().unwrap(), value);
        }
        for value in [true, false] {
            buffer.write_bool(value);
            assert_eq!(buffer.read_bool().unwrap(), value);
        }
        for value in [i16::MIN, -1, 0, 1, i16::MAX] {
            buffer.write_short(value);
            assert_eq!(buffer.read_short().unwrap(), value);
        }
        for value in [u16::MIN, 1, u16::MAX] {
            buffer.write_u16(value);
            assert_eq!(buffer.read_u16().unwrap(), value);
        }
        for value in [i32::MIN, -1, 0, 1, i32::MAX] {
            buffer.write_int(value);
            assert_eq!(buffer.read_int().unwrap(), value);
        }
        for value in [u32::MIN, 1, u32::MAX] {
            buffer.write_u32(value);
            assert_eq!(buffer.read_u32().unwrap(), value);
        }
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            buffer.write_long(value);
            assert_eq!(buffer.read_long().unwrap(), value);
        }
        for value in [u64::MIN, 1, u64::MAX] {
            buffer.write_u64(value);
            assert_eq!(buffer.read_u64().unwrap(), value);
        }
        for value in [f32::MIN, -1.5, 0.0, 1.0, f32::MAX] {
            buffer.write_float(value);
            assert_eq!(buffer.read_float().unwrap(), value);
        }
        for value in [f64::MIN, -1.0, 0.0, 1.5, f64::MAX] {
            buffer.write_double(value);
            assert_eq!(buffer.read_double().unwrap(), value);
        }
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buffer = PacketBuffer::new();
        buffer.write_int(0x01020304);
        buffer.write_short(0x0506);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_short_read_leaves_offsets_unchanged() {
        let mut buffer = PacketBuffer::from_bytes(vec![0x00, 0x01, 0x02]);
        assert_matches!(
            buffer.read_int(),
            Err(BasaltError::OutOfBounds {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(buffer.read_offset(), 0);
        assert_eq!(buffer.write_offset(), 3);
    }

    #[test]
    fn test_invalid_boolean() {
        let mut buffer = PacketBuffer::from_bytes(vec![0x02]);
        assert_matches!(buffer.read_bool(), Err(BasaltError::InvalidBoolean(0x02)));
        assert_eq!(buffer.read_offset(), 0);
    }

    #[test]
    fn test_string() {
        let max_length = "a".repeat(MAX_STRING_LENGTH);
        let test_strings = vec!["", "A", "Hello, World!", "🦀", "こんにちは", max_length.as_str()];

        for string in test_strings {
            let mut buffer = PacketBuffer::new();
            buffer.write_string(string).unwrap();
            assert_eq!(buffer.read_string().unwrap(), string);
        }

        let mut buffer = PacketBuffer::new();
        buffer.write_string("A").unwrap();
        assert_eq!(buffer.as_slice(), &[0x01, 0x41]);
    }

    #[test]
    fn test_string_error_handling() {
        // Invalid UTF-8
        let mut buffer = PacketBuffer::new();
        buffer.write_varint(1);
        buffer.write_ubyte(0xFF);
        assert_matches!(buffer.read_string(), Err(BasaltError::InvalidUtf8));
        assert_eq!(buffer.read_offset(), 0);

        // String too long for buffer, the prefix must not be consumed
        let mut buffer = PacketBuffer::new();
        buffer.write_varint(100);
        buffer.write_ubyte(0x41);
        assert_matches!(buffer.read_string(), Err(BasaltError::OutOfBounds { .. }));
        assert_eq!(buffer.read_offset(), 0);

        // Declared length outside the allowed range
        let mut buffer = PacketBuffer::new();
        buffer.write_varint(-1);
        assert_matches!(
            buffer.read_string(),
            Err(BasaltError::InvalidStringLength { length: -1, .. })
        );

        let mut buffer = PacketBuffer::new();
        buffer.write_string("abcdefgh").unwrap();
        assert_matches!(
            buffer.read_string_bounded(4),
            Err(BasaltError::InvalidStringLength { length: 8, max: 4 })
        );
    }

    #[test]
    fn test_write_string_rejects_oversized() {
        let mut buffer = PacketBuffer::new();
        let huge = "a".repeat(MAX_STRING_LENGTH * 4 + 1);
        assert!(buffer.write_string(&huge).is_err());
        assert_eq!(buffer.write_offset(), 0);
    }

    #[test]
    fn test_uuid() {
        let uuid = Uuid::new_v3(&Uuid::NAMESPACE_DNS, "wow".as_ref());
        let mut buffer = PacketBuffer::new();
        buffer.write_uuid(&uuid);
        assert_eq!(buffer.write_offset(), 16);
        assert_eq!(buffer.read_uuid().unwrap(), uuid);
    }

    #[test]
    fn test_random_uuids() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
            let mut buffer = PacketBuffer::new();
            buffer.write_uuid(&uuid);
            buffer.write_uuid_str(&uuid.to_string()).unwrap();
            assert_eq!(&buffer.as_slice()[..16], uuid.as_bytes());
            assert_eq!(buffer.read_uuid().unwrap(), uuid);
            assert_eq!(buffer.read_uuid().unwrap(), uuid);
        }
    }

    #[test]
    fn test_uuid_string() {
        let mut buffer = PacketBuffer::new();
        buffer
            .write_uuid_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8")
            .unwrap();
        assert_eq!(
            buffer.read_uuid().unwrap().to_string(),
            "6ba7b810-9dad-11d1-80b4-00c04fd430c8"
        );

        for invalid in [
            "not-a-uuid",
            "6ba7b8109dad11d180b400c04fd430c8",
            "6ba7b810-9dad-11d1-80b4-00c04fd430cz",
            "6ba7b810-9dad-61d1-80b4-00c04fd430c8",
        ] {
            let mut buffer = PacketBuffer::new();
            assert_matches!(
                buffer.write_uuid_str(invalid),
                Err(BasaltError::InvalidUuid(_))
            );
            assert_eq!(buffer.write_offset(), 0);
        }
    }

    #[test]
    fn test_uuid_error_handling() {
        let mut buffer = PacketBuffer::from_bytes(vec![0; 8]);
        assert!(buffer.read_uuid().is_err());
        assert_eq!(buffer.read_offset(), 0);
    }

    #[test]
    fn test_position() {
        let position = BlockPosition::new(-100, 70, 2000);
        let mut buffer = PacketBuffer::new();
        buffer.write_position(&position);
        assert_eq!(buffer.write_offset(), 8);
        assert_eq!(buffer.read_position().unwrap(), position);
    }

    #[test]
    fn test_chat() {
        let chat = Chat::text("hello").color("gold");
        let mut buffer = PacketBuffer::new();
        buffer.write_chat(&chat).unwrap();
        assert_eq!(buffer.read_chat().unwrap(), chat);
    }

    #[test]
    fn test_compact_and_reset() {
        let mut buffer = PacketBuffer::from_bytes(vec![1, 2, 3, 4]);
        buffer.advance_read_offset(3).unwrap();
        buffer.compact();
        assert_eq!(buffer.read_offset(), 0);
        assert_eq!(buffer.as_slice(), &[4]);

        buffer.reset();
        assert_eq!(buffer.remaining(), 0);
        assert!(buffer.advance_read_offset(1).is_err());
    }

    #[test]
    fn test_growth_preserves_bytes() {
        let mut buffer = PacketBuffer::with_capacity(2);
        for i in 0..1000 {
            buffer.write_int(i);
        }
        assert!(buffer.capacity() >= buffer.write_offset());
        for i in 0..1000 {
            assert_eq!(buffer.read_int().unwrap(), i);
        }
    }

    #[test]
    fn test_io_traits() {
        let mut buffer = PacketBuffer::new();
        buffer.write_all(&[9, 8, 7]).unwrap();
        let mut out = [0u8; 2];
        assert_eq!(buffer.read(&mut out).unwrap(), 2);
        assert_eq!(out, [9, 8]);
        assert_eq!(buffer.read_remaining(), vec![7]);
    }

    #[test]
    fn test_byte_array() {
        let mut buffer = PacketBuffer::new();
        buffer.write_byte_array(&[1, 2, 3]);
        assert_eq!(buffer.read_byte_array().unwrap(), vec![1, 2, 3]);

        let mut buffer = PacketBuffer::new();
        buffer.write_varint(5);
        buffer.write_bytes(&[1, 2]);
        assert!(buffer.read_byte_array().is_err());
        assert_eq!(buffer.read_offset(), 0);
    }
}
