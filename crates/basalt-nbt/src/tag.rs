use std::io::{Read, Write};

use basalt_common::{BasaltError, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::compound::Compound;

/// Nesting limit for compounds and lists on read.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(Compound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn type_id(&self) -> u8 {
        match self {
            Tag::End => 0,
            Tag::Byte(_) => 1,
            Tag::Short(_) => 2,
            Tag::Int(_) => 3,
            Tag::Long(_) => 4,
            Tag::Float(_) => 5,
            Tag::Double(_) => 6,
            Tag::ByteArray(_) => 7,
            Tag::String(_) => 8,
            Tag::List(_) => 9,
            Tag::Compound(_) => 10,
            Tag::IntArray(_) => 11,
            Tag::LongArray(_) => 12,
        }
    }

    /// Reads a type id, a name and a payload. A bare End tag yields an empty name.
    pub fn read_named<R: Read>(reader: &mut R) -> Result<(String, Tag)> {
        Self::read_named_at(reader, 0)
    }

    fn read_named_at<R: Read>(reader: &mut R, depth: usize) -> Result<(String, Tag)> {
        let type_id = reader.read_u8()?;
        if type_id == 0 {
            return Ok((String::new(), Tag::End));
        }

        let name = read_string(reader)?;
        let tag = Tag::read_payload(reader, type_id, depth)?;
        Ok((name, tag))
    }

    fn read_payload<R: Read>(reader: &mut R, type_id: u8, depth: usize) -> Result<Tag> {
        if depth > MAX_DEPTH {
            return Err(BasaltError::Protocol(format!(
                "NBT nested deeper than {}",
                MAX_DEPTH
            )));
        }

        let tag = match type_id {
            0 => Tag::End,
            1 => Tag::Byte(reader.read_i8()?),
            2 => Tag::Short(reader.read_i16::<BigEndian>()?),
            3 => Tag::Int(reader.read_i32::<BigEndian>()?),
            4 => Tag::Long(reader.read_i64::<BigEndian>()?),
            5 => Tag::Float(reader.read_f32::<BigEndian>()?),
            6 => Tag::Double(reader.read_f64::<BigEndian>()?),
            7 => {
                let length = read_length(reader)?;
                let mut bytes = vec![0i8; length];
                reader.read_i8_into(&mut bytes)?;
                Tag::ByteArray(bytes)
            }
            8 => Tag::String(read_string(reader)?),
            9 => {
                let element_type = reader.read_u8()?;
                let length = read_length(reader)?;
                let mut list = Vec::with_capacity(length.min(1024));
                for _ in 0..length {
                    list.push(Tag::read_payload(reader, element_type, depth + 1)?);
                }
                Tag::List(list)
            }
            10 => {
                let mut compound = Compound::new();
                loop {
                    let (name, tag) = Tag::read_named_at(reader, depth + 1)?;
                    if let Tag::End = tag {
                        break;
                    }
                    compound.insert(name, tag);
                }
                Tag::Compound(compound)
            }
            11 => {
                let length = read_length(reader)?;
                let mut ints = vec![0i32; length];
                reader.read_i32_into::<BigEndian>(&mut ints)?;
                Tag::IntArray(ints)
            }
            12 => {
                let length = read_length(reader)?;
                let mut longs = vec![0i64; length];
                reader.read_i64_into::<BigEndian>(&mut longs)?;
                Tag::LongArray(longs)
            }
            other => {
                return Err(BasaltError::Protocol(format!(
                    "invalid NBT tag type {}",
                    other
                )))
            }
        };
        Ok(tag)
    }

    pub fn write_named<W: Write>(&self, writer: &mut W, name: &str) -> Result<()> {
        writer.write_u8(self.type_id())?;
        if let Tag::End = self {
            return Ok(());
        }
        write_string(writer, name)?;
        self.write_payload(writer)
    }

    fn write_payload<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            Tag::End => {}
            Tag::Byte(v) => writer.write_i8(*v)?,
            Tag::Short(v) => writer.write_i16::<BigEndian>(*v)?,
            Tag::Int(v) => writer.write_i32::<BigEndian>(*v)?,
            Tag::Long(v) => writer.write_i64::<BigEndian>(*v)?,
            Tag::Float(v) => writer.write_f32::<BigEndian>(*v)?,
            Tag::Double(v) => writer.write_f64::<BigEndian>(*v)?,
            Tag::ByteArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for b in v {
                    writer.write_i8(*b)?;
                }
            }
            Tag::String(v) => write_string(writer, v)?,
            Tag::List(v) => {
                let element_type = v.first().map_or(0, Tag::type_id);
                if v.iter().any(|tag| tag.type_id() != element_type) {
                    return Err(BasaltError::Protocol(
                        "NBT list elements must share one type".to_string(),
                    ));
                }
                writer.write_u8(element_type)?;
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for tag in v {
                    tag.write_payload(writer)?;
                }
            }
            Tag::Compound(v) => {
                for (name, tag) in v.iter() {
                    tag.write_named(writer, name)?;
                }
                writer.write_u8(0)?;
            }
            Tag::IntArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for i in v {
                    writer.write_i32::<BigEndian>(*i)?;
                }
            }
            Tag::LongArray(v) => {
                writer.write_i32::<BigEndian>(v.len() as i32)?;
                for l in v {
                    writer.write_i64::<BigEndian>(*l)?;
                }
            }
        }
        Ok(())
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Tag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        match self {
            Tag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Tag::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Tag::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Tag::Byte(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Tag::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            Tag::LongArray(longs) => Some(longs),
            _ => None,
        }
    }
}

fn read_length<R: Read>(reader: &mut R) -> Result<usize> {
    let length = reader.read_i32::<BigEndian>()?;
    if length < 0 {
        return Err(BasaltError::Protocol(format!(
            "negative NBT array length {}",
            length
        )));
    }
    Ok(length as usize)
}

fn read_string<R: Read>(reader: &mut R) -> Result<String> {
    let length = reader.read_u16::<BigEndian>()?;
    let mut bytes = vec![0u8; length as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| BasaltError::InvalidUtf8)
}

fn write_string<W: Write>(writer: &mut W, value: &str) -> Result<()> {
    if value.len() > u16::MAX as usize {
        return Err(BasaltError::InvalidStringLength {
            length: value.len() as i64,
            max: u16::MAX as usize,
        });
    }
    writer.write_u16::<BigEndian>(value.len() as u16)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

impl From<i8> for Tag {
    fn from(value: i8) -> Self {
        Tag::Byte(value)
    }
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Byte(value as i8)
    }
}

impl From<i16> for Tag {
    fn from(value: i16) -> Self {
        Tag::Short(value)
    }
}

impl From<i32> for Tag {
    fn from(value: i32) -> Self {
        Tag::Int(value)
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Long(value)
    }
}

impl From<f32> for Tag {
    fn from(value: f32) -> Self {
        Tag::Float(value)
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Tag::Double(value)
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::String(value.to_string())
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::String(value)
    }
}

impl From<Vec<Tag>> for Tag {
    fn from(value: Vec<Tag>) -> Self {
        Tag::List(value)
    }
}

impl From<Vec<i64>> for Tag {
    fn from(value: Vec<i64>) -> Self {
        Tag::LongArray(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn round_trip(tag: &Tag, name: &str) -> (String, Tag) {
        let mut bytes = Vec::new();
        tag.write_named(&mut bytes, name).unwrap();
        Tag::read_named(&mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_tag_read_write() {
        let test_cases = vec![
            (Tag::Byte(-42), "byte"),
            (Tag::Short(1234), "short"),
            (Tag::Int(12345678), "int"),
            (Tag::Long(123456789012), "long"),
            (Tag::Float(0.5), "float"),
            (Tag::Double(-2.25), "double"),
            (Tag::ByteArray(vec![1, -2, 3]), "bytearray"),
            (Tag::String("minecraft:overworld".to_string()), "string"),
            (Tag::List(vec![Tag::Int(1), Tag::Int(2)]), "list"),
            (Tag::List(vec![]), "empty"),
            (Tag::IntArray(vec![1, 2, 3]), "intarray"),
            (Tag::LongArray(vec![i64::MIN, 0, i64::MAX]), "longarray"),
        ];

        for (tag, name) in test_cases {
            let (read_name, read_tag) = round_trip(&tag, name);
            assert_eq!(read_name, name);
            assert_eq!(read_tag, tag);
        }
    }

    #[test]
    fn test_known_encoding() {
        let root = Compound::new().with("name", "Bananrama");
        let mut bytes = Vec::new();
        Tag::Compound(root).write_named(&mut bytes, "hello world").unwrap();

        let mut expected = vec![0x0A, 0x00, 0x0B];
        expected.extend_from_slice(b"hello world");
        expected.extend_from_slice(&[0x08, 0x00, 0x04]);
        expected.extend_from_slice(b"name");
        expected.extend_from_slice(&[0x00, 0x09]);
        expected.extend_from_slice(b"Bananrama");
        expected.push(0x00);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_nested_compound_keeps_order() {
        let inner = Compound::new().with("z", 1i8).with("a", 2i8);
        let root = Compound::new()
            .with("inner", inner)
            .with("list", vec![Tag::from("x"), Tag::from("y")]);

        let (_, read) = round_trip(&Tag::Compound(root.clone()), "");
        assert_eq!(read.as_compound(), Some(&root));

        let keys: Vec<&str> = read
            .as_compound()
            .and_then(|c| c.get("inner"))
            .and_then(Tag::as_compound)
            .map(|c| c.iter().map(|(key, _)| key).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_mixed_list_is_rejected() {
        let tag = Tag::List(vec![Tag::Int(1), Tag::Byte(1)]);
        let mut bytes = Vec::new();
        assert_matches!(
            tag.write_named(&mut bytes, "mixed"),
            Err(BasaltError::Protocol(_))
        );
    }

    #[test]
    fn test_invalid_tag_type() {
        let bytes = vec![0xFF, 0x00, 0x00];
        assert_matches!(
            Tag::read_named(&mut Cursor::new(bytes)),
            Err(BasaltError::Protocol(_))
        );
    }

    #[test]
    fn test_truncated_input() {
        let bytes = vec![0x03, 0x00, 0x01, b'a', 0x00];
        assert_matches!(
            Tag::read_named(&mut Cursor::new(bytes)),
            Err(BasaltError::Io(_))
        );
    }

    #[test]
    fn test_negative_array_length() {
        let bytes = vec![0x0B, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_matches!(
            Tag::read_named(&mut Cursor::new(bytes)),
            Err(BasaltError::Protocol(_))
        );
    }

    #[test]
    fn test_depth_limit() {
        // A list of lists nested past the limit
        let mut bytes = vec![0x09, 0x00, 0x00];
        for _ in 0..=MAX_DEPTH {
            bytes.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        }
        assert!(Tag::read_named(&mut Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Tag::Byte(42).as_i8(), Some(42));
        assert_eq!(Tag::Int(42).as_i32(), Some(42));
        assert_eq!(Tag::Long(42).as_i64(), Some(42));
        assert_eq!(Tag::Float(1.0).as_f32(), Some(1.0));
        assert_eq!(Tag::from("x").as_str(), Some("x"));
        assert_eq!(Tag::from(vec![1i64]).as_long_array(), Some(&[1i64][..]));
        assert!(Tag::Int(0).as_compound().is_none());
        assert!(Tag::Int(0).as_list().is_none());
        assert_eq!(Tag::from(true), Tag::Byte(1));
    }
}
