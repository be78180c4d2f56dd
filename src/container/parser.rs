use std::error;
use std::fmt;
use std::io;
use std::str;

use super::section;
use super::{Archive, MAGIC, VERSION};
use crate::element::ElementKind;
use crate::mesh::Block;
use crate::source::{IdSet, SampleArray};

#[derive(Debug)]
pub enum ErrorKind {
    Io(io::Error),
    BadMagic,
    UnsupportedVersion(u8),
    UnknownSection(u8),
    UnknownElementCode(String),
    BadString(str::Utf8Error),
    BadShape { rows: usize, cols: usize },
    MissingNodes,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    offset: u64,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Io(err) => write!(f, "io error: {}", err),
            ErrorKind::BadMagic => write!(f, "bad magic number"),
            ErrorKind::UnsupportedVersion(found) => {
                write!(f, "unsupported format version {}", found)
            }
            ErrorKind::UnknownSection(tag) => write!(f, "unknown section tag {:#04x}", tag),
            ErrorKind::UnknownElementCode(code) => {
                write!(f, "unknown element code {:?}", code)
            }
            ErrorKind::BadString(err) => write!(f, "when decoding name: {}", err),
            ErrorKind::BadShape { rows, cols } => {
                write!(f, "invalid sample shape {}x{}", rows, cols)
            }
            ErrorKind::MissingNodes => write!(f, "archive has no nodes section"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at byte {}: {}", self.offset, self.kind)
    }
}

impl error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error {
            kind: ErrorKind::Io(err),
            offset: 0,
        }
    }
}

/// Byte-level reader. `offset` is bumped after each successful read, so a
/// failing read reports the offset at which the item started.
struct Reader<R> {
    input: R,
    offset: u64,
}

impl<R: io::BufRead> Reader<R> {
    fn bytes<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buf = [0; N];
        self.input.read_exact(&mut buf).map_err(|err| Error {
            kind: ErrorKind::Io(err),
            offset: self.offset,
        })?;
        self.offset += N as u64;
        Ok(buf)
    }

    fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.bytes::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, Error> {
        Ok(u16::from_le_bytes(self.bytes()?))
    }

    fn read_u64(&mut self) -> Result<u64, Error> {
        Ok(u64::from_le_bytes(self.bytes()?))
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        Ok(i32::from_le_bytes(self.bytes()?))
    }

    fn read_f32(&mut self) -> Result<f32, Error> {
        Ok(f32::from_le_bytes(self.bytes()?))
    }

    fn read_i32s(&mut self, count: usize) -> Result<Vec<i32>, Error> {
        (0..count).map(|_| self.read_i32()).collect()
    }

    fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, Error> {
        (0..count).map(|_| self.read_f32()).collect()
    }

    fn read_name(&mut self) -> Result<String, Error> {
        let len = self.read_u16()? as usize;
        let start = self.offset;
        let mut buf = vec![0; len];
        self.input.read_exact(&mut buf).map_err(|err| Error {
            kind: ErrorKind::Io(err),
            offset: start,
        })?;
        self.offset += len as u64;
        String::from_utf8(buf).map_err(|err| Error {
            kind: ErrorKind::BadString(err.utf8_error()),
            offset: start,
        })
    }

    fn read_element_code(&mut self) -> Result<ElementKind, Error> {
        let start = self.offset;
        let code = self.read_name()?;
        match ElementKind::from_code(&code) {
            Some(kind) => Ok(kind),
            None => Err(Error {
                kind: ErrorKind::UnknownElementCode(code),
                offset: start,
            }),
        }
    }
}

// Archives are flat little-endian binary, laid out like so:
//
//     file     := magic version flags *section
//     magic    := "FeNC"
//     version  := %x01
//     flags    := %x00           ; reserved
//     section  := nodes / elements / elset / nodeset / samples / end
//     nodes    := %x01 count count*(3*f32) count*i32
//                                ; coordinates, then solver node numbers
//     elements := %x02 code count numbered count*width*i32 *1( count*i32 )
//                                ; code names the shape ("C3D4", ...) and
//                                ; fixes width, its node count; solver
//                                ; element numbers follow when numbered
//                                ; is %x01
//     elset    := %x03 name count count*i32
//     nodeset  := %x04 name count count*i32
//     samples  := %x05 category field code rows cols rows*cols*f32
//                                ; one array of integration-point values
//                                ; per element shape
//     end      := %x06
//     name     := len:u16 len*utf8
//     count    := u64
//
// A file that ends cleanly between sections is accepted in place of END.
// A repeated nodes section, or a repeated (category, field, code) samples
// section, overwrites the earlier one.
pub fn parse<R: io::BufRead>(input: R) -> Result<Archive, Error> {
    let mut r = Reader { input, offset: 0 };

    let magic = r.bytes::<4>()?;
    if &magic != MAGIC {
        return Err(Error {
            kind: ErrorKind::BadMagic,
            offset: 0,
        });
    }
    let version = r.read_u8()?;
    if version != VERSION {
        return Err(Error {
            kind: ErrorKind::UnsupportedVersion(version),
            offset: 4,
        });
    }
    let _flags = r.read_u8()?;

    let mut archive = Archive::default();
    let mut has_nodes = false;
    loop {
        let tag_offset = r.offset;
        let tag = match r.read_u8() {
            Ok(tag) => tag,
            Err(Error {
                kind: ErrorKind::Io(err),
                ..
            }) if err.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err),
        };
        match tag {
            section::END => break,
            section::NODES => {
                let count = r.read_u64()? as usize;
                let mut coordinates = Vec::with_capacity(count);
                for _ in 0..count {
                    coordinates.push([r.read_f32()?, r.read_f32()?, r.read_f32()?]);
                }
                archive.node_numbers = r.read_i32s(count)?;
                archive.coordinates = coordinates;
                has_nodes = true;
            }
            section::ELEMENTS => {
                let kind = r.read_element_code()?;
                let count = r.read_u64()? as usize;
                let numbered = r.read_u8()? != 0;
                let nodes = r.read_i32s(count * kind.node_count())?;
                let numbers = if numbered {
                    Some(r.read_i32s(count)?)
                } else {
                    None
                };
                archive.blocks.push(Block {
                    kind,
                    nodes,
                    numbers,
                });
            }
            section::ELSET => {
                let name = r.read_name()?;
                let count = r.read_u64()? as usize;
                let ids = r.read_i32s(count)?;
                archive.element_sets.push(IdSet::new(name, ids));
            }
            section::NODESET => {
                let name = r.read_name()?;
                let count = r.read_u64()? as usize;
                let ids = r.read_i32s(count)?;
                archive.node_sets.push(IdSet::new(name, ids));
            }
            section::SAMPLES => {
                let category = r.read_name()?;
                let field = r.read_name()?;
                let kind = r.read_element_code()?;
                let shape_offset = r.offset;
                let rows = r.read_u64()? as usize;
                let cols = r.read_u64()? as usize;
                let len = rows.checked_mul(cols).filter(|_| cols != 0).ok_or(Error {
                    kind: ErrorKind::BadShape { rows, cols },
                    offset: shape_offset,
                })?;
                let values = r.read_f32s(len)?;
                let samples = SampleArray::new(rows, cols, values).ok_or(Error {
                    kind: ErrorKind::BadShape { rows, cols },
                    offset: shape_offset,
                })?;
                archive.insert_samples(&category, &field, kind, samples);
            }
            tag => {
                return Err(Error {
                    kind: ErrorKind::UnknownSection(tag),
                    offset: tag_offset,
                })
            }
        }
    }
    if !has_nodes {
        return Err(Error {
            kind: ErrorKind::MissingNodes,
            offset: r.offset,
        });
    }

    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_name(buf: &mut Vec<u8>, name: &str) {
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(name.as_bytes());
    }

    /// Header plus a two-node nodes section, 47 bytes in total.
    fn minimal() -> Vec<u8> {
        let mut buf = b"FeNC\x01\x00".to_vec();
        buf.push(section::NODES);
        buf.extend_from_slice(&2u64.to_le_bytes());
        for coordinate in [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0] {
            buf.extend_from_slice(&coordinate.to_le_bytes());
        }
        for number in [10i32, 11] {
            buf.extend_from_slice(&number.to_le_bytes());
        }
        buf
    }

    #[test]
    fn eof_in_place_of_end() {
        let archive = parse(minimal().as_slice()).unwrap();
        assert_eq!(archive.coordinates.len(), 2);
        assert_eq!(archive.node_numbers, vec![10, 11]);
    }

    #[test]
    fn explicit_end() {
        let mut buf = minimal();
        buf.push(section::END);
        buf.extend_from_slice(b"trailing garbage");
        let archive = parse(buf.as_slice()).unwrap();
        assert_eq!(archive.node_numbers, vec![10, 11]);
    }

    #[test]
    fn bad_magic() {
        let err = parse(&b"MeWe\x01\x00"[..]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadMagic));
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn unsupported_version() {
        let err = parse(&b"FeNC\x09\x00"[..]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnsupportedVersion(9)));
    }

    #[test]
    fn unknown_section() {
        let mut buf = minimal();
        buf.push(42);
        let err = parse(buf.as_slice()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownSection(42)));
        assert_eq!(err.offset, 47);
    }

    #[test]
    fn truncation_is_located() {
        let mut buf = minimal();
        buf.truncate(buf.len() - 2);
        let err = parse(buf.as_slice()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Io(_)));
        // the second node number starts at byte 43
        assert_eq!(err.offset, 43);
    }

    #[test]
    fn missing_nodes() {
        let err = parse(&b"FeNC\x01\x00\x06"[..]).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MissingNodes));
    }

    #[test]
    fn unknown_element_code() {
        let mut buf = minimal();
        buf.push(section::ELEMENTS);
        put_name(&mut buf, "C3D99");
        let err = parse(buf.as_slice()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::UnknownElementCode(ref code) if code == "C3D99"));
    }

    #[test]
    fn zero_column_samples_are_rejected() {
        let mut buf = minimal();
        buf.push(section::SAMPLES);
        put_name(&mut buf, "fatigue");
        put_name(&mut buf, "stress");
        put_name(&mut buf, "C3D4");
        buf.extend_from_slice(&3u64.to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes());
        let err = parse(buf.as_slice()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadShape { rows: 3, cols: 0 }));
    }

    #[test]
    fn repeated_samples_overwrite() {
        let mut buf = minimal();
        for values in [[1.0f32, 2.0], [5.0, 6.0]] {
            buf.push(section::SAMPLES);
            put_name(&mut buf, "fatigue");
            put_name(&mut buf, "stress");
            put_name(&mut buf, "C3D4");
            buf.extend_from_slice(&1u64.to_le_bytes());
            buf.extend_from_slice(&2u64.to_le_bytes());
            for value in values {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        let archive = parse(buf.as_slice()).unwrap();
        assert_eq!(archive.results.len(), 1);
        assert_eq!(archive.results[0].samples.len(), 1);
        let (kind, samples) = &archive.results[0].samples[0];
        assert_eq!(*kind, ElementKind::Tetra4);
        assert_eq!(samples.values(), [5.0, 6.0]);
    }

    #[test]
    fn unnumbered_block() {
        let mut buf = minimal();
        buf.push(section::ELEMENTS);
        put_name(&mut buf, "C3D4");
        buf.extend_from_slice(&1u64.to_le_bytes());
        buf.push(0);
        for node in [10i32, 11, 10, 11] {
            buf.extend_from_slice(&node.to_le_bytes());
        }
        let archive = parse(buf.as_slice()).unwrap();
        assert_eq!(archive.blocks.len(), 1);
        assert_eq!(archive.blocks[0].kind, ElementKind::Tetra4);
        assert_eq!(archive.blocks[0].numbers, None);
    }
}
