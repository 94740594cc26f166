//! Reader for the parts of the JVM class-file format needed to count
//! public methods: constant pool, class header and method table.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;
use thiserror::Error;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

const MAGIC: u32 = 0xCAFE_BABE;

#[derive(Error, Debug)]
pub enum ClassFormatError {
    #[error("truncated class file: {0}")]
    Truncated(#[from] std::io::Error),

    #[error("not a class file (magic {0:#010x})")]
    BadMagic(u32),

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },

    #[error("constant pool index {index} is not a {expected} entry")]
    BadIndex { index: u16, expected: &'static str },

    #[error("two-slot constant at index {index} runs past the end of a pool of {count}")]
    PoolOverrun { index: u16, count: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
}

impl MethodInfo {
    pub fn is_public(&self) -> bool {
        self.access & ACC_PUBLIC != 0
    }

    pub fn is_static(&self) -> bool {
        self.access & ACC_STATIC != 0
    }

    /// Constructors and static initializers are never reported as methods.
    pub fn is_initializer(&self) -> bool {
        self.name == "<init>" || self.name == "<clinit>"
    }
}

/// A parsed class file. Names are in internal form (`java/lang/Object`).
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub major_version: u16,
    pub access: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodInfo>,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFormatError> {
        let mut r = Cursor::new(bytes);

        let magic = r.read_u32::<BigEndian>()?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }
        let _minor_version = r.read_u16::<BigEndian>()?;
        let major_version = r.read_u16::<BigEndian>()?;

        let pool = ConstantPool::read(&mut r)?;

        let access = r.read_u16::<BigEndian>()?;
        let this_class = pool.class_name(r.read_u16::<BigEndian>()?)?;
        let super_class = match r.read_u16::<BigEndian>()? {
            0 => None,
            index => Some(pool.class_name(index)?),
        };

        let interface_count = r.read_u16::<BigEndian>()?;
        let mut interfaces = Vec::with_capacity(usize::from(interface_count));
        for _ in 0..interface_count {
            interfaces.push(pool.class_name(r.read_u16::<BigEndian>()?)?);
        }

        let field_count = r.read_u16::<BigEndian>()?;
        for _ in 0..field_count {
            skip(&mut r, 6)?;
            skip_attributes(&mut r)?;
        }

        let method_count = r.read_u16::<BigEndian>()?;
        let mut methods = Vec::with_capacity(usize::from(method_count));
        for _ in 0..method_count {
            let access = r.read_u16::<BigEndian>()?;
            let name = pool.utf8(r.read_u16::<BigEndian>()?)?.to_string();
            let descriptor = pool.utf8(r.read_u16::<BigEndian>()?)?.to_string();
            skip_attributes(&mut r)?;
            methods.push(MethodInfo {
                access,
                name,
                descriptor,
            });
        }

        Ok(Self {
            major_version,
            access,
            this_class,
            super_class,
            interfaces,
            methods,
        })
    }

    pub fn is_interface(&self) -> bool {
        self.access & ACC_INTERFACE != 0
    }
}

enum Constant {
    Utf8(String),
    Class(u16),
    Other,
    // Second slot of a long or double.
    Unusable,
}

struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn read(r: &mut Cursor<&[u8]>) -> Result<Self, ClassFormatError> {
        let count = r.read_u16::<BigEndian>()?;
        let mut entries = Vec::with_capacity(usize::from(count));
        entries.push(Constant::Unusable);

        let mut index = 1u16;
        while index < count {
            let tag = r.read_u8()?;
            match tag {
                1 => {
                    let len = r.read_u16::<BigEndian>()?;
                    let start = r.position() as usize;
                    skip(r, u64::from(len))?;
                    let raw = &r.get_ref()[start..start + usize::from(len)];
                    entries.push(Constant::Utf8(String::from_utf8_lossy(raw).into_owned()));
                }
                7 => entries.push(Constant::Class(r.read_u16::<BigEndian>()?)),
                8 | 16 | 19 | 20 => {
                    skip(r, 2)?;
                    entries.push(Constant::Other);
                }
                15 => {
                    skip(r, 3)?;
                    entries.push(Constant::Other);
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    skip(r, 4)?;
                    entries.push(Constant::Other);
                }
                5 | 6 => {
                    if index >= count - 1 {
                        return Err(ClassFormatError::PoolOverrun { index, count });
                    }
                    skip(r, 8)?;
                    entries.push(Constant::Other);
                    entries.push(Constant::Unusable);
                    index += 1;
                }
                _ => return Err(ClassFormatError::UnknownTag { tag, index }),
            }
            index += 1;
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassFormatError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(ClassFormatError::BadIndex {
                index,
                expected: "Utf8",
            }),
        }
    }

    fn class_name(&self, index: u16) -> Result<String, ClassFormatError> {
        match self.entries.get(usize::from(index)) {
            Some(Constant::Class(name_index)) => Ok(self.utf8(*name_index)?.to_string()),
            _ => Err(ClassFormatError::BadIndex {
                index,
                expected: "Class",
            }),
        }
    }
}

fn skip(r: &mut Cursor<&[u8]>, len: u64) -> Result<(), ClassFormatError> {
    let target = r.position() + len;
    if target > r.get_ref().len() as u64 {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    r.set_position(target);
    Ok(())
}

fn skip_attributes(r: &mut Cursor<&[u8]>) -> Result<(), ClassFormatError> {
    let count = r.read_u16::<BigEndian>()?;
    for _ in 0..count {
        let _name_index = r.read_u16::<BigEndian>()?;
        let len = r.read_u32::<BigEndian>()?;
        skip(r, u64::from(len))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ClassFileBuilder;

    #[test]
    fn parse_reads_header_and_methods() {
        let bytes = ClassFileBuilder::class("org/example/Foo")
            .extends("org/example/Base")
            .implements("java/io/Serializable")
            .field(ACC_PUBLIC, "name", "Ljava/lang/String;")
            .method(ACC_PUBLIC, "<init>", "()V")
            .public_method("getName", "()Ljava/lang/String;")
            .method(0x0002, "secret", "()V")
            .public_static_method("of", "(Ljava/lang/String;)Lorg/example/Foo;")
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        assert_eq!(class.major_version, 52);
        assert_eq!(class.this_class, "org/example/Foo");
        assert_eq!(class.super_class.as_deref(), Some("org/example/Base"));
        assert_eq!(class.interfaces, vec!["java/io/Serializable"]);
        assert!(!class.is_interface());
        assert_eq!(class.methods.len(), 4);
        assert!(class.methods[0].is_initializer());
        assert!(class.methods[1].is_public());
        assert!(!class.methods[2].is_public());
        assert!(class.methods[3].is_static());
        assert_eq!(class.methods[3].descriptor, "(Ljava/lang/String;)Lorg/example/Foo;");
    }

    #[test]
    fn parse_handles_two_slot_constants() {
        let bytes = ClassFileBuilder::interface("org/example/Api")
            .long_constant(42)
            .long_constant(-1)
            .public_methods(2)
            .build();

        let class = ClassFile::parse(&bytes).unwrap();
        assert!(class.is_interface());
        assert_eq!(class.this_class, "org/example/Api");
        assert_eq!(class.methods.len(), 2);
    }

    #[test]
    fn parse_object_has_no_super() {
        let bytes = ClassFileBuilder::class("java/lang/Object")
            .without_super()
            .build();
        let class = ClassFile::parse(&bytes).unwrap();
        assert!(class.super_class.is_none());
    }

    #[test]
    fn parse_rejects_bad_magic() {
        let err = ClassFile::parse(b"dummy-bytes").unwrap_err();
        assert!(matches!(err, ClassFormatError::BadMagic(_)));
    }

    #[test]
    fn parse_rejects_truncated_input() {
        let bytes = ClassFileBuilder::class("org/example/Foo")
            .public_methods(3)
            .build();
        let err = ClassFile::parse(&bytes[..bytes.len() - 8]).unwrap_err();
        assert!(matches!(err, ClassFormatError::Truncated(_)));
    }

    #[test]
    fn long_constant_in_the_last_pool_slot_is_rejected() {
        let count: u16 = 65535;
        let mut bytes = 0xCAFE_BABE_u32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&52u16.to_be_bytes());
        bytes.extend_from_slice(&count.to_be_bytes());
        for _ in 1..count - 1 {
            bytes.push(3);
            bytes.extend_from_slice(&0i32.to_be_bytes());
        }
        bytes.push(5);
        bytes.extend_from_slice(&0i64.to_be_bytes());

        let err = ClassFile::parse(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ClassFormatError::PoolOverrun {
                index: 65534,
                count: 65535
            }
        ));
    }
}
