//! Builders for synthetic class files and jars.
//!
//! Shared by the unit tests (as `crate::fixtures`) and the integration
//! tests (as `common`) to produce archives with known method counts without
//! a JDK on the machine.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

const ACC_PUBLIC: u16 = 0x0001;
const ACC_STATIC: u16 = 0x0008;
const ACC_SUPER: u16 = 0x0020;
const ACC_INTERFACE: u16 = 0x0200;
const ACC_ABSTRACT: u16 = 0x0400;
const OBJECT: &str = "java/lang/Object";

/// Writes a jar at `path` with the given entries in order.
///
/// Names ending in `/` become directory entries. Repeated names are written
/// as separate entries, which is how malformed artifacts are reproduced.
pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> zip::result::ZipResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options)?;
            continue;
        }
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }

    zip.finish()?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Member {
    access: u16,
    name: String,
    descriptor: String,
}

/// Assembles a minimal but well-formed class file.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    access: u16,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    long_constants: Vec<i64>,
}

impl ClassFileBuilder {
    /// A public class extending `java.lang.Object`. `name` is in internal form.
    pub fn class(name: &str) -> Self {
        Self {
            access: ACC_PUBLIC | ACC_SUPER,
            name: name.to_string(),
            super_name: Some(OBJECT.to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            long_constants: Vec::new(),
        }
    }

    /// A public interface.
    pub fn interface(name: &str) -> Self {
        Self {
            access: ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT,
            ..Self::class(name)
        }
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    /// Drops the superclass reference, as only `java/lang/Object` does.
    pub fn without_super(mut self) -> Self {
        self.super_name = None;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        });
        self
    }

    pub fn public_method(self, name: &str, descriptor: &str) -> Self {
        self.method(ACC_PUBLIC, name, descriptor)
    }

    pub fn public_static_method(self, name: &str, descriptor: &str) -> Self {
        self.method(ACC_PUBLIC | ACC_STATIC, name, descriptor)
    }

    /// Adds `count` public no-arg methods named `m0`, `m1`, ...
    pub fn public_methods(mut self, count: usize) -> Self {
        for i in 0..count {
            self = self.public_method(&format!("m{i}"), "()V");
        }
        self
    }

    /// Adds a `CONSTANT_Long`, which occupies two constant pool slots.
    pub fn long_constant(mut self, value: i64) -> Self {
        self.long_constants.push(value);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut pool = PoolWriter::default();
        let mut body = Vec::new();

        for value in &self.long_constants {
            pool.long(*value);
        }

        put_u16(&mut body, self.access);
        let this_index = pool.class(&self.name);
        put_u16(&mut body, this_index);
        let super_index = match self.super_name.as_deref() {
            Some(name) => pool.class(name),
            None => 0,
        };
        put_u16(&mut body, super_index);

        put_u16(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u16(&mut body, index);
        }

        put_u16(&mut body, self.fields.len() as u16);
        for field in &self.fields {
            write_member(&mut body, &mut pool, field, "Deprecated", &[]);
        }

        put_u16(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            write_member(&mut body, &mut pool, method, "Custom", &[0xCA, 0xFE, 0x00]);
        }

        put_u16(&mut body, 0);

        let mut out = Vec::with_capacity(10 + pool.bytes.len() + body.len());
        out.extend_from_slice(&0xCAFE_BABE_u32.to_be_bytes());
        put_u16(&mut out, 0);
        put_u16(&mut out, 52);
        put_u16(&mut out, pool.next);
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn write_member(
    body: &mut Vec<u8>,
    pool: &mut PoolWriter,
    member: &Member,
    attribute: &str,
    attribute_data: &[u8],
) {
    put_u16(body, member.access);
    let name = pool.utf8(&member.name);
    put_u16(body, name);
    let descriptor = pool.utf8(&member.descriptor);
    put_u16(body, descriptor);
    put_u16(body, 1);
    let attribute_name = pool.utf8(attribute);
    put_u16(body, attribute_name);
    body.extend_from_slice(&(attribute_data.len() as u32).to_be_bytes());
    body.extend_from_slice(attribute_data);
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

struct PoolWriter {
    bytes: Vec<u8>,
    next: u16,
    utf8: HashMap<String, u16>,
    classes: HashMap<String, u16>,
}

impl Default for PoolWriter {
    fn default() -> Self {
        Self {
            bytes: Vec::new(),
            next: 1,
            utf8: HashMap::new(),
            classes: HashMap::new(),
        }
    }
}

impl PoolWriter {
    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8.get(value) {
            return *index;
        }
        let index = self.next;
        self.next += 1;
        self.bytes.push(1);
        put_u16(&mut self.bytes, value.len() as u16);
        self.bytes.extend_from_slice(value.as_bytes());
        self.utf8.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        let index = self.next;
        self.next += 1;
        self.bytes.push(7);
        put_u16(&mut self.bytes, name_index);
        self.classes.insert(name.to_string(), index);
        index
    }

    fn long(&mut self, value: i64) {
        self.bytes.push(5);
        self.bytes.extend_from_slice(&value.to_be_bytes());
        self.next += 2;
    }
}
