use std::convert::TryFrom;

use crate::memory::Memory;
use crate::value::{Kind, Value};

/// The fifteen operators a record's first byte may name.
///
/// Variants are named after what they do; their `TryFrom<u8>` mapping is
/// the one-character mnemonic a record is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    NoOp,
    Assign,
    BlockCopy,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Negate,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Halt,
}

impl Opcode {
    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            Opcode::BitNot | Opcode::BitAnd | Opcode::BitOr | Opcode::BitXor | Opcode::ShiftLeft | Opcode::ShiftRight
        )
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            b'_' => Opcode::NoOp,
            b'=' => Opcode::Assign,
            b'@' => Opcode::BlockCopy,
            b'!' => Opcode::BitNot,
            b'&' => Opcode::BitAnd,
            b'|' => Opcode::BitOr,
            b'^' => Opcode::BitXor,
            b'<' => Opcode::ShiftLeft,
            b'>' => Opcode::ShiftRight,
            b'~' => Opcode::Negate,
            b'+' => Opcode::Add,
            b'-' => Opcode::Sub,
            b'*' => Opcode::Mul,
            b'/' => Opcode::Div,
            b'%' => Opcode::Rem,
            b'#' => Opcode::Halt,
            _ => return Err(()),
        })
    }
}

/// The thirteen type tags a record's three operand slots may carry.
///
/// `Imm*` tags carry the value itself in the four-byte payload; the rest
/// carry an address of the given width elsewhere in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    ImmU32,
    ImmI32,
    ImmF32,
    AddrU64,
    AddrI64,
    AddrF64,
    AddrU32,
    AddrI32,
    AddrF32,
    AddrU16,
    AddrI16,
    AddrU8,
    AddrI8,
}

impl Tag {
    pub fn is_immediate(self) -> bool {
        matches!(self, Tag::ImmU32 | Tag::ImmI32 | Tag::ImmF32)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Tag::ImmF32 | Tag::AddrF32 | Tag::AddrF64)
    }

    /// Width in bytes of the addressed cell (or, for immediates, of the
    /// payload that stands in for it).
    pub fn width(self) -> u32 {
        match self {
            Tag::ImmU32 | Tag::ImmI32 | Tag::ImmF32 => 4,
            Tag::AddrU64 | Tag::AddrI64 | Tag::AddrF64 => 8,
            Tag::AddrU32 | Tag::AddrI32 | Tag::AddrF32 => 4,
            Tag::AddrU16 | Tag::AddrI16 => 2,
            Tag::AddrU8 | Tag::AddrI8 => 1,
        }
    }

    pub fn kind(self) -> Kind {
        match self {
            Tag::ImmU32 | Tag::AddrU32 => Kind::U32,
            Tag::ImmI32 | Tag::AddrI32 => Kind::I32,
            Tag::ImmF32 | Tag::AddrF32 => Kind::F32,
            Tag::AddrU64 => Kind::U64,
            Tag::AddrI64 => Kind::I64,
            Tag::AddrF64 => Kind::F64,
            Tag::AddrU16 => Kind::U16,
            Tag::AddrI16 => Kind::I16,
            Tag::AddrU8 => Kind::U8,
            Tag::AddrI8 => Kind::I8,
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            b'U' => Tag::ImmU32,
            b'I' => Tag::ImmI32,
            b'F' => Tag::ImmF32,
            b'z' => Tag::AddrU64,
            b'l' => Tag::AddrI64,
            b'd' => Tag::AddrF64,
            b'u' => Tag::AddrU32,
            b'i' => Tag::AddrI32,
            b'f' => Tag::AddrF32,
            b'h' => Tag::AddrU16,
            b's' => Tag::AddrI16,
            b'c' => Tag::AddrU8,
            b'b' => Tag::AddrI8,
            _ => return Err(()),
        })
    }
}

/// One operand slot after validation: its tag, its raw four-byte payload
/// (native-endian, not yet reinterpreted), and the address of that payload
/// field in memory.
///
/// For an addressed tag, `payload` is the address of the operand's cell and
/// `payload_addr` is where that address is stored (the record's own body).
/// For an immediate tag, `payload` already is the value's bits and
/// `payload_addr` is the address to write through when the operand is
/// assigned to — assigning through an immediate operand edits the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub tag: Tag,
    pub payload: u32,
    pub payload_addr: u32,
}

impl Operand {
    /// The address the value behind this operand actually lives at.
    pub fn address(&self) -> u32 {
        if self.tag.is_immediate() {
            self.payload_addr
        } else {
            self.payload
        }
    }

    /// Reads this operand's value out of memory, reinterpreting its raw
    /// bits according to its tag's kind.
    pub fn project(&self, memory: &Memory) -> Value {
        if self.tag.is_immediate() {
            match self.tag {
                Tag::ImmU32 => Value::U32(self.payload),
                Tag::ImmI32 => Value::I32(self.payload as i32),
                Tag::ImmF32 => Value::F32(f32::from_bits(self.payload)),
                _ => unreachable!("immediate tag outside the three immediate kinds"),
            }
        } else {
            let addr = self.payload;
            match self.tag {
                Tag::AddrU64 => Value::U64(memory.load_u64(addr)),
                Tag::AddrI64 => Value::I64(memory.load_i64(addr)),
                Tag::AddrF64 => Value::F64(memory.load_f64(addr)),
                Tag::AddrU32 => Value::U32(memory.load_u32(addr)),
                Tag::AddrI32 => Value::I32(memory.load_i32(addr)),
                Tag::AddrF32 => Value::F32(memory.load_f32(addr)),
                Tag::AddrU16 => Value::U16(memory.load_u16(addr)),
                Tag::AddrI16 => Value::I16(memory.load_i16(addr)),
                Tag::AddrU8 => Value::U8(memory.load_u8(addr)),
                Tag::AddrI8 => Value::I8(memory.load_u8(addr) as i8),
                _ => unreachable!("addressed tag outside the ten addressed kinds"),
            }
        }
    }

    /// Writes `value` into this operand's cell, casting it to the operand's
    /// kind first. Assigning through an immediate operand writes into the
    /// record's own payload field, which is how a program edits itself.
    pub fn assign(&self, memory: &mut Memory, value: Value) {
        let cast = value.cast(self.tag.kind());
        if self.tag.is_immediate() {
            memory.store_u32(self.payload_addr, cast.as_imm_bits());
            return;
        }
        let addr = self.payload;
        match cast {
            Value::U8(v) => memory.store_u8(addr, v),
            Value::I8(v) => memory.store_u8(addr, v as u8),
            Value::U16(v) => memory.store_u16(addr, v),
            Value::I16(v) => memory.store_i16(addr, v),
            Value::U32(v) => memory.store_u32(addr, v),
            Value::I32(v) => memory.store_i32(addr, v),
            Value::U64(v) => memory.store_u64(addr, v),
            Value::I64(v) => memory.store_i64(addr, v),
            Value::F32(v) => memory.store_f32(addr, v),
            Value::F64(v) => memory.store_f64(addr, v),
        }
    }
}

/// A fully decoded, not-yet-validated operation record.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord {
    pub ip: u32,
    pub op_byte: u8,
    pub dst_tag_byte: u8,
    pub src1_tag_byte: u8,
    pub src2_tag_byte: u8,
    pub dst_payload: u32,
    pub src1_payload: u32,
    pub src2_payload: u32,
}

impl RawRecord {
    pub fn dst_tag_addr(&self) -> u32 {
        self.ip + 1
    }
    pub fn src1_tag_addr(&self) -> u32 {
        self.ip + 2
    }
    pub fn src2_tag_addr(&self) -> u32 {
        self.ip + 3
    }
    pub fn dst_payload_addr(&self) -> u32 {
        self.ip + 4
    }
    pub fn src1_payload_addr(&self) -> u32 {
        self.ip + 8
    }
    pub fn src2_payload_addr(&self) -> u32 {
        self.ip + 12
    }
}

/// A fully validated operation, ready to execute.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub op: Opcode,
    pub dst: Operand,
    pub src1: Operand,
    pub src2: Operand,
}

/// Reads the sixteen bytes at `ip` as a raw record. Callers must have
/// already `ensure`d `ip + 16` is available.
pub fn decode(memory: &Memory, ip: u32) -> RawRecord {
    let raw = RawRecord {
        ip,
        op_byte: memory.load_u8(ip),
        dst_tag_byte: memory.load_u8(ip + 1),
        src1_tag_byte: memory.load_u8(ip + 2),
        src2_tag_byte: memory.load_u8(ip + 3),
        dst_payload: memory.load_u32(ip + 4),
        src1_payload: memory.load_u32(ip + 8),
        src2_payload: memory.load_u32(ip + 12),
    };
    log::trace!(
        "decoded {:#06x}: {} {} {} {}",
        ip,
        raw.op_byte as char,
        raw.dst_tag_byte as char,
        raw.src1_tag_byte as char,
        raw.src2_tag_byte as char
    );
    raw
}
