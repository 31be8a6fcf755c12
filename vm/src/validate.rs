use std::convert::TryFrom;

use crate::error::Fault;
use crate::memory::Memory;
use crate::opcode::{Opcode, Operand, RawRecord, Tag};

pub fn is_opcode(byte: u8) -> bool {
    Opcode::try_from(byte).is_ok()
}

pub fn is_type_tag(byte: u8) -> bool {
    Tag::try_from(byte).is_ok()
}

/// Checks a raw record's opcode and three tags, growing memory to cover
/// each addressed operand's cell. Returns the validated operation or the
/// specific fault that made the record unusable.
pub fn validate_opcode(raw: &RawRecord) -> Result<Opcode, Fault> {
    Opcode::try_from(raw.op_byte).map_err(|_| {
        let fault = Fault::InvalidOpcode {
            byte: raw.op_byte,
            addr: raw.ip,
        };
        log::error!("{fault}");
        fault
    })
}

fn validate_operand(memory: &mut Memory, tag_byte: u8, tag_addr: u32, payload: u32, payload_addr: u32) -> Result<Operand, Fault> {
    let tag = Tag::try_from(tag_byte).map_err(|_| {
        let fault = Fault::InvalidTypeTag {
            byte: tag_byte,
            addr: tag_addr,
        };
        log::error!("{fault}");
        fault
    })?;
    if !tag.is_immediate() {
        let end = payload.checked_add(tag.width()).ok_or(Fault::OperandOutOfRange { addr: payload })?;
        memory.ensure(end).map_err(|_| {
            let fault = Fault::OperandOutOfRange { addr: payload };
            log::error!("{fault}");
            fault
        })?;
    }
    Ok(Operand {
        tag,
        payload,
        payload_addr,
    })
}

pub fn validate_dst(memory: &mut Memory, raw: &RawRecord) -> Result<Operand, Fault> {
    validate_operand(memory, raw.dst_tag_byte, raw.dst_tag_addr(), raw.dst_payload, raw.dst_payload_addr())
}

pub fn validate_src1(memory: &mut Memory, raw: &RawRecord) -> Result<Operand, Fault> {
    validate_operand(memory, raw.src1_tag_byte, raw.src1_tag_addr(), raw.src1_payload, raw.src1_payload_addr())
}

pub fn validate_src2(memory: &mut Memory, raw: &RawRecord) -> Result<Operand, Fault> {
    validate_operand(memory, raw.src2_tag_byte, raw.src2_tag_addr(), raw.src2_payload, raw.src2_payload_addr())
}

/// Bitwise and shift operators reject a floating-point destination before
/// anything else about the record is acted on.
pub fn reject_float_bitwise(op: Opcode, dst: &Operand, ip: u32) -> Result<(), Fault> {
    if op.is_bitwise() && dst.tag.is_float() {
        let fault = Fault::IllegalFloatBitwise { op, ip };
        log::error!("{fault}");
        return Err(fault);
    }
    Ok(())
}

/// Block copy's own pre-check: `n` elements of `dst_tag`'s width, at
/// *both* endpoints — the copy is element-strided by the destination
/// width even when the source tag's width differs. Growing each
/// operand's single cell (in `validate_operand`) is not enough; the
/// whole `n`-element range has to be available before the `memmove`
/// runs, or it would index past the allocated buffer instead of
/// failing as a proper fault.
pub fn validate_block_copy(memory: &mut Memory, dst: &Operand, src1: &Operand, count: u32) -> Result<(), Fault> {
    let span = dst
        .tag
        .width()
        .checked_mul(count)
        .ok_or(Fault::OperandOutOfRange { addr: dst.address() })?;

    let dst_end = dst.address().checked_add(span).ok_or(Fault::OperandOutOfRange { addr: dst.address() })?;
    memory.ensure(dst_end).map_err(|_| Fault::OperandOutOfRange { addr: dst.address() })?;

    let src_end = src1.address().checked_add(span).ok_or(Fault::OperandOutOfRange { addr: src1.address() })?;
    memory.ensure(src_end).map_err(|_| Fault::OperandOutOfRange { addr: src1.address() })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_every_opcode_and_rejects_the_rest() {
        assert!(is_opcode(b'+'));
        assert!(is_opcode(b'#'));
        assert!(!is_opcode(b'?'));
    }

    #[test]
    fn recognises_every_tag_and_rejects_the_rest() {
        assert!(is_type_tag(b'U'));
        assert!(is_type_tag(b'b'));
        assert!(!is_type_tag(b'x'));
    }

    #[test]
    fn validate_grows_memory_for_addressed_operands() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(16).unwrap();
        let raw = RawRecord {
            ip: 0,
            op_byte: b'=',
            dst_tag_byte: b'u',
            src1_tag_byte: b'U',
            src2_tag_byte: b'U',
            dst_payload: 100,
            src1_payload: 7,
            src2_payload: 0,
        };
        let dst = validate_dst(&mut mem, &raw).unwrap();
        assert_eq!(dst.tag, Tag::AddrU32);
        assert!(mem.len() >= 104);
    }

    #[test]
    fn validate_rejects_unknown_tag_byte() {
        let mut mem = Memory::new(0xFFFF);
        let raw = RawRecord {
            ip: 0,
            op_byte: b'=',
            dst_tag_byte: b'?',
            src1_tag_byte: b'U',
            src2_tag_byte: b'U',
            dst_payload: 0,
            src1_payload: 0,
            src2_payload: 0,
        };
        assert!(validate_dst(&mut mem, &raw).is_err());
    }

    #[test]
    fn block_copy_reserves_the_full_element_span_at_both_ends() {
        let mut mem = Memory::new(0xFFFF);
        let dst = Operand {
            tag: Tag::AddrU32,
            payload: 2000,
            payload_addr: 8,
        };
        let src1 = Operand {
            tag: Tag::AddrU8,
            payload: 1000,
            payload_addr: 12,
        };
        validate_block_copy(&mut mem, &dst, &src1, 3).unwrap();
        // dst is the 4-byte tag, so 3 elements means 12 bytes at both ends,
        // even though src1's own tag is only 1 byte wide.
        assert!(mem.len() >= 2012);
        assert!(mem.len() >= 1012);
    }

    #[test]
    fn block_copy_with_an_address_overflowing_span_is_a_fault() {
        let mut mem = Memory::new(0xFFFF);
        let dst = Operand {
            tag: Tag::AddrU32,
            payload: u32::MAX - 1,
            payload_addr: 8,
        };
        let src1 = Operand {
            tag: Tag::AddrU8,
            payload: 0,
            payload_addr: 12,
        };
        assert!(validate_block_copy(&mut mem, &dst, &src1, 3).is_err());
    }
}
