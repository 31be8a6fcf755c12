use crate::memory::Memory;
use crate::opcode::{Operation, Opcode};
use crate::value::Value;

macro_rules! int_binop {
    ($name:ident, $op:tt) => {
        fn $name(lhs: Value, rhs: Value) -> Value {
            match (lhs, rhs) {
                (Value::U8(a), Value::U8(b)) => Value::U8(a $op b),
                (Value::I8(a), Value::I8(b)) => Value::I8(a $op b),
                (Value::U16(a), Value::U16(b)) => Value::U16(a $op b),
                (Value::I16(a), Value::I16(b)) => Value::I16(a $op b),
                (Value::U32(a), Value::U32(b)) => Value::U32(a $op b),
                (Value::I32(a), Value::I32(b)) => Value::I32(a $op b),
                (Value::U64(a), Value::U64(b)) => Value::U64(a $op b),
                (Value::I64(a), Value::I64(b)) => Value::I64(a $op b),
                _ => unreachable!("bitwise operator reached a float operand; the validator should have rejected this"),
            }
        }
    };
}
int_binop!(bitand, &);
int_binop!(bitor, |);
int_binop!(bitxor, ^);

fn bitnot(v: Value) -> Value {
    match v {
        Value::U8(a) => Value::U8(!a),
        Value::I8(a) => Value::I8(!a),
        Value::U16(a) => Value::U16(!a),
        Value::I16(a) => Value::I16(!a),
        Value::U32(a) => Value::U32(!a),
        Value::I32(a) => Value::I32(!a),
        Value::U64(a) => Value::U64(!a),
        Value::I64(a) => Value::I64(!a),
        _ => unreachable!("bitwise operator reached a float operand; the validator should have rejected this"),
    }
}

fn neg(v: Value) -> Value {
    match v {
        Value::U8(a) => Value::U8(a.wrapping_neg()),
        Value::I8(a) => Value::I8(a.wrapping_neg()),
        Value::U16(a) => Value::U16(a.wrapping_neg()),
        Value::I16(a) => Value::I16(a.wrapping_neg()),
        Value::U32(a) => Value::U32(a.wrapping_neg()),
        Value::I32(a) => Value::I32(a.wrapping_neg()),
        Value::U64(a) => Value::U64(a.wrapping_neg()),
        Value::I64(a) => Value::I64(a.wrapping_neg()),
        Value::F32(a) => Value::F32(-a),
        Value::F64(a) => Value::F64(-a),
    }
}

/// Shift amounts are not masked by the validator; they are masked here,
/// the same way a real shift instruction masks its count against the
/// operand width rather than leaving it undefined.
fn shl(lhs: Value, amount: u32) -> Value {
    match lhs {
        Value::U8(a) => Value::U8(a.wrapping_shl(amount)),
        Value::I8(a) => Value::I8(a.wrapping_shl(amount)),
        Value::U16(a) => Value::U16(a.wrapping_shl(amount)),
        Value::I16(a) => Value::I16(a.wrapping_shl(amount)),
        Value::U32(a) => Value::U32(a.wrapping_shl(amount)),
        Value::I32(a) => Value::I32(a.wrapping_shl(amount)),
        Value::U64(a) => Value::U64(a.wrapping_shl(amount)),
        Value::I64(a) => Value::I64(a.wrapping_shl(amount)),
        _ => unreachable!("bitwise operator reached a float operand; the validator should have rejected this"),
    }
}

fn shr(lhs: Value, amount: u32) -> Value {
    match lhs {
        Value::U8(a) => Value::U8(a.wrapping_shr(amount)),
        Value::I8(a) => Value::I8(a.wrapping_shr(amount)),
        Value::U16(a) => Value::U16(a.wrapping_shr(amount)),
        Value::I16(a) => Value::I16(a.wrapping_shr(amount)),
        Value::U32(a) => Value::U32(a.wrapping_shr(amount)),
        Value::I32(a) => Value::I32(a.wrapping_shr(amount)),
        Value::U64(a) => Value::U64(a.wrapping_shr(amount)),
        Value::I64(a) => Value::I64(a.wrapping_shr(amount)),
        _ => unreachable!("bitwise operator reached a float operand; the validator should have rejected this"),
    }
}

macro_rules! arith_binop {
    ($name:ident, $wrap:ident, $fop:tt) => {
        fn $name(lhs: Value, rhs: Value) -> Value {
            match (lhs, rhs) {
                (Value::U8(a), Value::U8(b)) => Value::U8(a.$wrap(b)),
                (Value::I8(a), Value::I8(b)) => Value::I8(a.$wrap(b)),
                (Value::U16(a), Value::U16(b)) => Value::U16(a.$wrap(b)),
                (Value::I16(a), Value::I16(b)) => Value::I16(a.$wrap(b)),
                (Value::U32(a), Value::U32(b)) => Value::U32(a.$wrap(b)),
                (Value::I32(a), Value::I32(b)) => Value::I32(a.$wrap(b)),
                (Value::U64(a), Value::U64(b)) => Value::U64(a.$wrap(b)),
                (Value::I64(a), Value::I64(b)) => Value::I64(a.$wrap(b)),
                (Value::F32(a), Value::F32(b)) => Value::F32(a $fop b),
                (Value::F64(a), Value::F64(b)) => Value::F64(a $fop b),
                _ => unreachable!("lhs and rhs were both cast to the destination kind before reaching here"),
            }
        }
    };
}
arith_binop!(add, wrapping_add, +);
arith_binop!(sub, wrapping_sub, -);
arith_binop!(mul, wrapping_mul, *);

/// Division and remainder are deliberately left as the plain operators:
/// integer division or remainder by zero panics, which is this core's
/// stand-in for the host's arithmetic trap. Nothing upstream guards
/// against it.
macro_rules! trapping_binop {
    ($name:ident, $op:tt) => {
        fn $name(lhs: Value, rhs: Value) -> Value {
            match (lhs, rhs) {
                (Value::U8(a), Value::U8(b)) => Value::U8(a $op b),
                (Value::I8(a), Value::I8(b)) => Value::I8(a $op b),
                (Value::U16(a), Value::U16(b)) => Value::U16(a $op b),
                (Value::I16(a), Value::I16(b)) => Value::I16(a $op b),
                (Value::U32(a), Value::U32(b)) => Value::U32(a $op b),
                (Value::I32(a), Value::I32(b)) => Value::I32(a $op b),
                (Value::U64(a), Value::U64(b)) => Value::U64(a $op b),
                (Value::I64(a), Value::I64(b)) => Value::I64(a $op b),
                (Value::F32(a), Value::F32(b)) => Value::F32(a $op b),
                (Value::F64(a), Value::F64(b)) => Value::F64(a $op b),
                _ => unreachable!("lhs and rhs were both cast to the destination kind before reaching here"),
            }
        }
    };
}
trapping_binop!(div, /);
trapping_binop!(rem, %);

/// What a single executed operation tells the runner to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Halt,
}

/// Executes one validated operation against memory. The instruction
/// pointer has already been advanced by the caller before this runs, so a
/// jump is simply an assignment whose destination is address zero.
pub fn execute(memory: &mut Memory, operation: &Operation) -> Control {
    match operation.op {
        Opcode::NoOp => Control::Continue,

        Opcode::Halt => Control::Halt,

        Opcode::Assign => {
            let v = operation.src1.project(memory);
            operation.dst.assign(memory, v);
            Control::Continue
        }

        Opcode::BlockCopy => {
            let count = operation.src2.project(memory).as_u32();
            let elem_width = operation.dst.tag.width();
            let len = elem_width * count;
            memory.copy_within(operation.dst.address(), operation.src1.address(), len);
            Control::Continue
        }

        Opcode::BitNot => {
            let target = operation.dst.tag.kind();
            let v = bitnot(operation.src1.project(memory).cast(target));
            operation.dst.assign(memory, v);
            Control::Continue
        }

        Opcode::Negate => {
            let target = operation.dst.tag.kind();
            let v = neg(operation.src1.project(memory).cast(target));
            operation.dst.assign(memory, v);
            Control::Continue
        }

        Opcode::BitAnd | Opcode::BitOr | Opcode::BitXor => {
            let target = operation.dst.tag.kind();
            let a = operation.src1.project(memory).cast(target);
            let b = operation.src2.project(memory).cast(target);
            let v = match operation.op {
                Opcode::BitAnd => bitand(a, b),
                Opcode::BitOr => bitor(a, b),
                Opcode::BitXor => bitxor(a, b),
                _ => unreachable!(),
            };
            operation.dst.assign(memory, v);
            Control::Continue
        }

        Opcode::ShiftLeft | Opcode::ShiftRight => {
            let target = operation.dst.tag.kind();
            let a = operation.src1.project(memory).cast(target);
            let amount = operation.src2.project(memory).as_u32();
            let v = if operation.op == Opcode::ShiftLeft {
                shl(a, amount)
            } else {
                shr(a, amount)
            };
            operation.dst.assign(memory, v);
            Control::Continue
        }

        Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Rem => {
            let target = operation.dst.tag.kind();
            let a = operation.src1.project(memory).cast(target);
            let b = operation.src2.project(memory).cast(target);
            let v = match operation.op {
                Opcode::Add => add(a, b),
                Opcode::Sub => sub(a, b),
                Opcode::Mul => mul(a, b),
                Opcode::Div => div(a, b),
                Opcode::Rem => rem(a, b),
                _ => unreachable!(),
            };
            operation.dst.assign(memory, v);
            Control::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{Operand, Operation, Tag};

    fn imm(tag: Tag, payload: u32) -> Operand {
        Operand {
            tag,
            payload,
            payload_addr: 0,
        }
    }

    fn addr(tag: Tag, addr: u32) -> Operand {
        Operand {
            tag,
            payload: addr,
            payload_addr: 0,
        }
    }

    #[test]
    fn assign_writes_dst_cast_to_its_own_kind() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(64).unwrap();
        mem.store_u8(32, 0);
        let op = Operation {
            op: Opcode::Assign,
            dst: addr(Tag::AddrU8, 32),
            src1: imm(Tag::ImmU32, 300),
            src2: imm(Tag::ImmU32, 0),
        };
        execute(&mut mem, &op);
        assert_eq!(mem.load_u8(32), 300u32 as u8);
    }

    #[test]
    fn halt_reports_control_halt() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(16).unwrap();
        let op = Operation {
            op: Opcode::Halt,
            dst: imm(Tag::ImmU32, 0),
            src1: imm(Tag::ImmU32, 0),
            src2: imm(Tag::ImmU32, 0),
        };
        assert_eq!(execute(&mut mem, &op), Control::Halt);
    }

    #[test]
    fn add_wraps_instead_of_panicking_on_overflow() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(64).unwrap();
        mem.store_u8(40, 0);
        let op = Operation {
            op: Opcode::Add,
            dst: addr(Tag::AddrU8, 40),
            src1: imm(Tag::ImmU32, 255),
            src2: imm(Tag::ImmU32, 1),
        };
        execute(&mut mem, &op);
        assert_eq!(mem.load_u8(40), 0);
    }

    #[test]
    fn block_copy_moves_count_times_destination_width_bytes() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(64).unwrap();
        for i in 0..4u8 {
            mem.store_u8(i as u32, i + 1);
        }
        let op = Operation {
            op: Opcode::BlockCopy,
            dst: addr(Tag::AddrU8, 10),
            src1: addr(Tag::AddrU8, 0),
            src2: imm(Tag::ImmU32, 4),
        };
        execute(&mut mem, &op);
        let got: Vec<u8> = (10..14).map(|a| mem.load_u8(a)).collect();
        assert_eq!(got, vec![1, 2, 3, 4]);
    }

    #[test]
    fn shift_amount_is_masked_not_left_undefined() {
        let mut mem = Memory::new(0xFFFF);
        mem.ensure(64).unwrap();
        mem.store_u32(20, 0);
        let op = Operation {
            op: Opcode::ShiftLeft,
            dst: addr(Tag::AddrU32, 20),
            src1: imm(Tag::ImmU32, 1),
            src2: imm(Tag::ImmU32, 32),
        };
        execute(&mut mem, &op);
        assert_eq!(mem.load_u32(20), 1);
    }
}
