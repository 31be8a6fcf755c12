use thiserror::Error;

/// Every way a running machine can come to a fatal stop.
///
/// The core never recovers from one of these: the caller is expected to
/// report it and exit. There is deliberately no `Io` variant here — file
/// loading happens in the front end, which has its own error type.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("memory cannot grow to {requested:#06x} bytes (limit is {limit:#06x})")]
    MemoryLimitExceeded { requested: u32, limit: u32 },

    #[error("instruction pointer {ip:#06x} does not address a usable operation record")]
    InvalidInstructionPointer { ip: u32 },

    #[error("byte {byte:#04x} at {addr:#06x} is not a recognised opcode")]
    InvalidOpcode { byte: u8, addr: u32 },

    #[error("byte {byte:#04x} at {addr:#06x} is not a recognised type tag")]
    InvalidTypeTag { byte: u8, addr: u32 },

    #[error("operand address {addr:#06x} cannot be made available")]
    OperandOutOfRange { addr: u32 },

    #[error("opcode {op:?} at {ip:#06x} does not accept a floating-point destination")]
    IllegalFloatBitwise { op: crate::opcode::Opcode, ip: u32 },
}
