use crate::definitions::{IP_ADDR, RECORD_SIZE};
use crate::dispatch::{self, Control};
use crate::error::Fault;
use crate::memory::Memory;
use crate::opcode::{Opcode, Operation};
use crate::validate;

/// What running one step of the machine resulted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Halted,
}

/// A noneleatic machine: just memory, plus the instruction pointer that
/// lives at address zero inside it.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: Memory,
}

impl Machine {
    pub fn new(brk_max: u32) -> Self {
        Machine {
            memory: Memory::new(brk_max),
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn ip(&mut self) -> Result<u32, Fault> {
        self.memory
            .ensure(IP_ADDR + 4)
            .map_err(|_| Fault::InvalidInstructionPointer { ip: IP_ADDR })?;
        Ok(self.memory.load_u32(IP_ADDR))
    }

    /// Runs exactly one fetch/decode/validate/execute cycle.
    ///
    /// The instruction pointer is advanced to point past the current
    /// record *before* the record executes, so a jump or a self-modifying
    /// write to address zero takes effect as the next record to fetch, not
    /// as a correction applied after this one already ran.
    pub fn step(&mut self) -> Result<StepOutcome, Fault> {
        let ip = self.ip()?;

        let invalid_ip = || {
            let fault = Fault::InvalidInstructionPointer { ip };
            log::error!("{fault}");
            fault
        };
        self.memory
            .ensure(ip.checked_add(RECORD_SIZE).ok_or_else(invalid_ip)?)
            .map_err(|_| invalid_ip())?;

        let raw = crate::opcode::decode(&self.memory, ip);

        let op = validate::validate_opcode(&raw)?;
        let dst = validate::validate_dst(&mut self.memory, &raw)?;
        let src1 = validate::validate_src1(&mut self.memory, &raw)?;
        let src2 = validate::validate_src2(&mut self.memory, &raw)?;
        validate::reject_float_bitwise(op, &dst, ip)?;

        if op == Opcode::BlockCopy {
            let count = src2.project(&self.memory).as_u32();
            validate::validate_block_copy(&mut self.memory, &dst, &src1, count)?;
        }

        let operation = Operation { op, dst, src1, src2 };

        self.memory.store_u32(IP_ADDR, ip + RECORD_SIZE);

        match dispatch::execute(&mut self.memory, &operation) {
            Control::Continue => Ok(StepOutcome::Continue),
            Control::Halt => Ok(StepOutcome::Halted),
        }
    }
}
