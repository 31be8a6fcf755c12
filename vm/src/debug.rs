use crate::memory::Memory;
use crate::validate::{is_opcode, is_type_tag};

/// Renders the allocated region as a sequence of sixteen-byte windows: a
/// window whose first four bytes look like an operation record (a known
/// opcode followed by three known type tags) is shown as that record's
/// mnemonic and its three operand words; any other window shows only the
/// four-byte word at its start.
pub fn dump(memory: &Memory) -> Vec<String> {
    let mut rows = Vec::new();
    let mut addr = 0u32;
    let len = memory.len();
    while addr < len {
        let row = if is_record_shaped(memory, addr) {
            render_record(memory, addr)
        } else {
            render_word(memory, addr)
        };
        rows.push(format!("{:#06x}: {}", addr, row));
        addr = addr.saturating_add(16);
    }
    rows
}

fn is_record_shaped(memory: &Memory, addr: u32) -> bool {
    is_opcode(memory.peek_u8(addr))
        && is_type_tag(memory.peek_u8(addr + 1))
        && is_type_tag(memory.peek_u8(addr + 2))
        && is_type_tag(memory.peek_u8(addr + 3))
}

fn render_record(memory: &Memory, addr: u32) -> String {
    let mnemonic: String = (addr..addr + 4).map(|a| memory.peek_u8(a) as char).collect();
    let words: Vec<String> = [addr + 4, addr + 8, addr + 12]
        .iter()
        .map(|&a| render_word_bytes(memory, a))
        .collect();
    format!("{} {} {} {}", mnemonic, words[0], words[1], words[2])
}

fn render_word(memory: &Memory, addr: u32) -> String {
    render_word_bytes(memory, addr)
}

fn render_word_bytes(memory: &Memory, addr: u32) -> String {
    let bytes = [
        memory.peek_u8(addr),
        memory.peek_u8(addr + 1),
        memory.peek_u8(addr + 2),
        memory.peek_u8(addr + 3),
    ];
    if bytes.iter().all(|&b| b.is_ascii_graphic() || b == b' ') {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("{:#010x}", u32::from_ne_bytes(bytes))
    }
}
