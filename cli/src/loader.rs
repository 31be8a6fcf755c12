use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nonel::memory::Memory;

use crate::cli::LoadStep;

/// Loads each file in the plan into memory, growing memory as needed.
/// The cursor starts at zero and threads from file to file, advancing by
/// each file's length, except where a step carries a `reset_cursor` (a
/// `-l` that preceded it on the command line), which overrides it before
/// that file loads. This is pure I/O: nothing here is validated or
/// executed, it is only bytes copied into the linear address space.
pub fn load_all(memory: &mut Memory, plan: &[LoadStep]) -> Result<u32> {
    let mut cursor = 0u32;
    let mut total = 0u32;
    for step in plan {
        if let Some(reset) = step.reset_cursor {
            cursor = reset;
        }
        let len = load_one(memory, &step.path, cursor)?;
        log::debug!("loaded {:?} ({} bytes) at {:#06x}", step.path, len, cursor);
        cursor += len;
        total += len;
    }
    Ok(total)
}

fn load_one(memory: &mut Memory, path: &Path, cursor: u32) -> Result<u32> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let len = bytes.len() as u32;
    if len > 0 {
        memory
            .ensure(cursor + len)
            .with_context(|| format!("{} does not fit in memory at {:#06x}", path.display(), cursor))?;
        memory.store_bytes(cursor, &bytes);
    }
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn scratch_file(contents: &[u8]) -> std::path::PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().subsec_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("nonel-loader-test-{}-{:x}", std::process::id(), nanos));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_a_file_at_its_reset_cursor() {
        let path = scratch_file(&[1, 2, 3, 4]);
        let mut mem = Memory::new(0xFFFF);
        let plan = vec![LoadStep {
            path: path.clone(),
            reset_cursor: Some(16),
        }];

        let total = load_all(&mut mem, &plan).unwrap();

        assert_eq!(total, 4);
        assert_eq!(mem.load_u32(16), u32::from_ne_bytes([1, 2, 3, 4]));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn an_empty_file_loads_zero_bytes_without_growing_memory() {
        let path = scratch_file(&[]);
        let mut mem = Memory::new(0xFFFF);
        let plan = vec![LoadStep {
            path: path.clone(),
            reset_cursor: None,
        }];

        let total = load_all(&mut mem, &plan).unwrap();

        assert_eq!(total, 0);
        assert_eq!(mem.len(), 0);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn a_second_file_without_a_reset_loads_right_after_the_first() {
        let a = scratch_file(&[0xAA, 0xAA]);
        let b = scratch_file(&[0xBB, 0xBB]);
        let mut mem = Memory::new(0xFFFF);
        let plan = vec![
            LoadStep {
                path: a.clone(),
                reset_cursor: None,
            },
            LoadStep {
                path: b.clone(),
                reset_cursor: None,
            },
        ];

        load_all(&mut mem, &plan).unwrap();

        assert_eq!(mem.load_u8(0), 0xAA);
        assert_eq!(mem.load_u8(1), 0xAA);
        assert_eq!(mem.load_u8(2), 0xBB);
        assert_eq!(mem.load_u8(3), 0xBB);
        let _ = fs::remove_file(&a);
        let _ = fs::remove_file(&b);
    }

    #[test]
    fn a_reset_cursor_overrides_the_threaded_cursor_for_that_file_only() {
        let a = scratch_file(&[0xAA, 0xAA]);
        let b = scratch_file(&[0xBB, 0xBB]);
        let c = scratch_file(&[0xCC, 0xCC]);
        let mut mem = Memory::new(0xFFFF);
        let plan = vec![
            LoadStep {
                path: a.clone(),
                reset_cursor: None,
            },
            LoadStep {
                path: b.clone(),
                reset_cursor: Some(100),
            },
            LoadStep {
                path: c.clone(),
                reset_cursor: None,
            },
        ];

        load_all(&mut mem, &plan).unwrap();

        assert_eq!(mem.load_u8(0), 0xAA);
        assert_eq!(mem.load_u8(100), 0xBB);
        assert_eq!(mem.load_u8(102), 0xCC);
        let _ = fs::remove_file(&a);
        let _ = fs::remove_file(&b);
        let _ = fs::remove_file(&c);
    }
}
