//! Program Image Loading.
//!
//! This module builds [`Program`] images from bytes or files. It performs:
//! 1. **Flat binaries:** Raw little-endian instruction words, no data segment.
//! 2. **ELF images:** 32- or 64-bit little-endian RISC-V executables. Executable
//!    sections become text, initialised data sections become the data segment, and
//!    the ELF entry point becomes the entry offset when it is not the start of text.
//! 3. **Files:** Reads a path and picks the format from the ELF magic.
//!
//! ELF sections keep their link addresses, so pc-relative references between text
//! and data stay valid. Zero-initialised sections (`.bss`) are not materialised:
//! unwritten memory already reads as zero.

use std::fs;
use std::path::Path;

use object::{Architecture, Object, ObjectSection, SectionKind};
use tracing::debug;

use crate::common::LoadError;
use crate::common::constants::INSTRUCTION_SIZE;
use crate::sim::Program;

/// The four bytes every ELF file starts with.
const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Largest address span the text or data sections of one image may cover.
const MAX_SEGMENT_SPAN: u64 = 1 << 32;

/// Builds a program from raw little-endian instruction words.
///
/// # Arguments
///
/// * `bytes` - The text segment; its length must be a multiple of 4.
pub fn from_flat_binary(bytes: &[u8]) -> Result<Program, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::NoText);
    }
    Ok(Program::from_words(words(bytes)?))
}

/// Builds a program from a RISC-V ELF executable.
///
/// # Arguments
///
/// * `bytes` - The ELF file contents.
///
/// # Returns
///
/// The program, or an error when the container is malformed, not little-endian
/// RISC-V, or has no executable code.
pub fn from_elf(bytes: &[u8]) -> Result<Program, LoadError> {
    let file = object::File::parse(bytes)?;
    match file.architecture() {
        Architecture::Riscv32 | Architecture::Riscv64 => {}
        _ => return Err(LoadError::Unsupported("not a RISC-V image")),
    }
    if !file.is_little_endian() {
        return Err(LoadError::Unsupported("big-endian image"));
    }

    let mut text_sections = Vec::new();
    let mut data_sections = Vec::new();
    for section in file.sections() {
        match section.kind() {
            SectionKind::Text => text_sections.push((section.address(), section.data()?)),
            SectionKind::Data | SectionKind::ReadOnlyData | SectionKind::ReadOnlyString => {
                data_sections.push((section.address(), section.data()?.to_vec()));
            }
            _ => {}
        }
    }

    let (text_start, text) = flatten(text_sections.into_iter().map(|(a, d)| (a, d.to_vec())))?;
    if text.is_empty() {
        return Err(LoadError::NoText);
    }
    let (data_start, data) = flatten(data_sections.into_iter())?;

    let entry = file.entry();
    let text_end = text_start.saturating_add(text.len() as u64);
    let entry = (entry > text_start && entry < text_end).then(|| entry - text_start);

    debug!(
        text_bytes = text.len(),
        text_addr = %format!("{text_start:#x}"),
        data_bytes = data.len(),
        data_addr = %format!("{data_start:#x}"),
        entry = ?entry,
        "loaded ELF image"
    );

    Ok(Program {
        text: words(&text)?,
        text_addr: Some(text_start),
        data_addr: (!data.is_empty()).then_some(data_start),
        data,
        entry,
    })
}

/// Reads a program from disk, choosing the ELF or flat-binary loader by content.
pub fn read_image(path: impl AsRef<Path>) -> Result<Program, LoadError> {
    let bytes = fs::read(path)?;
    if bytes.starts_with(&ELF_MAGIC) {
        from_elf(&bytes)
    } else {
        from_flat_binary(&bytes)
    }
}

/// Splits `bytes` into little-endian instruction words.
fn words(bytes: &[u8]) -> Result<Vec<u32>, LoadError> {
    if bytes.len() as u64 % INSTRUCTION_SIZE != 0 {
        return Err(LoadError::MisalignedText { len: bytes.len() });
    }
    Ok(bytes
        .chunks_exact(INSTRUCTION_SIZE as usize)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Lays sections out by address into one buffer, zero-filling gaps.
///
/// Returns the lowest section address and the buffer, or `Unsupported` when the
/// sections spread over more than [`MAX_SEGMENT_SPAN`] bytes.
fn flatten(sections: impl Iterator<Item = (u64, Vec<u8>)>) -> Result<(u64, Vec<u8>), LoadError> {
    let mut sections: Vec<_> = sections.filter(|(_, d)| !d.is_empty()).collect();
    sections.sort_by_key(|(addr, _)| *addr);
    let Some(&(start, _)) = sections.first() else {
        return Ok((0, Vec::new()));
    };
    let span = sections
        .iter()
        .map(|(addr, bytes)| (addr - start).checked_add(bytes.len() as u64))
        .try_fold(0, |acc: u64, end| end.map(|end| acc.max(end)));
    if span.is_none_or(|span| span > MAX_SEGMENT_SPAN) {
        return Err(LoadError::Unsupported("sections spread over too large a range"));
    }
    let mut out = Vec::new();
    for (addr, bytes) in sections {
        let offset = (addr - start) as usize;
        if out.len() < offset {
            out.resize(offset, 0);
        }
        let end = offset + bytes.len();
        if out.len() < end {
            out.resize(end, 0);
        }
        out[offset..end].copy_from_slice(&bytes);
    }
    Ok((start, out))
}
