//! Program Image.
//!
//! A linked program as the engine consumes it: the instruction words, the initial
//! contents of the static data segment, and an optional entry point. The image is
//! immutable; a [`Simulator`](super::Simulator) borrows it for its whole lifetime so
//! that `reset` can reload the original state.

use crate::common::constants::INSTRUCTION_SIZE;

/// An already-linked program image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Instruction words, placed contiguously from the text load address.
    pub text: Vec<u32>,
    /// Initial bytes of the static data segment, placed at the data load address.
    pub data: Vec<u8>,
    /// Address the image was linked to run text at; `None` uses the configured text base.
    pub text_addr: Option<u64>,
    /// Address the image was linked to place data at; `None` uses the configured data base.
    pub data_addr: Option<u64>,
    /// Byte offset of the entry point (a global `main`) inside `text`.
    ///
    /// When present, execution starts there and `ra` initially points at the end of
    /// text, so returning from `main` ends the program.
    pub entry: Option<u64>,
}

impl Program {
    /// Builds an image from instruction words with no data and no explicit entry.
    pub fn from_words(text: Vec<u32>) -> Self {
        Self {
            text,
            data: Vec::new(),
            text_addr: None,
            data_addr: None,
            entry: None,
        }
    }

    /// Sets the initial data segment.
    #[must_use]
    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Pins the text segment to `addr` instead of the configured text base.
    #[must_use]
    pub fn with_text_addr(mut self, addr: u64) -> Self {
        self.text_addr = Some(addr);
        self
    }

    /// Pins the data segment to `addr` instead of the configured data base.
    #[must_use]
    pub fn with_data_addr(mut self, addr: u64) -> Self {
        self.data_addr = Some(addr);
        self
    }

    /// Sets the entry point as a byte offset into `text`.
    #[must_use]
    pub fn with_entry(mut self, offset: u64) -> Self {
        self.entry = Some(offset);
        self
    }

    /// Length of the text segment in bytes.
    pub fn text_len(&self) -> u64 {
        self.text.len() as u64 * INSTRUCTION_SIZE
    }

    /// Little-endian bytes of the text segment.
    pub fn text_bytes(&self) -> Vec<u8> {
        self.text.iter().flat_map(|w| w.to_le_bytes()).collect()
    }
}
