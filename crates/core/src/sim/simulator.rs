//! Execution Engine.
//!
//! The simulator owns the architectural state of one run (registers, pc, memory,
//! allocator) and executes a borrowed [`Program`] one instruction per cycle.
//!
//! # State machine
//!
//! ```text
//! Ready ──step/run──▶ Running ──breakpoint ahead──▶ AtBreakpoint
//!                        │  ▲                            │
//!                        │  └────── step/run/run_to_breakpoint
//!                        ▼
//!                     Halted  (exit call, pc past the end of text, or a fatal error)
//! ```
//!
//! A breakpoint is either an `EBREAK` word or an address registered with
//! [`Simulator::set_breakpoint`]. `run_to_breakpoint` stops *before* such an
//! instruction; the next call of any driving method executes it. `EBREAK` itself
//! then runs as a no-op and counts one cycle.
//!
//! # Errors
//!
//! A load or store rejected by the alignment policy does not retire: pc, registers
//! and the cycle count are unchanged and the run can continue once the caller has
//! dealt with it. Every other error halts the engine.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::{ConfigError, RegisterFile, SimError, Xlen};
use crate::config::{Config, MemoryConfig};
use crate::core::alu::Alu;
use crate::core::branch;
use crate::core::control::decode_control;
use crate::core::signals::{ControlSignals, JumpKind, OpASrc, OpBSrc, SystemOp};
use crate::heap::Heap;
use crate::isa::abi;
use crate::isa::decode::decode;
use crate::isa::disasm::disassemble;
use crate::isa::instruction::Decoded;
use crate::isa::privileged::opcodes::EBREAK;
use crate::memory::Memory;
use crate::sim::Program;
use crate::sim::ecall::{self, EcallContext, EcallOutcome};
use crate::stats::SimStats;

/// Engine state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    /// Constructed or reset; nothing executed yet.
    #[default]
    Ready,
    /// Executing or between steps.
    Running,
    /// Paused in front of a breakpoint; the instruction at `pc` has not executed.
    AtBreakpoint,
    /// Finished; further driving calls do nothing.
    Halted,
}

/// Instruction-level RISC-V simulator.
#[derive(Debug)]
pub struct Simulator<'p> {
    program: &'p Program,
    config: Config,
    xlen: Xlen,
    regs: RegisterFile,
    pc: u64,
    memory: Memory,
    heap: Heap,
    state: RunState,
    exit_code: Option<i64>,
    breakpoints: BTreeSet<u64>,
    stats: SimStats,
    text_start: u64,
    text_end: u64,
    data_start: u64,
}

impl<'p> Simulator<'p> {
    /// Creates a simulator for `program`.
    ///
    /// # Arguments
    ///
    /// * `program` - The image to run; borrowed for the simulator's lifetime.
    /// * `config` - Width, memory map, alignment policy and heap settings.
    ///
    /// # Returns
    ///
    /// A simulator in [`RunState::Ready`], or an error when the configuration is
    /// invalid, the image does not fit the address space, or a text or data segment
    /// reaches into the heap window.
    pub fn new(program: &'p Program, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        let xlen = config.general.xlen;
        let m = &config.memory;

        let text_start = program.text_addr.unwrap_or(m.text_base);
        let data_start = program.data_addr.unwrap_or(m.data_base);
        if text_start % INSTRUCTION_SIZE != 0 {
            return Err(ConfigError::Invalid(format!(
                "text address {text_start:#x} is not instruction aligned"
            )));
        }
        let text_end = text_start
            .checked_add(program.text_len())
            .filter(|&end| end <= xlen.max_addr())
            .ok_or_else(|| ConfigError::Invalid("text segment exceeds the address space".into()))?;
        let data_fits = data_start
            .checked_add(program.data.len() as u64)
            .is_some_and(|end| end <= xlen.max_addr());
        if !data_fits {
            return Err(ConfigError::Invalid(
                "data segment exceeds the address space".into(),
            ));
        }
        clear_of_heap("text", text_start, program.text_len(), m)?;
        clear_of_heap("data", data_start, program.data.len() as u64, m)?;
        if program.entry.is_some_and(|e| e >= program.text_len() || e % INSTRUCTION_SIZE != 0) {
            return Err(ConfigError::Invalid(
                "entry point is outside the text segment".into(),
            ));
        }

        let memory = Memory::new(xlen, m.aligned_addresses);
        let heap = Heap::new(xlen, m.heap_base, m.heap_limit, config.heap.always_calloc);
        let mut sim = Self {
            program,
            xlen,
            regs: RegisterFile::new(xlen),
            pc: text_start,
            memory,
            heap,
            state: RunState::Ready,
            exit_code: None,
            breakpoints: BTreeSet::new(),
            stats: SimStats::default(),
            text_start,
            text_end,
            data_start,
            config,
        };
        sim.load_image();
        Ok(sim)
    }

    /// Restores the freshly loaded state.
    ///
    /// Memory, registers, pc, cycles, the allocator and statistics start over;
    /// configuration and breakpoints are kept.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.regs = RegisterFile::new(self.xlen);
        self.heap.reset();
        self.stats = SimStats::default();
        self.state = RunState::Ready;
        self.exit_code = None;
        self.load_image();
        debug!("simulator reset");
    }

    fn load_image(&mut self) {
        let m = &self.config.memory;
        self.memory.store_bytes(self.text_start, &self.program.text_bytes());
        self.memory.store_bytes(self.data_start, &self.program.data);

        self.pc = self.text_start + self.program.entry.unwrap_or(0);
        self.regs.write(abi::REG_SP, m.stack_pointer);
        self.regs.write(abi::REG_GP, m.global_pointer);
        if self.program.entry.is_some() {
            self.regs.write(abi::REG_RA, self.text_end);
        }
    }

    /// Executes exactly one instruction, ignoring breakpoints.
    ///
    /// A pending breakpoint pause is consumed. Does nothing once halted.
    ///
    /// # Returns
    ///
    /// The state after the instruction.
    pub fn step(&mut self) -> Result<RunState, SimError> {
        if self.state == RunState::Halted {
            return Ok(RunState::Halted);
        }
        self.state = RunState::Running;
        self.execute_one()?;
        Ok(self.state)
    }

    /// Runs until the program halts.
    ///
    /// Breakpoints do not pause this call; `EBREAK` executes as a no-op.
    pub fn run(&mut self) -> Result<RunState, SimError> {
        while self.state != RunState::Halted {
            let _ = self.step()?;
        }
        Ok(self.state)
    }

    /// Runs until the next breakpoint or until the program halts.
    ///
    /// When called while paused, the paused instruction executes first so that
    /// repeated calls advance from one breakpoint to the next.
    ///
    /// # Returns
    ///
    /// [`RunState::AtBreakpoint`] or [`RunState::Halted`].
    pub fn run_to_breakpoint(&mut self) -> Result<RunState, SimError> {
        if self.state == RunState::AtBreakpoint {
            let _ = self.step()?;
        }
        while self.state != RunState::Halted {
            if self.in_text(self.pc) && self.is_breakpoint(self.pc) {
                self.state = RunState::AtBreakpoint;
                debug!(pc = %format!("{:#x}", self.pc), cycles = self.cycles(), "paused at breakpoint");
                break;
            }
            let _ = self.step()?;
        }
        Ok(self.state)
    }

    fn execute_one(&mut self) -> Result<(), SimError> {
        if !self.in_text(self.pc) {
            self.halt(0);
            return Ok(());
        }
        if let Some(limit) = self.config.general.max_steps {
            if self.stats.cycles >= limit {
                return Err(self.fail(SimError::StepLimitExceeded {
                    limit,
                    pc: self.pc,
                }));
            }
        }

        let pc = self.pc;
        let inst = self.memory.load_word(pc)?;
        let d = decode(inst);
        let c = match decode_control(&d, self.xlen, pc) {
            Ok(c) => c,
            Err(e) => return Err(self.fail(e)),
        };
        if self.config.general.trace_instructions {
            trace!(pc = %format!("{pc:#010x}"), inst = %format!("{inst:#010x}"), "{}", disassemble(inst));
        }

        let next_pc = match self.apply(pc, &d, &c) {
            Ok(next) => next,
            Err(SimError::Memory(e)) => return Err(SimError::Memory(e)),
            Err(e) => return Err(self.fail(e)),
        };

        self.stats.record(c.class);
        if self.state == RunState::Halted {
            return Ok(());
        }
        self.pc = next_pc;
        if !self.in_text(self.pc) {
            self.halt(0);
        }
        Ok(())
    }

    /// Applies the effects of one instruction and returns the next pc.
    ///
    /// Memory errors are raised before any register is written.
    fn apply(&mut self, pc: u64, d: &Decoded, c: &ControlSignals) -> Result<u64, SimError> {
        let xlen = self.xlen;
        let rs1 = self.regs.read(d.rs1);
        let rs2 = self.regs.read(d.rs2);
        let imm = d.imm as u64;
        let fallthrough = xlen.mask(pc.wrapping_add(INSTRUCTION_SIZE));

        if let Some(op) = c.system {
            if op == SystemOp::Ecall {
                let mut ctx = EcallContext {
                    regs: &mut self.regs,
                    memory: &mut self.memory,
                    heap: &mut self.heap,
                    stats: &mut self.stats,
                };
                if let EcallOutcome::Exit(code) = ecall::dispatch(&mut ctx, pc)? {
                    self.halt(code);
                }
            }
            return Ok(fallthrough);
        }

        if let Some(kind) = c.jump {
            let target = match kind {
                JumpKind::Jal => xlen.mask(pc.wrapping_add(imm)),
                JumpKind::Jalr => xlen.mask(rs1.wrapping_add(imm)) & !1,
            };
            check_target(pc, target)?;
            self.regs.write(d.rd, fallthrough);
            return Ok(target);
        }

        if let Some(op) = c.branch {
            if branch::taken(op, rs1, rs2, xlen) {
                self.stats.branches_taken += 1;
                let target = xlen.mask(pc.wrapping_add(imm));
                check_target(pc, target)?;
                return Ok(target);
            }
            return Ok(fallthrough);
        }

        if c.mem_read || c.mem_write {
            let addr = xlen.mask(rs1.wrapping_add(imm));
            let size = c.width.bytes();
            if c.mem_write {
                self.memory.store(addr, size, rs2)?;
            } else {
                let raw = self.memory.load(addr, size)?;
                let val = if c.signed_load && size < 8 {
                    let shift = 64 - size * 8;
                    (((raw << shift) as i64) >> shift) as u64
                } else {
                    raw
                };
                self.regs.write(d.rd, val);
            }
            return Ok(fallthrough);
        }

        let a = match c.a_src {
            OpASrc::Reg1 => rs1,
            OpASrc::Pc => pc,
            OpASrc::Zero => 0,
        };
        let b = match c.b_src {
            OpBSrc::Imm => imm,
            OpBSrc::Reg2 => rs2,
        };
        let is32 = c.is_word_op || !xlen.is_rv64();
        self.regs.write(d.rd, Alu::execute(c.alu, a, b, is32));
        Ok(fallthrough)
    }

    fn halt(&mut self, code: i64) {
        self.state = RunState::Halted;
        self.exit_code = Some(code);
        debug!(code, cycles = self.cycles(), "halted");
    }

    /// Halts on a fatal error and hands it back.
    fn fail(&mut self, err: SimError) -> SimError {
        self.state = RunState::Halted;
        debug!(error = %err, pc = %format!("{:#x}", self.pc), "halted on error");
        err
    }

    fn in_text(&self, pc: u64) -> bool {
        pc >= self.text_start && pc < self.text_end
    }

    fn is_breakpoint(&self, pc: u64) -> bool {
        self.breakpoints.contains(&pc) || self.memory.load_word(pc).is_ok_and(|w| w == EBREAK)
    }

    /// Registers a breakpoint at `addr`. Returns `false` if one was already set.
    pub fn set_breakpoint(&mut self, addr: u64) -> bool {
        self.breakpoints.insert(self.xlen.mask(addr))
    }

    /// Removes the breakpoint at `addr`. Returns `false` if none was set.
    pub fn clear_breakpoint(&mut self, addr: u64) -> bool {
        self.breakpoints.remove(&self.xlen.mask(addr))
    }

    /// Registered breakpoint addresses in ascending order (not counting `EBREAK` words).
    pub fn breakpoints(&self) -> impl Iterator<Item = u64> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Current engine state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Whether the program has finished.
    pub fn is_halted(&self) -> bool {
        self.state == RunState::Halted
    }

    /// Exit code once the program has terminated normally (0 when it ran off the end of text).
    pub fn exit_code(&self) -> Option<i64> {
        self.exit_code
    }

    /// Instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.stats.cycles
    }

    /// Address of the next instruction.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Reads integer register `idx` (zero-extended to 64 bits).
    pub fn get_reg(&self, idx: usize) -> u64 {
        self.regs.read(idx)
    }

    /// Writes integer register `idx`; writes to `x0` are discarded.
    pub fn set_reg(&mut self, idx: usize, val: u64) {
        self.regs.write(idx, val);
    }

    /// The register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Simulated memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable access to simulated memory.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// The program's allocator.
    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// Mutable access to the allocator (for example to toggle `always_calloc`).
    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Reads a byte of simulated memory.
    pub fn load_byte(&self, addr: u64) -> u8 {
        self.memory.load_byte(addr)
    }

    /// Reads a half-word of simulated memory.
    pub fn load_half_word(&self, addr: u64) -> Result<u16, SimError> {
        Ok(self.memory.load_half_word(addr)?)
    }

    /// Reads a word of simulated memory.
    pub fn load_word(&self, addr: u64) -> Result<u32, SimError> {
        Ok(self.memory.load_word(addr)?)
    }

    /// Reads a doubleword of simulated memory.
    pub fn load_long(&self, addr: u64) -> Result<u64, SimError> {
        Ok(self.memory.load_long(addr)?)
    }

    /// Run statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The configuration this simulator was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The program being executed.
    pub fn program(&self) -> &'p Program {
        self.program
    }
}

/// Rejects an image segment that reaches into the heap window.
fn clear_of_heap(name: &str, start: u64, len: u64, m: &MemoryConfig) -> Result<(), ConfigError> {
    let end = start + len;
    if len > 0 && start < m.heap_limit && end > m.heap_base {
        return Err(ConfigError::Invalid(format!(
            "{name} segment [{start:#x}, {end:#x}) overlaps the heap window [{:#x}, {:#x})",
            m.heap_base, m.heap_limit
        )));
    }
    Ok(())
}

/// Rejects control transfers to addresses that are not instruction aligned.
fn check_target(pc: u64, target: u64) -> Result<(), SimError> {
    if target % INSTRUCTION_SIZE != 0 {
        return Err(SimError::InstructionAddressMisaligned { pc, target });
    }
    Ok(())
}
