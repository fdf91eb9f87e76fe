//! Environment Calls.
//!
//! `ECALL` services selected by the id in `a0`:
//!
//! | a0      | service                                      |
//! |---------|----------------------------------------------|
//! | 9       | sbrk: `a0 = old high-water mark` (grow by `a1`) |
//! | 10      | exit with code 0                             |
//! | 17      | exit with the code in `a1`                   |
//! | `0x3CC` | allocator request, operation selected by `a6` |
//!
//! Allocator operations (`a6`): 1 `malloc(a1)`, 2 `calloc(a1)`, 3 `realloc(a1, a2)`,
//! 4 `free(a1)`, 5 live block count. Results are returned in `a0`; `free` leaves `a0`
//! untouched. Any other id is an [`UnknownEnvironmentCall`](SimError::UnknownEnvironmentCall).

use tracing::{debug, warn};

use crate::common::constants::{
    ALLOC_ACTIVE_COUNT, ALLOC_CALLOC, ALLOC_FREE, ALLOC_MALLOC, ALLOC_REALLOC, ECALL_ALLOC,
    ECALL_EXIT, ECALL_EXIT2, ECALL_SBRK, NULL,
};
use crate::common::{RegisterFile, SimError};
use crate::heap::Heap;
use crate::isa::abi;
use crate::memory::Memory;
use crate::stats::SimStats;

/// What the engine does after a serviced call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EcallOutcome {
    /// Continue with the next instruction.
    Continue,
    /// Terminate with the given exit code.
    Exit(i64),
}

/// The machine state a service may touch.
#[derive(Debug)]
pub struct EcallContext<'a> {
    /// Integer registers (arguments in, results out).
    pub regs: &'a mut RegisterFile,
    /// Simulated memory.
    pub memory: &'a mut Memory,
    /// The program's allocator.
    pub heap: &'a mut Heap,
    /// Run statistics.
    pub stats: &'a mut SimStats,
}

/// Services the `ECALL` at `pc`.
///
/// # Arguments
///
/// * `ctx` - Registers, memory, heap and statistics of the running program.
/// * `pc` - Address of the `ECALL`, used in errors.
///
/// # Returns
///
/// Whether execution continues, or the error that ends the run.
pub fn dispatch(ctx: &mut EcallContext<'_>, pc: u64) -> Result<EcallOutcome, SimError> {
    let id = ctx.regs.read(abi::REG_A0);
    match id {
        ECALL_EXIT => Ok(EcallOutcome::Exit(0)),
        ECALL_EXIT2 => Ok(EcallOutcome::Exit(ctx.regs.read_signed(abi::REG_A1))),
        ECALL_SBRK => {
            let incr = ctx.regs.read_signed(abi::REG_A1);
            let old = ctx.heap.sbrk(incr);
            debug!(incr, result = %format!("{old:#x}"), "sbrk");
            ctx.regs.write(abi::REG_A0, old);
            Ok(EcallOutcome::Continue)
        }
        ECALL_ALLOC => allocator(ctx, pc),
        _ => {
            warn!(id, pc = %format!("{pc:#x}"), "unknown environment call");
            Err(SimError::UnknownEnvironmentCall { pc, id })
        }
    }
}

fn allocator(ctx: &mut EcallContext<'_>, pc: u64) -> Result<EcallOutcome, SimError> {
    let op = ctx.regs.read(abi::REG_A6);
    let a1 = ctx.regs.read(abi::REG_A1);
    let a2 = ctx.regs.read(abi::REG_A2);

    let (result, requested) = match op {
        ALLOC_MALLOC => {
            ctx.stats.heap_malloc += 1;
            (ctx.heap.malloc(ctx.memory, a1)?, a1)
        }
        ALLOC_CALLOC => {
            ctx.stats.heap_calloc += 1;
            (ctx.heap.calloc(ctx.memory, a1)?, a1)
        }
        ALLOC_REALLOC => {
            ctx.stats.heap_realloc += 1;
            (ctx.heap.realloc(ctx.memory, a1, a2)?, a2)
        }
        ALLOC_FREE => {
            ctx.stats.heap_free += 1;
            ctx.heap.free(ctx.memory, a1)?;
            return Ok(EcallOutcome::Continue);
        }
        ALLOC_ACTIVE_COUNT => {
            ctx.regs.write(abi::REG_A0, ctx.heap.num_active_blocks());
            return Ok(EcallOutcome::Continue);
        }
        _ => {
            warn!(op, pc = %format!("{pc:#x}"), "unknown allocator operation");
            return Err(SimError::UnknownEnvironmentCall { pc, id: op });
        }
    };

    if result == NULL && requested != 0 {
        ctx.stats.heap_failed += 1;
    }
    ctx.stats.observe_active(ctx.heap.num_active_blocks());
    ctx.regs.write(abi::REG_A0, result);
    Ok(EcallOutcome::Continue)
}
