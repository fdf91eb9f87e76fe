//! Simulation statistics collection and reporting.
//!
//! This module tracks what a run did. It provides:
//! 1. **Cycles:** Total executed instructions (one cycle each).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, jump, system).
//! 3. **Heap activity:** Allocator calls by entry point, failed requests and the peak
//!    number of live blocks.
//!
//! Statistics serialize to JSON for tooling or print as a plain-text report.

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::signals::InstClass;

/// Counters collected while a simulator runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimStats {
    /// Instructions executed (the cycle counter).
    pub cycles: u64,

    /// Count of ALU instructions (register/immediate arithmetic, LUI, AUIPC).
    pub inst_alu: u64,
    /// Count of load instructions.
    pub inst_load: u64,
    /// Count of store instructions.
    pub inst_store: u64,
    /// Count of conditional branches.
    pub inst_branch: u64,
    /// Count of taken conditional branches.
    pub branches_taken: u64,
    /// Count of JAL/JALR.
    pub inst_jump: u64,
    /// Count of ECALL, EBREAK and fences.
    pub inst_system: u64,

    /// `malloc` requests.
    pub heap_malloc: u64,
    /// `calloc` requests.
    pub heap_calloc: u64,
    /// `realloc` requests.
    pub heap_realloc: u64,
    /// `free` requests.
    pub heap_free: u64,
    /// Requests that returned NULL for a non-zero size.
    pub heap_failed: u64,
    /// Highest number of simultaneously live blocks.
    pub heap_peak_active: u64,
}

impl SimStats {
    /// Counts one executed instruction of class `class`.
    pub fn record(&mut self, class: InstClass) {
        self.cycles += 1;
        let slot = match class {
            InstClass::Alu => &mut self.inst_alu,
            InstClass::Load => &mut self.inst_load,
            InstClass::Store => &mut self.inst_store,
            InstClass::Branch => &mut self.inst_branch,
            InstClass::Jump => &mut self.inst_jump,
            InstClass::System => &mut self.inst_system,
        };
        *slot += 1;
    }

    /// Updates the live-block high-water mark.
    pub fn observe_active(&mut self, active: u64) {
        self.heap_peak_active = self.heap_peak_active.max(active);
    }

    /// Serializes the counters as a JSON object.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the plain-text report printed by [`SimStats::print`].
    pub fn render(&self) -> String {
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64| (n as f64 / cyc) * 100.0;
        let mut out = String::new();
        let _ = writeln!(out, "==========================================================");
        let _ = writeln!(out, "RISC-V SIMULATION STATISTICS");
        let _ = writeln!(out, "==========================================================");
        let _ = writeln!(out, "sim_cycles               {}", self.cycles);
        let _ = writeln!(out, "----------------------------------------------------------");
        let _ = writeln!(out, "INSTRUCTION MIX");
        for (name, n) in [
            ("alu", self.inst_alu),
            ("load", self.inst_load),
            ("store", self.inst_store),
            ("branch", self.inst_branch),
            ("jump", self.inst_jump),
            ("system", self.inst_system),
        ] {
            let _ = writeln!(out, "  {name:<22} {n} ({:.2}%)", pct(n));
        }
        let _ = writeln!(out, "  branches.taken         {}", self.branches_taken);
        let _ = writeln!(out, "----------------------------------------------------------");
        let _ = writeln!(out, "HEAP");
        let _ = writeln!(out, "  malloc                 {}", self.heap_malloc);
        let _ = writeln!(out, "  calloc                 {}", self.heap_calloc);
        let _ = writeln!(out, "  realloc                {}", self.heap_realloc);
        let _ = writeln!(out, "  free                   {}", self.heap_free);
        let _ = writeln!(out, "  failed                 {}", self.heap_failed);
        let _ = writeln!(out, "  peak_active            {}", self.heap_peak_active);
        let _ = writeln!(out, "==========================================================");
        out
    }

    /// Prints the report to stdout.
    pub fn print(&self) {
        print!("{}", self.render());
    }
}
