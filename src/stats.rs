//! Runtime statistics collaborators
//!
//! The allocator never reads the system itself; a stat source hands it
//! normalized [`RuntimeStats`] samples. `SysinfoStatSource` is the live
//! implementation used by the CLI; hosts embedding the library supply
//! their own.

use sysinfo::{ProcessesToUpdate, System};

use crate::core::features::RuntimeStats;

/// Default traditional-priority level reported for live processes;
/// sysinfo exposes no scheduling priority, so every sampled process
/// sits mid-range until the host supplies real levels.
const DEFAULT_PRIORITY: u32 = 10;
const PRIORITY_LEVELS: u32 = 20;

/// Supplier of normalized runtime signals for one process.
pub trait StatSource {
    /// Re-read the underlying counters.
    fn refresh(&mut self);

    /// Sample one process, `None` if it is gone.
    fn sample(&self, pid: u32) -> Option<RuntimeStats>;
}

/// Live process sampler backed by sysinfo.
pub struct SysinfoStatSource {
    system: System,
}

impl SysinfoStatSource {
    pub fn new() -> Self {
        Self {
            system: System::new_all(),
        }
    }

    /// Enumerate live processes as (pid, name, stats), heaviest CPU
    /// consumers first.
    pub fn top_by_cpu(&self, limit: usize) -> Vec<(u32, String, RuntimeStats)> {
        let mut procs: Vec<(u32, String, RuntimeStats)> = self
            .system
            .processes()
            .iter()
            .filter_map(|(pid, proc)| {
                let stats = self.build_stats(proc)?;
                let name = proc.name().to_string_lossy().to_string();
                Some((pid.as_u32(), name, stats))
            })
            .collect();
        procs.sort_by(|a, b| {
            b.2.cpu
                .partial_cmp(&a.2.cpu)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        procs.truncate(limit);
        procs
    }

    fn build_stats(&self, proc: &sysinfo::Process) -> Option<RuntimeStats> {
        let total_memory = self.system.total_memory();
        let memory = if total_memory > 0 {
            Some((proc.memory() as f32 / total_memory as f32).clamp(0.0, 1.0))
        } else {
            None
        };
        Some(RuntimeStats {
            // Fraction of one core
            cpu: (proc.cpu_usage() / 100.0).clamp(0.0, 1.0),
            priority: DEFAULT_PRIORITY,
            max_priority: PRIORITY_LEVELS,
            memory,
            io: None,
            network: None,
            realtime: None,
        })
    }
}

impl StatSource for SysinfoStatSource {
    fn refresh(&mut self) {
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        self.system.refresh_memory();
    }

    fn sample(&self, pid: u32) -> Option<RuntimeStats> {
        let proc = self.system.process(sysinfo::Pid::from_u32(pid))?;
        self.build_stats(proc)
    }
}

impl Default for SysinfoStatSource {
    fn default() -> Self {
        Self::new()
    }
}
