//! # Fuente de estadísticas por proceso
//! src/exec/stats.rs
//!
//! El sampler no lee `/proc` directamente: habla con un [`ProcessStats`].
//! En Linux la implementación real es [`ProcfsStats`]; los tests usan fakes.

use std::sync::Arc;

/// Una lectura cruda del registro de contabilidad del proceso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessUsage {
    /// Tiempo en modo usuario, en ticks de reloj
    pub user_ticks: u64,
    /// Tiempo en modo kernel, en ticks de reloj
    pub system_ticks: u64,
    /// Memoria virtual en bytes
    pub vsize_bytes: u64,
}

pub trait ProcessStats: Send + Sync {
    /// Comprobación no bloqueante. No debe cosechar (reap) al proceso:
    /// el `wait()` del dueño tiene que seguir viendo el código de salida.
    fn has_exited(&self, pid: u32) -> bool;

    /// `None` si el registro no se pudo leer o el proceso ya terminó
    fn read_usage(&self, pid: u32) -> Option<ProcessUsage>;

    /// Frecuencia del reloj de ticks (`_SC_CLK_TCK`)
    fn ticks_per_second(&self) -> u64;
}

/// Fuente por defecto de la plataforma
pub fn default_stats() -> Arc<dyn ProcessStats> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(ProcfsStats::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(UnsupportedStats)
    }
}

#[cfg(target_os = "linux")]
pub use self::procfs_stats::ProcfsStats;

#[cfg(target_os = "linux")]
mod procfs_stats {
    use super::{ProcessStats, ProcessUsage};
    use procfs::process::{Process, Stat};
    use tracing::trace;

    /// Lee `/proc/<pid>/stat` con el crate `procfs`
    pub struct ProcfsStats {
        ticks_per_second: u64,
    }

    impl ProcfsStats {
        pub fn new() -> Self {
            // SAFETY: sysconf no tiene precondiciones
            let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
            Self {
                ticks_per_second: if ticks > 0 { ticks as u64 } else { 100 },
            }
        }

        fn stat(pid: u32) -> Option<Stat> {
            let pid = i32::try_from(pid).ok()?;
            let process = Process::new(pid).ok()?;
            match process.stat() {
                Ok(stat) => Some(stat),
                Err(e) => {
                    trace!(pid, error = %e, "process record unreadable");
                    None
                }
            }
        }
    }

    impl Default for ProcfsStats {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Zombie (`Z`) o muerto (`X`/`x`): ya terminó, aunque nadie hizo wait todavía
    fn is_terminated(state: char) -> bool {
        matches!(state, 'Z' | 'X' | 'x')
    }

    impl ProcessStats for ProcfsStats {
        fn has_exited(&self, pid: u32) -> bool {
            match Self::stat(pid) {
                Some(stat) => is_terminated(stat.state),
                None => true,
            }
        }

        fn read_usage(&self, pid: u32) -> Option<ProcessUsage> {
            let stat = Self::stat(pid)?;
            if is_terminated(stat.state) {
                return None;
            }

            Some(ProcessUsage {
                user_ticks: stat.utime,
                system_ticks: stat.stime,
                vsize_bytes: stat.vsize,
            })
        }

        fn ticks_per_second(&self) -> u64 {
            self.ticks_per_second
        }
    }

}

/// Plataformas sin `/proc`: todo proceso cuenta como terminado, no hay muestras
#[cfg(not(target_os = "linux"))]
pub struct UnsupportedStats;

#[cfg(not(target_os = "linux"))]
impl ProcessStats for UnsupportedStats {
    fn has_exited(&self, _pid: u32) -> bool {
        true
    }

    fn read_usage(&self, _pid: u32) -> Option<ProcessUsage> {
        None
    }

    fn ticks_per_second(&self) -> u64 {
        100
    }
}
