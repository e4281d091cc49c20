//! # Muestreo de recursos
//! src/exec/sampler.rs
//!
//! Mientras el proceso hijo vive, toma una muestra de CPU y memoria por
//! intervalo (un segundo por defecto):
//!
//! ```text
//! ¿terminó? -> no -> dormir -> leer /proc/<pid>/stat -> muestra N
//!     |
//!     sí -> fin (no hay muestra "final" en el instante de salida)
//! ```
//!
//! Si una lectura falla (el proceso salió entre la comprobación y la
//! lectura) ese tick no produce muestra y el ciclo sigue hasta que la
//! comprobación vea la salida. Los índices siguen siendo contiguos.

use super::stats::{ProcessStats, ProcessUsage};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Una medición de CPU y memoria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSample {
    /// Empieza en 1
    pub index: u32,
    pub user_secs: u64,
    pub system_secs: u64,
    pub memory_mb: u64,
}

impl ResourceSample {
    /// Convierte ticks a segundos (redondeando) y bytes a MB (división entera por 10^6)
    pub fn from_usage(index: u32, usage: ProcessUsage, ticks_per_second: u64) -> Self {
        let hz = ticks_per_second.max(1) as f64;
        Self {
            index,
            user_secs: (usage.user_ticks as f64 / hz).round() as u64,
            system_secs: (usage.system_ticks as f64 / hz).round() as u64,
            memory_mb: usage.vsize_bytes / 1_000_000,
        }
    }

    pub fn cpu_secs(&self) -> u64 {
        self.user_secs + self.system_secs
    }
}

#[derive(Clone)]
pub struct ResourceSampler {
    stats: Arc<dyn ProcessStats>,
    interval: Duration,
}

impl ResourceSampler {
    pub fn new(stats: Arc<dyn ProcessStats>, interval: Duration) -> Self {
        Self { stats, interval }
    }

    /// Secuencia perezosa de muestras de `pid`; bloquea en cada `next()`
    pub fn samples(&self, pid: u32) -> Samples<'_> {
        Samples {
            sampler: self,
            pid,
            next_index: 1,
            done: false,
        }
    }

    /// Corre el muestreo en su propio thread. Sin pid (el comando no se pudo
    /// lanzar) no hay nada que muestrear.
    pub fn spawn(&self, pid: Option<u32>) -> SamplerHandle {
        let Some(pid) = pid else {
            return SamplerHandle { handle: None };
        };

        let sampler = self.clone();
        let spawned = thread::Builder::new()
            .name(format!("sampler-{}", pid))
            .spawn(move || {
                let samples: Vec<ResourceSample> = sampler.samples(pid).collect();
                debug!(pid, samples = samples.len(), "sampling finished");
                samples
            });

        match spawned {
            Ok(handle) => SamplerHandle { handle: Some(handle) },
            Err(e) => {
                warn!(pid, error = %e, "could not start sampler thread, report will be empty");
                SamplerHandle { handle: None }
            }
        }
    }
}

pub struct Samples<'a> {
    sampler: &'a ResourceSampler,
    pid: u32,
    next_index: u32,
    done: bool,
}

impl Iterator for Samples<'_> {
    type Item = ResourceSample;

    fn next(&mut self) -> Option<ResourceSample> {
        let stats = &self.sampler.stats;

        while !self.done {
            if stats.has_exited(self.pid) {
                self.done = true;
                break;
            }

            thread::sleep(self.sampler.interval);

            match stats.read_usage(self.pid) {
                Some(usage) => {
                    let sample =
                        ResourceSample::from_usage(self.next_index, usage, stats.ticks_per_second());
                    self.next_index += 1;
                    return Some(sample);
                }
                None => trace!(pid = self.pid, "process record unavailable, tick skipped"),
            }
        }

        None
    }
}

impl std::iter::FusedIterator for Samples<'_> {}

/// Thread de muestreo en curso. `join` devuelve la secuencia completa.
pub struct SamplerHandle {
    handle: Option<JoinHandle<Vec<ResourceSample>>>,
}

impl SamplerHandle {
    pub fn join(self) -> Vec<ResourceSample> {
        match self.handle {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                warn!("sampler thread panicked, report will be empty");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Proceso falso: sigue vivo durante `alive_checks` comprobaciones y
    /// devuelve las lecturas programadas en orden (`None` = lectura fallida).
    struct FakeStats {
        alive_checks: usize,
        checks: AtomicUsize,
        reads: Mutex<VecDeque<Option<ProcessUsage>>>,
    }

    impl FakeStats {
        fn new(alive_checks: usize, reads: Vec<Option<ProcessUsage>>) -> Arc<Self> {
            Arc::new(Self {
                alive_checks,
                checks: AtomicUsize::new(0),
                reads: Mutex::new(reads.into()),
            })
        }
    }

    impl ProcessStats for FakeStats {
        fn has_exited(&self, _pid: u32) -> bool {
            self.checks.fetch_add(1, Ordering::SeqCst) >= self.alive_checks
        }

        fn read_usage(&self, _pid: u32) -> Option<ProcessUsage> {
            self.reads.lock().unwrap().pop_front().flatten()
        }

        fn ticks_per_second(&self) -> u64 {
            100
        }
    }

    fn usage(user_ticks: u64, system_ticks: u64, vsize_bytes: u64) -> Option<ProcessUsage> {
        Some(ProcessUsage { user_ticks, system_ticks, vsize_bytes })
    }

    fn sampler(stats: Arc<FakeStats>) -> ResourceSampler {
        ResourceSampler::new(stats, Duration::from_millis(1))
    }

    #[test]
    fn test_conversion_rounds_ticks_and_truncates_memory() {
        let raw = ProcessUsage { user_ticks: 149, system_ticks: 150, vsize_bytes: 12_999_999 };
        let sample = ResourceSample::from_usage(1, raw, 100);

        assert_eq!(sample.user_secs, 1);
        assert_eq!(sample.system_secs, 2);
        assert_eq!(sample.memory_mb, 12);
        assert_eq!(sample.cpu_secs(), 3);
    }

    #[test]
    fn test_exited_before_first_check_yields_nothing() {
        let stats = FakeStats::new(0, vec![usage(1, 1, 1)]);
        let samples: Vec<_> = sampler(stats.clone()).samples(42).collect();

        assert!(samples.is_empty());
        // Nunca se llegó a leer
        assert_eq!(stats.reads.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_one_sample_per_live_check() {
        let stats = FakeStats::new(
            3,
            vec![usage(100, 0, 5_000_000), usage(200, 100, 6_000_000), usage(300, 100, 7_000_000)],
        );
        let samples: Vec<_> = sampler(stats).samples(42).collect();

        let indices: Vec<u32> = samples.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(samples[1].user_secs, 2);
        assert_eq!(samples[1].system_secs, 1);
        assert_eq!(samples[2].memory_mb, 7);
    }

    #[test]
    fn test_failed_read_skips_tick_and_keeps_indices_contiguous() {
        let stats = FakeStats::new(4, vec![usage(1, 1, 1), None, usage(2, 2, 2), None]);
        let samples: Vec<_> = sampler(stats).samples(42).collect();

        let indices: Vec<u32> = samples.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_iterator_is_fused() {
        let stats = FakeStats::new(1, vec![usage(1, 1, 1)]);
        let sampler = sampler(stats);
        let mut samples = sampler.samples(42);

        assert!(samples.next().is_some());
        assert!(samples.next().is_none());
        assert!(samples.next().is_none());
    }

    #[test]
    fn test_spawned_sampler_joins_full_sequence() {
        let stats = FakeStats::new(2, vec![usage(1, 1, 1), usage(2, 2, 2)]);
        let samples = sampler(stats).spawn(Some(42)).join();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].index, 2);
    }

    #[test]
    fn test_spawn_without_pid_is_empty() {
        let stats = FakeStats::new(10, vec![usage(1, 1, 1)]);
        assert!(sampler(stats).spawn(None).join().is_empty());
    }
}
