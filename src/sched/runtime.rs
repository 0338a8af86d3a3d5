//! Kernel Runtime
//!
//! Spawns the four phase loops and the size poller as tokio tasks sharing one
//! world mutex. Each loop paces itself with a [`FixedStepClock`], so phases
//! tick independently and only serialize on the lock.
//!
//! ```text
//!   Kernel::start
//!     ├── startup factories (in order, once)
//!     ├── render loop  ──┐
//!     ├── logic loop   ──┤
//!     ├── slow loop    ──┼──> Arc<Mutex<World>>
//!     ├── basic loop   ──┤
//!     └── size poller  ──┘
//! ```

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use futures_util::future::join_all;
use thiserror::Error;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::config::KernelConfig;
use crate::sched::clock::{FixedStepClock, RateMeter};
use crate::sched::phase::{Phase, PhaseTiming};
use crate::sched::tick::{run_phase, NullSink, RenderSink, TickInfo};
use crate::world::size::{FixedSize, SizeProvider, WorldSize};
use crate::world::state::{SharedWorld, World};

/// Kernel errors.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Configuration cannot be run
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A phase or poller task panicked
    #[error("Kernel task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

/// One-time content setup, run before the loops start.
pub type Factory = Box<dyn FnOnce(&mut World) + Send>;

// =============================================================================
// STATS
// =============================================================================

/// Per-phase counters, readable while the kernel runs.
#[derive(Debug, Default)]
pub struct KernelStats {
    ticks: [AtomicU64; 4],
    fps: [AtomicU32; 4],
}

impl KernelStats {
    fn slot(phase: Phase) -> usize {
        match phase {
            Phase::Render => 0,
            Phase::Logic => 1,
            Phase::Slow => 2,
            Phase::Basic => 3,
        }
    }

    /// Ticks fired since start.
    pub fn ticks(&self, phase: Phase) -> u64 {
        self.ticks[Self::slot(phase)].load(Ordering::Relaxed)
    }

    /// Last sampled achieved rate (0 before the first full second).
    pub fn fps(&self, phase: Phase) -> u32 {
        self.fps[Self::slot(phase)].load(Ordering::Relaxed)
    }

    fn record_tick(&self, phase: Phase) {
        self.ticks[Self::slot(phase)].fetch_add(1, Ordering::Relaxed);
    }

    fn record_fps(&self, phase: Phase, fps: u32) {
        self.fps[Self::slot(phase)].store(fps, Ordering::Relaxed);
    }
}

// =============================================================================
// KERNEL
// =============================================================================

/// Kernel builder.
pub struct Kernel {
    config: KernelConfig,
    factories: Vec<Factory>,
    size_provider: Arc<dyn SizeProvider>,
    sink: Box<dyn RenderSink>,
}

impl Kernel {
    /// Headless kernel: fixed 720x480 display, nothing rendered.
    pub fn new(config: KernelConfig) -> Self {
        Self {
            config,
            factories: Vec::new(),
            size_provider: Arc::new(FixedSize { width: 720.0, height: 480.0 }),
            sink: Box::new(NullSink),
        }
    }

    /// Append a startup factory. Factories run in registration order.
    pub fn register(mut self, factory: impl FnOnce(&mut World) + Send + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Display size source polled every `size_poll_ms`.
    pub fn with_size_provider(mut self, provider: impl SizeProvider + 'static) -> Self {
        self.size_provider = Arc::new(provider);
        self
    }

    /// Rendering collaborator fed by the render phase.
    pub fn with_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Build the world, run the factories, and spawn every loop.
    pub async fn start(self) -> Result<KernelHandle, KernelError> {
        let Self { config, factories, size_provider, sink } = self;

        if config.max_fps == 0 {
            return Err(KernelError::InvalidConfig("max_fps must be positive".into()));
        }

        let (real_width, real_height) = size_provider.real_size();
        let size = WorldSize::checked_from_real(real_width, real_height).unwrap_or_else(|| {
            warn!("Unusable display size {}x{}, starting at the default", real_width, real_height);
            WorldSize::default()
        });
        let world = World::from_config(&config, size).into_shared();

        {
            let mut guard = world.lock().await;
            let count = factories.len();
            for factory in factories {
                factory(&mut guard);
            }
            info!("Ran {} startup factories, {} entities", count, guard.objects.len());
        }

        let (shutdown_tx, _) = broadcast::channel(1);
        let stats = Arc::new(KernelStats::default());
        let warmup = config.warmup();
        let mut tasks = Vec::with_capacity(Phase::ALL.len() + 1);
        let mut sink = Some(sink);

        for phase in Phase::ALL {
            let timing = phase.timing(config.max_fps);
            let phase_sink: Box<dyn RenderSink> = match phase {
                Phase::Render => sink.take().unwrap_or_else(|| Box::new(NullSink)),
                _ => Box::new(NullSink),
            };
            let task = PhaseTask {
                phase,
                timing,
                world: world.clone(),
                sink: phase_sink,
                stats: stats.clone(),
            };
            let shutdown = shutdown_tx.subscribe();
            tasks.push(tokio::spawn(task.run(warmup, shutdown)));
        }

        let poller_world = world.clone();
        let poll_every = config.size_poll_interval();
        let shutdown = shutdown_tx.subscribe();
        tasks.push(tokio::spawn(run_size_poller(poller_world, size_provider, poll_every, shutdown)));

        info!(
            "Kernel started: max_fps={}, seed={}, inconsistent_rand={}",
            config.max_fps,
            config.resolved_seed(),
            config.inconsistent_rand
        );

        Ok(KernelHandle {
            world,
            stats,
            shutdown_tx,
            tasks,
        })
    }
}

/// Running kernel.
pub struct KernelHandle {
    world: SharedWorld,
    stats: Arc<KernelStats>,
    shutdown_tx: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl KernelHandle {
    /// The shared world. Lock it to inspect or mutate between ticks.
    pub fn world(&self) -> SharedWorld {
        self.world.clone()
    }

    /// Per-phase counters.
    pub fn stats(&self) -> Arc<KernelStats> {
        self.stats.clone()
    }

    /// Stop every loop and wait for them to exit.
    pub async fn shutdown(self) -> Result<(), KernelError> {
        // No receivers left just means every task already exited
        let _ = self.shutdown_tx.send(());

        for result in join_all(self.tasks).await {
            result?;
        }

        info!("Kernel stopped");
        Ok(())
    }
}

// =============================================================================
// LOOPS
// =============================================================================

struct PhaseTask {
    phase: Phase,
    timing: PhaseTiming,
    world: SharedWorld,
    sink: Box<dyn RenderSink>,
    stats: Arc<KernelStats>,
}

impl PhaseTask {
    async fn run(mut self, warmup: Duration, mut shutdown: broadcast::Receiver<()>) {
        tokio::select! {
            _ = sleep(warmup) => {}
            _ = shutdown.recv() => return,
        }

        let phase = self.phase;
        info!(
            "{} phase: {} Hz (nominal {}), speed delta {}",
            phase, self.timing.effective_hz, self.timing.nominal_hz, self.timing.speed_delta
        );

        let start = Instant::now();
        let mut clock = FixedStepClock::new(self.timing.tick_period(), start);
        let mut meter = RateMeter::new(self.timing.effective_hz, start);

        loop {
            clock.advance(Instant::now());

            if clock.try_fire() {
                let tick = TickInfo {
                    phase,
                    fps: meter.fps(),
                    frame: meter.frame(),
                    speed_delta: self.timing.speed_delta,
                };

                let report = {
                    let mut world = self.world.lock().await;
                    run_phase(&mut world, &tick, self.sink.as_mut())
                };
                for handle in &report.removed {
                    debug!(kind = %handle.kind, id = %handle.id, phase = %phase, "entity left the world");
                }

                self.stats.record_tick(phase);
                if let Some(fps) = meter.record(Instant::now()) {
                    self.stats.record_fps(phase, fps);
                    trace!(phase = %phase, fps, "achieved rate");
                }

                match shutdown.try_recv() {
                    Err(TryRecvError::Empty) => continue,
                    _ => break,
                }
            }

            tokio::select! {
                _ = sleep(clock.until_next()) => {}
                _ = shutdown.recv() => break,
            }
        }

        debug!("{} phase stopped", phase);
    }
}

async fn run_size_poller(
    world: SharedWorld,
    provider: Arc<dyn SizeProvider>,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let (real_width, real_height) = provider.real_size();
                let mut world = world.lock().await;
                if world.resize(real_width, real_height) {
                    debug!(
                        "World resized to {}x{} (logical {:.2}x{:.2})",
                        real_width, real_height, world.size.width, world.size.height
                    );
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
