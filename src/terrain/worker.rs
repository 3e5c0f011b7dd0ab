//! Background terrain generation thread
//!
//! Polls the recyclable pool without blocking, fills whatever it gets and
//! hands it back through the ready pool. Stopping is cooperative: the stop
//! flag is checked once per loop iteration, so the thread exits after at
//! most one more tile.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use super::TerrainError;
use super::generator::TerrainGenerator;
use super::manager::TileExchange;

/// Pause between loop iterations so an idle worker doesn't peg a core
pub const IDLE_SLEEP: Duration = Duration::from_millis(1);

pub struct GeneratorWorker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<TerrainGenerator>>,
}

impl GeneratorWorker {
    /// Move `generator` onto a new thread feeding `exchange`
    pub fn spawn(generator: TerrainGenerator, exchange: TileExchange) -> Result<Self, TerrainError> {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("terrain-generator".into())
            .spawn(move || run(generator, exchange, thread_stop))
            .map_err(TerrainError::WorkerSpawn)?;
        info!("Terrain generator thread started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Raise the stop flag without waiting for the thread
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Stop the thread and wait for it, returning the generator state.
    ///
    /// Returns `None` if already stopped or if the thread panicked.
    pub fn stop(&mut self) -> Option<TerrainGenerator> {
        self.request_stop();
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(generator) => {
                info!(
                    "Terrain generator thread stopped after {} tiles",
                    generator.tiles_generated()
                );
                Some(generator)
            }
            Err(_) => {
                warn!("Terrain generator thread panicked");
                None
            }
        }
    }
}

impl Drop for GeneratorWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(mut generator: TerrainGenerator, exchange: TileExchange, stop: Arc<AtomicBool>) -> TerrainGenerator {
    while !stop.load(Ordering::Acquire) {
        match exchange.try_take_recyclable() {
            Some(mut tile) => {
                generator.generate(&mut tile);
                debug!("Deposited tile {:?}", tile.id());
                exchange.deposit_ready(tile);
            }
            None => thread::yield_now(),
        }
        thread::sleep(IDLE_SLEEP);
    }
    generator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::WindowManager;
    use std::time::Instant;

    fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn test_worker_fills_recyclable_tiles() {
        let mut manager = WindowManager::new();
        manager.launch(|_| {}).unwrap();
        let mut worker = GeneratorWorker::spawn(TerrainGenerator::new(1), manager.exchange()).unwrap();
        assert!(worker.is_running());

        assert!(wait_for(|| manager.ready_len() == 3));
        assert_eq!(manager.recyclable_len(), 0);

        let generator = worker.stop().unwrap();
        assert_eq!(generator.tiles_generated(), 3);
        assert!(!worker.is_running());
        assert!(worker.stop().is_none());
    }

    #[test]
    fn test_drop_stops_idle_worker() {
        let manager = WindowManager::new();
        let worker = GeneratorWorker::spawn(TerrainGenerator::new(2), manager.exchange()).unwrap();
        let start = Instant::now();
        drop(worker);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
