//! FIFO of tiles shared between the foreground and the generator thread
//!
//! Ownership moves through the queue: `put` gives a tile away, every `get`
//! variant takes one out. Nothing else can reach a queued tile.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::tile::{Tile, TileId};

#[derive(Debug, Default)]
pub struct TileQueue {
    tiles: Mutex<VecDeque<Box<Tile>>>,
    available: Condvar,
}

impl TileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Box<Tile>>> {
        // A panic while holding the lock cannot leave the deque half-updated
        self.tiles.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a tile and wake one waiting consumer
    pub fn put(&self, tile: Box<Tile>) {
        self.lock().push_back(tile);
        self.available.notify_one();
    }

    /// Return a tile to the head of the queue, ahead of everything queued
    pub fn put_front(&self, tile: Box<Tile>) {
        self.lock().push_front(tile);
        self.available.notify_one();
    }

    /// Pop the oldest tile without waiting
    pub fn try_get(&self) -> Option<Box<Tile>> {
        self.lock().pop_front()
    }

    /// Pop the oldest tile, waiting until one is available
    pub fn get(&self) -> Box<Tile> {
        let mut tiles = self.lock();
        loop {
            if let Some(tile) = tiles.pop_front() {
                return tile;
            }
            tiles = self
                .available
                .wait(tiles)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Pop the oldest tile, waiting at most `timeout`
    pub fn get_timeout(&self, timeout: Duration) -> Option<Box<Tile>> {
        let deadline = Instant::now() + timeout;
        let mut tiles = self.lock();
        loop {
            if let Some(tile) = tiles.pop_front() {
                return Some(tile);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            tiles = self
                .available
                .wait_timeout(tiles, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the queued tile ids, oldest first
    pub fn ids(&self) -> Vec<TileId> {
        self.lock().iter().map(|t| t.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = TileQueue::new();
        assert!(queue.try_get().is_none());
        queue.put(Box::new(Tile::new(TileId(1))));
        queue.put(Box::new(Tile::new(TileId(2))));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.ids(), vec![TileId(1), TileId(2)]);
        assert_eq!(queue.try_get().map(|t| t.id()), Some(TileId(1)));
        queue.put_front(Box::new(Tile::new(TileId(0))));
        assert_eq!(queue.get().id(), TileId(0));
        assert_eq!(queue.get().id(), TileId(2));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_get_timeout_expires_when_empty() {
        let queue = TileQueue::new();
        let start = Instant::now();
        assert!(queue.get_timeout(Duration::from_millis(20)).is_none());
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert!(queue.get_timeout(Duration::ZERO).is_none());
    }

    #[test]
    fn test_blocking_get_wakes_on_put() {
        let queue = Arc::new(TileQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                queue.put(Box::new(Tile::new(TileId(9))));
            })
        };
        assert_eq!(queue.get().id(), TileId(9));
        producer.join().unwrap();
    }
}
