//! # Cola de conexiones
//! src/server/pool.rs
//!
//! Cola FIFO acotada entre el thread que acepta y los workers.
//! Cuando está llena, `try_push` devuelve la conexión para que el
//! llamador la rechace.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

pub struct ConnectionQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
    capacity: usize,
}

impl<T> ConnectionQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            available: Condvar::new(),
            capacity,
        }
    }

    /// Encola sin bloquear. `Err(item)` si la cola está llena.
    pub fn try_push(&self, item: T) -> Result<(), T> {
        let mut items = self.lock();
        if items.len() >= self.capacity {
            return Err(item);
        }

        items.push_back(item);
        self.available.notify_one();
        Ok(())
    }

    /// Bloquea hasta que haya una conexión
    pub fn pop(&self) -> T {
        let mut items = self.lock();
        loop {
            if let Some(item) = items.pop_front() {
                return item;
            }
            items = self.available.wait(items).unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Un worker que entró en pánico no invalida la cola
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = ConnectionQueue::new(3);
        queue.try_push(1).unwrap();
        queue.try_push(2).unwrap();
        queue.try_push(3).unwrap();

        assert_eq!(queue.pop(), 1);
        assert_eq!(queue.pop(), 2);
        assert_eq!(queue.pop(), 3);

        // Vacía: acepta de nuevo hasta la capacidad
        for i in 4..7 {
            queue.try_push(i).unwrap();
        }
        assert_eq!(queue.try_push(7), Err(7));
    }

    #[test]
    fn test_full_queue_returns_item() {
        let queue = ConnectionQueue::new(1);
        queue.try_push("a").unwrap();

        assert_eq!(queue.try_push("b"), Err("b"));
        assert_eq!(queue.capacity(), 1);

        assert_eq!(queue.pop(), "a");
        assert_eq!(queue.try_push("c"), Ok(()));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let queue = Arc::new(ConnectionQueue::new(4));

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(50));
        queue.try_push(42).unwrap();

        assert_eq!(consumer.join().unwrap(), 42);
    }
}
