use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Why a [`OneShotReceiver`] returned without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// The wait elapsed before a value arrived.
    Timeout,
    /// The sender was dropped without sending.
    Disconnected,
}

enum Slot<T> {
    Pending,
    Ready(T),
    Taken,
    Abandoned,
}

struct Cell<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Write side of a single-assignment cell.
pub struct OneShotSender<T> {
    cell: Arc<Cell<T>>,
}

/// Read side of a single-assignment cell.
pub struct OneShotReceiver<T> {
    cell: Arc<Cell<T>>,
}

/// Create a cell that carries exactly one value from one thread to another.
pub fn one_shot<T>() -> (OneShotSender<T>, OneShotReceiver<T>) {
    let cell = Arc::new(Cell {
        slot: Mutex::new(Slot::Pending),
        ready: Condvar::new(),
    });
    (
        OneShotSender {
            cell: Arc::clone(&cell),
        },
        OneShotReceiver { cell },
    )
}

impl<T> OneShotSender<T> {
    /// Store the value and wake the receiver. Consumes the sender.
    pub fn send(self, value: T) {
        *self.cell.slot.lock() = Slot::Ready(value);
        self.cell.ready.notify_one();
    }
}

impl<T> Drop for OneShotSender<T> {
    fn drop(&mut self) {
        let mut slot = self.cell.slot.lock();
        if matches!(*slot, Slot::Pending) {
            *slot = Slot::Abandoned;
            drop(slot);
            self.cell.ready.notify_one();
        }
    }
}

impl<T> OneShotReceiver<T> {
    /// Block until the value arrives. No timeout.
    pub fn recv(self) -> Result<T, RecvError> {
        let mut slot = self.cell.slot.lock();
        while matches!(*slot, Slot::Pending) {
            self.cell.ready.wait(&mut slot);
        }
        Self::take(&mut slot)
    }

    /// Block until the value arrives or `timeout` elapses.
    pub fn recv_timeout(self, timeout: Duration) -> Result<T, RecvError> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.cell.slot.lock();
        while matches!(*slot, Slot::Pending) {
            if self.cell.ready.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        Self::take(&mut slot)
    }

    fn take(slot: &mut Slot<T>) -> Result<T, RecvError> {
        match std::mem::replace(slot, Slot::Taken) {
            Slot::Ready(value) => Ok(value),
            Slot::Pending => {
                *slot = Slot::Pending;
                Err(RecvError::Timeout)
            }
            Slot::Abandoned | Slot::Taken => Err(RecvError::Disconnected),
        }
    }
}
