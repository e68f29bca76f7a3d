/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Instant;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{InternalRaceError, QueueError, Request};

/**
 * Bounded FIFO of ride requests owned by a single elevator.
 *
 * Producers (the dispatcher) call `add`, which never blocks: a full or closed queue
 * hands the request straight back inside a `QueueError`. The owning worker calls
 * `take_next`, which blocks on the condition variable until a request arrives or
 * the queue is closed.
 *
 * Besides the queued requests the queue counts `outstanding` rides: accepted
 * requests that have not been dropped off yet. The worker reports a finished ride
 * through `complete`, or hands an unfinished one back through `release`. Both
 * counters live under the same lock, so "nothing queued and nothing in service" can
 * be observed atomically. `drained` is signalled whenever `outstanding` drops to 0.
 */
pub struct RequestQueue {
    inner: Mutex<QueueState>,
    available: Condvar,
    drained: Condvar,
    capacity: usize,
}

struct QueueState {
    queue: VecDeque<Request>,
    closed: bool,
    outstanding: usize,
}

impl RequestQueue {
    pub fn new(capacity: usize) -> RequestQueue {
        RequestQueue {
            inner: Mutex::new(QueueState {
                queue: VecDeque::with_capacity(capacity),
                closed: false,
                outstanding: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
            capacity,
        }
    }

    /// Append a request and wake one waiting consumer.
    pub fn add(&self, request: Request) -> Result<(), QueueError> {
        let mut guard = self.inner.lock().map_err(InternalRaceError::from)?;
        if guard.closed {
            return Err(QueueError::Closed(request));
        }
        if guard.queue.len() >= self.capacity {
            return Err(QueueError::CapacityExceeded {
                capacity: self.capacity,
                request,
            });
        }
        guard.queue.push_back(request);
        guard.outstanding += 1;
        self.available.notify_one();
        Ok(())
    }

    /// Block until a request is available. `None` once the queue has been closed.
    pub fn take_next(&self) -> Result<Option<Request>, InternalRaceError> {
        let mut guard = self.inner.lock()?;
        loop {
            if guard.closed {
                return Ok(None);
            }
            if let Some(request) = guard.queue.pop_front() {
                return Ok(Some(request));
            }
            guard = self.available.wait(guard)?;
        }
    }

    /// Mark one previously taken request as fully served.
    pub fn complete(&self) -> Result<(), InternalRaceError> {
        self.settle_one()
    }

    /// Stop counting a taken request that will not be served here.
    pub fn release(&self) -> Result<(), InternalRaceError> {
        self.settle_one()
    }

    fn settle_one(&self) -> Result<(), InternalRaceError> {
        let mut guard = self.inner.lock()?;
        guard.outstanding = guard.outstanding.saturating_sub(1);
        if guard.outstanding == 0 {
            self.drained.notify_all();
        }
        Ok(())
    }

    /**
     * Block until no request is outstanding. Returns `false` if `deadline` passes
     * first; `None` waits without limit.
     */
    pub fn wait_until_drained(&self, deadline: Option<Instant>) -> Result<bool, InternalRaceError> {
        let mut guard = self.inner.lock()?;
        while guard.outstanding > 0 {
            guard = match deadline {
                None => self.drained.wait(guard)?,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    self.drained.wait_timeout(guard, deadline - now)?.0
                }
            };
        }
        Ok(true)
    }

    /// Close the queue and wake all blocked consumers. Later `add`s are rejected.
    pub fn close(&self) -> Result<(), InternalRaceError> {
        let mut guard = self.inner.lock()?;
        guard.closed = true;
        self.available.notify_all();
        Ok(())
    }

    /// Remove every queued request, oldest first.
    pub fn drain(&self) -> Result<Vec<Request>, InternalRaceError> {
        let mut guard = self.inner.lock()?;
        let drained: Vec<Request> = guard.queue.drain(..).collect();
        guard.outstanding = guard.outstanding.saturating_sub(drained.len());
        if guard.outstanding == 0 {
            self.drained.notify_all();
        }
        Ok(drained)
    }

    pub fn len(&self) -> Result<usize, InternalRaceError> {
        Ok(self.inner.lock()?.queue.len())
    }

    pub fn is_empty(&self) -> Result<bool, InternalRaceError> {
        Ok(self.inner.lock()?.queue.is_empty())
    }

    pub fn outstanding(&self) -> Result<usize, InternalRaceError> {
        Ok(self.inner.lock()?.outstanding)
    }

    pub fn is_closed(&self) -> Result<bool, InternalRaceError> {
        Ok(self.inner.lock()?.closed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
