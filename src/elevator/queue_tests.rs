/*
 * Unit tests for the request queue
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 *  - test_queue_is_fifo
 *  - test_queue_rejects_when_full
 *  - test_queue_concurrent_adds
 *  - test_take_next_wakes_on_add
 *  - test_take_next_unblocks_on_close
 *  - test_add_after_close_rejected
 *  - test_outstanding_tracks_service
 *  - test_wait_until_drained_wakes_on_complete
 *  - test_wait_until_drained_times_out
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod queue_tests {
    use crate::elevator::RequestQueue;
    use crate::shared::{QueueError, Request};
    use crossbeam_channel::unbounded;
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread::spawn;
    use std::time::{Duration, Instant};

    fn request(id: u64) -> Request {
        Request::new(id, 0, 1)
    }

    #[test]
    fn test_queue_is_fifo() {
        // Arrange
        let queue = RequestQueue::new(5);

        // Act
        for id in 0..5 {
            queue.add(request(id)).unwrap();
        }

        // Assert
        for id in 0..5 {
            assert_eq!(queue.take_next().unwrap().unwrap().id, id);
        }
        assert_eq!(queue.len().unwrap(), 0);
    }

    #[test]
    fn test_queue_rejects_when_full() {
        // Arrange
        let queue = RequestQueue::new(5);
        for id in 0..5 {
            queue.add(request(id)).unwrap();
        }

        // Act
        let result = queue.add(request(5));

        // Assert
        assert_eq!(
            result,
            Err(QueueError::CapacityExceeded {
                capacity: 5,
                request: request(5)
            })
        );
        assert_eq!(queue.len().unwrap(), 5);
        let order: Vec<u64> = queue.drain().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_queue_concurrent_adds() {
        // Purpose: N racing producers against one bounded queue lose or duplicate nothing

        // Arrange
        let producers = 16;
        let queue = Arc::new(RequestQueue::new(8));
        let barrier = Arc::new(Barrier::new(producers));

        // Act
        let handles: Vec<_> = (0..producers as u64)
            .map(|id| {
                let queue = Arc::clone(&queue);
                let barrier = Arc::clone(&barrier);
                spawn(move || {
                    barrier.wait();
                    queue.add(request(id)).is_ok()
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // Assert
        assert_eq!(accepted, 8);
        assert_eq!(queue.len().unwrap(), accepted);
        let ids: HashSet<u64> = queue.drain().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), accepted);
    }

    #[test]
    fn test_take_next_wakes_on_add() {
        // Arrange
        let queue = Arc::new(RequestQueue::new(5));
        let (ready_tx, ready_rx) = unbounded::<()>();
        let (done_tx, done_rx) = unbounded::<u64>();

        let consumer_queue = Arc::clone(&queue);
        let consumer = spawn(move || {
            ready_tx.send(()).unwrap();
            let taken = consumer_queue.take_next().unwrap().unwrap();
            done_tx.send(taken.id).unwrap();
        });
        ready_rx.recv_timeout(Duration::from_secs(1)).unwrap();

        // Act
        queue.add(request(42)).unwrap();

        // Assert
        assert_eq!(done_rx.recv_timeout(Duration::from_secs(1)).unwrap(), 42);
        consumer.join().unwrap();
    }

    #[test]
    fn test_take_next_unblocks_on_close() {
        // Arrange
        let queue = Arc::new(RequestQueue::new(5));
        let (done_tx, done_rx) = unbounded::<bool>();

        let consumer_queue = Arc::clone(&queue);
        let consumer = spawn(move || {
            let taken = consumer_queue.take_next().unwrap();
            done_tx.send(taken.is_none()).unwrap();
        });

        // Act
        std::thread::sleep(Duration::from_millis(20));
        queue.close().unwrap();

        // Assert
        assert!(done_rx.recv_timeout(Duration::from_secs(1)).unwrap());
        consumer.join().unwrap();
    }

    #[test]
    fn test_add_after_close_rejected() {
        let queue = RequestQueue::new(5);
        queue.close().unwrap();

        assert_eq!(queue.add(request(1)), Err(QueueError::Closed(request(1))));
        assert!(queue.is_closed().unwrap());
        assert_eq!(queue.take_next().unwrap(), None);
    }

    #[test]
    fn test_outstanding_tracks_service() {
        // Arrange
        let queue = RequestQueue::new(5);
        queue.add(request(1)).unwrap();
        queue.add(request(2)).unwrap();

        // Act
        let first = queue.take_next().unwrap();

        // Assert
        assert_eq!(first, Some(request(1)));
        assert_eq!(queue.len().unwrap(), 1);
        assert_eq!(queue.outstanding().unwrap(), 2);

        queue.complete().unwrap();
        assert_eq!(queue.outstanding().unwrap(), 1);

        queue.drain().unwrap();
        assert_eq!(queue.outstanding().unwrap(), 0);
    }

    #[test]
    fn test_wait_until_drained_wakes_on_complete() {
        // Arrange
        let queue = Arc::new(RequestQueue::new(5));
        queue.add(request(1)).unwrap();
        queue.take_next().unwrap();
        let (done_tx, done_rx) = unbounded::<bool>();

        let waiter_queue = Arc::clone(&queue);
        let waiter = spawn(move || {
            let drained = waiter_queue.wait_until_drained(None).unwrap();
            done_tx.send(drained).unwrap();
        });

        // Act
        std::thread::sleep(Duration::from_millis(20));
        assert!(done_rx.try_recv().is_err());
        queue.complete().unwrap();

        // Assert
        assert!(done_rx.recv_timeout(Duration::from_secs(1)).unwrap());
        waiter.join().unwrap();
    }

    #[test]
    fn test_wait_until_drained_times_out() {
        // Arrange
        let queue = RequestQueue::new(5);
        assert!(queue.wait_until_drained(Some(Instant::now())).unwrap());
        queue.add(request(1)).unwrap();

        // Act
        let started = Instant::now();
        let drained = queue
            .wait_until_drained(Some(started + Duration::from_millis(30)))
            .unwrap();

        // Assert
        assert!(!drained);
        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(queue.outstanding().unwrap(), 1);
    }
}
