#[cfg(test)]
mod tests {
    use slotq::{PopError, PushError, SlotQueue};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use rand::prelude::*;

    cfg_if::cfg_if! {
        if #[cfg(feature = "ci")] {
            const STRESS_ITEMS: usize = 5_000;
        } else {
            const STRESS_ITEMS: usize = 50_000;
        }
    }

    /// Long enough for a spawned thread to reach its blocking wait.
    const SETTLE: Duration = Duration::from_millis(200);

    #[test]
    fn push_blocks_while_full() {
        let q = Arc::new(SlotQueue::with_capacity(2).unwrap());
        q.push(1).unwrap();
        q.push(2).unwrap();

        let returned = Arc::new(AtomicBool::new(false));
        let pusher = {
            let q = q.clone();
            let returned = returned.clone();
            thread::spawn(move || {
                q.push(3).unwrap();
                returned.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(SETTLE);
        assert!(
            !returned.load(Ordering::SeqCst),
            "push returned with the queue still full"
        );

        // Freeing one slot unblocks the pending push.
        assert_eq!(q.pop(), Ok(1));
        pusher.join().unwrap();
        assert!(returned.load(Ordering::SeqCst));

        assert_eq!(q.pop(), Ok(2));
        assert_eq!(q.pop(), Ok(3));
        assert!(q.is_empty());
    }

    #[test]
    fn pop_blocks_while_empty() {
        let q = Arc::new(SlotQueue::with_capacity(2).unwrap());

        let returned = Arc::new(AtomicBool::new(false));
        let popper = {
            let q = q.clone();
            let returned = returned.clone();
            thread::spawn(move || {
                let item = q.pop().unwrap();
                returned.store(true, Ordering::SeqCst);
                item
            })
        };

        thread::sleep(SETTLE);
        assert!(
            !returned.load(Ordering::SeqCst),
            "pop returned with the queue still empty"
        );

        q.push(42).unwrap();
        assert_eq!(popper.join().unwrap(), 42);
    }

    #[test]
    fn pop_timeout_beaten_by_late_push() {
        let q = Arc::new(SlotQueue::with_capacity(1).unwrap());

        let popper = {
            let q = q.clone();
            thread::spawn(move || q.pop_timeout(Duration::from_secs(10)))
        };

        thread::sleep(Duration::from_millis(50));
        q.push(7).unwrap();
        assert_eq!(popper.join().unwrap(), Ok(7));
    }

    #[test]
    fn two_producers_two_consumers() {
        // The original demonstration workload: two threads pushing ten
        // distinct integers each, two threads popping ten times each.
        const PER_THREAD: usize = 10;

        let q = SlotQueue::with_capacity(20).unwrap();

        let mut popped = crossbeam_utils::thread::scope(|sc| {
            for &offset in &[0, PER_THREAD] {
                let q = &q;
                sc.spawn(move |_| {
                    for j in 0..PER_THREAD {
                        q.push(offset + j).unwrap();
                    }
                });
            }

            let consumers: Vec<_> = (0..2)
                .map(|_| {
                    sc.spawn(|_| {
                        (0..PER_THREAD)
                            .map(|_| q.pop().unwrap())
                            .collect::<Vec<usize>>()
                    })
                })
                .collect();

            consumers
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect::<Vec<usize>>()
        })
        .unwrap();

        popped.sort_unstable();
        assert_eq!(popped, (0..2 * PER_THREAD).collect::<Vec<usize>>());
        assert!(q.is_empty());
    }

    #[test]
    fn close_unblocks_blocked_poppers() {
        let q = Arc::new(SlotQueue::<u32>::with_capacity(1).unwrap());

        let poppers: Vec<_> = (0..3)
            .map(|_| {
                let q = q.clone();
                thread::spawn(move || q.pop())
            })
            .collect();

        thread::sleep(SETTLE);
        assert!(q.close());

        for popper in poppers {
            assert_eq!(popper.join().unwrap(), Err(PopError::Closed));
        }
    }

    #[test]
    fn close_returns_item_to_blocked_pusher() {
        let q = Arc::new(SlotQueue::with_capacity(1).unwrap());
        q.push("first").unwrap();

        let pusher = {
            let q = q.clone();
            thread::spawn(move || q.push("second"))
        };

        thread::sleep(SETTLE);
        q.close();

        assert_eq!(pusher.join().unwrap(), Err(PushError::Closed("second")));

        // Whatever was queued before the close still drains in order.
        assert_eq!(q.pop(), Ok("first"));
        assert_eq!(q.pop(), Err(PopError::Closed));
    }

    #[test]
    fn randomized_stress() {
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 4;
        const TOTAL: usize = PRODUCERS * STRESS_ITEMS;
        const PER_CONSUMER: usize = TOTAL / CONSUMERS;

        // A small queue forces constant blocking on both sides.
        let q = SlotQueue::with_capacity(8).unwrap();

        let batches = crossbeam_utils::thread::scope(|sc| {
            for p in 0..PRODUCERS {
                let q = &q;
                sc.spawn(move |_| {
                    let mut trng = thread_rng();
                    for seq in 0..STRESS_ITEMS {
                        q.push((p, seq)).unwrap();
                        // Occasional jitter to vary the interleaving.
                        if trng.gen_range(0..64) == 0 {
                            thread::yield_now();
                        }
                    }
                });
            }

            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    sc.spawn(|_| {
                        let mut seen = Vec::with_capacity(PER_CONSUMER);
                        for _ in 0..PER_CONSUMER {
                            seen.push(q.pop().unwrap());
                        }
                        seen
                    })
                })
                .collect();

            consumers
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<Vec<(usize, usize)>>>()
        })
        .unwrap();

        assert!(q.is_empty());

        // No loss, no duplication: every (producer, seq) pair exactly once.
        let mut delivered = vec![false; TOTAL];
        for batch in &batches {
            #[cfg(feature = "verbose")]
            println!("consumer drained {} items", batch.len());

            for &(p, seq) in batch {
                let idx = p * STRESS_ITEMS + seq;
                assert!(!delivered[idx], "duplicate delivery of ({}, {})", p, seq);
                delivered[idx] = true;
            }
        }
        assert!(delivered.iter().all(|d| *d));

        // Queue order is FIFO, so each consumer must observe every
        // producer's sequence numbers in increasing order.
        for (c, batch) in batches.iter().enumerate() {
            let mut last_seq = vec![None; PRODUCERS];
            for &(p, seq) in batch {
                if let Some(prev) = last_seq[p] {
                    assert!(
                        seq > prev,
                        "consumer {} saw producer {} out of order: {} after {}",
                        c,
                        p,
                        seq,
                        prev
                    );
                }
                last_seq[p] = Some(seq);
            }
        }
    }
}
