use rand::{rngs::StdRng, Rng, SeedableRng};
use spsc_pool::{channel, EmptyQueue, SpscQueue};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_basic_push_pop() {
    let mut queue = SpscQueue::new();

    queue.push(42);
    assert_eq!(queue.pop(), Ok(42));
}

#[test]
fn test_fifo_order() {
    let mut queue = SpscQueue::new();

    for i in 0..10 {
        queue.push(i);
    }

    for i in 0..10 {
        assert_eq!(queue.pop(), Ok(i));
    }
}

#[test]
fn test_empty_queue() {
    let mut queue = SpscQueue::<i32>::new();
    assert!(queue.is_empty());
    assert_eq!(queue.pop(), Err(EmptyQueue));
}

#[test]
fn test_empty_after_drain() {
    let (mut producer, mut consumer) = channel();
    for i in 0..100u32 {
        producer.push(i);
    }

    let mut drained = 0;
    while !consumer.is_empty() {
        consumer.pop().unwrap();
        drained += 1;
    }

    assert_eq!(drained, 100);
    assert_eq!(consumer.pop(), Err(EmptyQueue));
    assert!(producer.is_empty());
}

#[test]
fn test_spsc_threaded() {
    let (mut producer, mut consumer) = channel::<usize>();

    let producer = thread::spawn(move || {
        for i in 0..10_000 {
            producer.push(i);
        }
    });

    let consumer = thread::spawn(move || {
        for i in 0..10_000 {
            loop {
                match consumer.pop() {
                    Ok(val) => {
                        assert_eq!(val, i);
                        break;
                    }
                    Err(EmptyQueue) => std::hint::spin_loop(),
                }
            }
        }
        assert!(consumer.pop().is_err());
    });

    producer.join().unwrap();
    consumer.join().unwrap();
}

#[test]
fn test_drop_elements() {
    static DROP_COUNT: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct DropCounter;

    impl Drop for DropCounter {
        fn drop(&mut self) {
            DROP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    }

    {
        let mut queue = SpscQueue::new();
        for _ in 0..5 {
            queue.push(DropCounter);
        }
    }

    assert_eq!(DROP_COUNT.load(Ordering::Relaxed), 5);
}

#[test]
fn test_alternating_push_pop() {
    let (mut producer, mut consumer) = channel();

    for i in 0..100 {
        producer.push(i);
        assert_eq!(consumer.pop(), Ok(i));
    }

    // Each push reclaims the node the previous pop moved past.
    assert_eq!(producer.retained_nodes(), 2);
}

#[test]
fn test_stress_rapid_push_pop() {
    const MESSAGES: u64 = 100_000;
    let (mut producer, mut consumer) = channel::<u64>();

    let producer = thread::spawn(move || {
        for i in 0..MESSAGES {
            producer.push(i);
        }
        producer
    });

    let consumer = thread::spawn(move || {
        let mut sum = 0u64;
        let mut next = 0u64;
        while next < MESSAGES {
            if let Ok(val) = consumer.pop() {
                assert_eq!(val, next);
                sum += val;
                next += 1;
            } else {
                std::hint::spin_loop();
            }
        }
        sum
    });

    let producer = producer.join().unwrap();
    let sum = consumer.join().unwrap();
    assert_eq!(sum, MESSAGES * (MESSAGES - 1) / 2);
    assert_eq!(producer.pushed(), MESSAGES);
}

#[test]
fn test_random_interleavings_keep_order() {
    // Randomised burst sizes on both sides; pauses force the consumer to
    // catch up with the producer and sit on an empty queue.
    for seed in 0..8u64 {
        const TOTAL: u32 = 20_000;
        let (mut producer, mut consumer) = channel::<u32>();

        let writer = thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut next = 0;
            while next < TOTAL {
                let burst = rng.gen_range(1..64).min(TOTAL - next);
                for _ in 0..burst {
                    producer.push(next);
                    next += 1;
                }
                if rng.gen_bool(0.2) {
                    thread::yield_now();
                }
            }
        });

        let reader = thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31) + 7);
            let mut received = Vec::with_capacity(TOTAL as usize);
            while received.len() < TOTAL as usize {
                let burst = rng.gen_range(1..64);
                for _ in 0..burst {
                    match consumer.pop() {
                        Ok(v) => received.push(v),
                        Err(EmptyQueue) => break,
                    }
                }
                if rng.gen_bool(0.2) {
                    thread::yield_now();
                }
            }
            (received, consumer)
        });

        writer.join().unwrap();
        let (received, mut consumer) = reader.join().unwrap();
        assert_eq!(received, (0..TOTAL).collect::<Vec<_>>(), "seed {seed}");
        assert_eq!(consumer.pop(), Err(EmptyQueue));
    }
}

#[test]
fn test_reclamation_never_passes_consumer() {
    const MESSAGES: u64 = 50_000;
    let (mut producer, mut consumer) = channel::<Box<u64>>();
    // Bumped before every pop, so it is never behind the real pop count.
    let claimed = Arc::new(AtomicU64::new(0));

    let claimed_by_consumer = Arc::clone(&claimed);
    let reader = thread::spawn(move || {
        let mut next = 0u64;
        while next < MESSAGES {
            if consumer.is_empty() {
                std::hint::spin_loop();
                continue;
            }
            claimed_by_consumer.fetch_add(1, Ordering::SeqCst);
            let value = consumer.pop().unwrap();
            assert_eq!(*value, next);
            next += 1;
        }
        consumer.popped()
    });

    for i in 0..MESSAGES {
        producer.push(Box::new(i));
        let popped = claimed.load(Ordering::SeqCst);
        assert!(producer.reclaimed() <= popped);
        assert_eq!(producer.retained_nodes(), producer.pushed() + 1 - producer.reclaimed());
    }

    let popped = reader.join().unwrap();
    assert_eq!(popped, MESSAGES);
    producer.reclaim();
    assert_eq!(producer.reclaimed(), MESSAGES);
    assert_eq!(producer.retained_nodes(), 1);
}
