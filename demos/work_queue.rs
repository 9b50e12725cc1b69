use spsc_pool::{channel, Message, Worker};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    println!("Worker Queue Example\n");

    const NUM_WORKERS: usize = 4;
    const NUM_JOBS: u64 = 20;
    const BATCH: usize = 8;

    let mut inbound = vec![];
    let mut outbound = vec![];
    let mut workers = vec![];

    for worker_id in 0..NUM_WORKERS {
        let (jobs_tx, jobs_rx) = channel::<Message<BATCH>>();
        let (results_tx, results_rx) = channel();
        let workload = Arc::new(|n: u64| {
            thread::sleep(Duration::from_millis(5));
            n % 3 == 0
        });
        let worker = Worker::new(worker_id, jobs_rx, results_tx, workload);
        workers.push(thread::spawn(move || worker.run()));
        inbound.push(jobs_tx);
        outbound.push(results_rx);
    }

    let mut sent = 0;
    for job in 0..NUM_JOBS {
        let worker_id = job as usize % NUM_WORKERS;
        inbound[worker_id].push(Message::sequential(job * BATCH as u64, BATCH));
        println!("📝 Job-{job:02} -> worker {worker_id}");
        sent += 1;
    }

    let mut received = 0;
    while received < sent {
        for (worker_id, rx) in outbound.iter_mut().enumerate() {
            for message in rx.try_iter() {
                if let Message::Results(items) = message {
                    println!("✨ worker {worker_id}: {:?}", items.as_slice());
                }
                received += 1;
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
    println!("✅ All results collected!");

    for tx in &mut inbound {
        tx.push(Message::Exit);
    }
    for (worker_id, handle) in workers.into_iter().enumerate() {
        let stats = handle.join().unwrap();
        println!("Worker {worker_id} finished ({} batches)", stats.batches);
    }

    println!("\n🎉 Work queue example completed!");
}
