#[cfg(test)]
mod tests {
    use gpool::pool::{Config, Pool};
    use crossbeam::channel;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::{Duration, Instant},
    };

    fn measure<F, T>(name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();
        println!("✓ {}: {:?}", name, elapsed);
        result
    }

    #[test]
    fn load_test_1_small_fast_tasks() {
        println!("\n=== LOAD TEST 1: 100k быстрых задач ===");
        let pool = Pool::with_config(Config::cpu_bound()).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = channel::unbounded();

        measure("100k tiny tasks", || {
            for i in 0..100_000u64 {
                let counter = Arc::clone(&counter);
                let done = done_tx.clone();
                pool.run(move || {
                    std::hint::black_box(i * 2);
                    counter.fetch_add(1, Ordering::Relaxed);
                    let _ = done.send(());
                })
                .unwrap();
            }
            for _ in 0..100_000 {
                done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
            }
        });

        assert_eq!(counter.load(Ordering::Relaxed), 100_000);
        let status = pool.status();
        println!("  Reuse rate: {:.3}", status.reuse_rate);
        println!("  Воркеров: {} (idle {})", status.running, status.idle);
        assert!(status.running <= num_cpus::get());
    }

    #[test]
    fn load_test_2_many_producers() {
        println!("\n=== LOAD TEST 2: 8 продюсеров, 5k задач по 100μs ===");
        let pool = Arc::new(Pool::new(16, 32).unwrap());
        let (done_tx, done_rx) = channel::unbounded();

        measure("8 x 5k tasks @ 100μs", || {
            let producers: Vec<_> = (0..8)
                .map(|_| {
                    let pool = Arc::clone(&pool);
                    let done_tx = done_tx.clone();
                    thread::spawn(move || {
                        for _ in 0..5_000 {
                            let done = done_tx.clone();
                            pool.run(move || {
                                thread::sleep(Duration::from_micros(100));
                                let _ = done.send(());
                            })
                            .unwrap();
                        }
                    })
                })
                .collect();

            for producer in producers {
                producer.join().unwrap();
            }
            for _ in 0..40_000 {
                done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
            }
        });

        let status = pool.status();
        println!("  Reuse rate: {:.3}", status.reuse_rate);
        println!("  Ожидающих: {}", status.waiting);
        assert!(status.running <= 32);
        assert!(status.idle <= 16);
        assert_eq!(status.waiting, 0);
    }

    #[test]
    fn load_test_3_mixed_failures() {
        println!("\n=== LOAD TEST 3: Нагрузка с ошибками ===");
        let prev = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let pool = Pool::new(4, 4).unwrap();
        let (done_tx, done_rx) = channel::unbounded();

        measure("2k tasks, every 10th fails", || {
            for x in 0..2_000 {
                let done = done_tx.clone();
                pool.run(move || -> Result<(), String> {
                    let _ = done.send(());
                    if x % 20 == 0 {
                        panic!("Test panic");
                    }
                    if x % 20 == 10 {
                        return Err(format!("item {} rejected", x));
                    }
                    Ok(())
                })
                .unwrap();
            }
            for _ in 0..2_000 {
                done_rx.recv_timeout(Duration::from_secs(10)).unwrap();
            }
        });

        let deadline = Instant::now() + Duration::from_secs(5);
        let status = loop {
            let status = pool.status();
            if status.completed + status.failed == 2_000 || Instant::now() > deadline {
                break status;
            }
            thread::sleep(Duration::from_millis(1));
        };

        println!("  Success rate: {:.1}%", status.success_rate() * 100.0);
        assert_eq!(status.failed, 200);
        assert_eq!(status.completed, 1_800);
        assert!(status.running <= 4);

        std::panic::set_hook(prev);
    }

    #[tokio::test]
    async fn test_monitoring() {
        println!("\n=== TEST: Мониторинг в реальном времени ===");
        let pool = Arc::new(Pool::new(2, 4).unwrap());
        let initial_count = Arc::strong_count(&pool);
        let reports = Arc::new(AtomicUsize::new(0));

        let seen = Arc::clone(&reports);
        let monitor_token = pool.start_monitoring(Duration::from_millis(10), move |status| {
            seen.fetch_add(1, Ordering::Relaxed);
            if status.running > 0 {
                println!("  [Monitor] Running: {}, Idle: {}, Waiting: {}",
                         status.running, status.idle, status.waiting);
            }
        });

        for _ in 0..20 {
            pool.run(|| thread::sleep(Duration::from_millis(2))).unwrap();
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(reports.load(Ordering::Relaxed) > 0, "callback должен вызываться");

        Pool::stop_monitoring(monitor_token);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(Arc::strong_count(&pool), initial_count, "Мониторинг должен освободить Arc");
        println!("  ✓ Мониторинг завершен");
    }
}
