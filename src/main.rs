use gpool::{Config, Pool, PoolError};
use std::{
    error::Error,
    hint::black_box,
    sync::Arc,
    thread,
    time::Instant,
};
use tokio::{
    runtime::{Builder, Runtime},
    time::Duration,
};
use tracing_subscriber::EnvFilter;


fn demo_task() {
    black_box((std::f64::consts::PI / 4.0).sin());
}

fn build_runtime() -> Result<Runtime, Box<dyn Error>> {
    Ok(Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = build_runtime()?;

    let pool = Arc::new(Pool::with_config(Config::default())?);
    let now = Instant::now();

    let producer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || -> Result<u64, PoolError> {
            let deadline = Instant::now() + Duration::from_secs(5);
            let mut submitted = 0u64;
            while Instant::now() < deadline {
                pool.run(demo_task)?;
                submitted += 1;
            }
            Ok(submitted)
        })
    };

    rt.block_on(async {
        let token = pool.start_monitoring(Duration::from_secs(1), |status| {
            println!("{:#?}", status);
        });
        tokio::time::sleep(Duration::from_secs(5)).await;
        Pool::stop_monitoring(token);
    });

    let submitted = producer.join().unwrap_or(Ok(0))?;
    println!("submitted: {} elapsed: {:?}", submitted, now.elapsed());
    println!("reuse rate: {:.3}", pool.status().reuse_rate);
    pool.shutdown();
    Ok(())
}
