use purgekit::config::CacheConfig;
use purgekit::policy::purge_lru::PurgeLruCache;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("purgekit=debug")),
        )
        .init();

    let config = CacheConfig::from_dotenv_reader("CACHE_SIZE=8\nPURGE_RATIO=0.5\n".as_bytes())?;
    let mut cache: PurgeLruCache<String, String> = config.build()?;

    for i in 0..10 {
        cache.put(format!("prompt-{i}"), format!("answer-{i}"));
        println!("after put prompt-{i}: {} resident", cache.len());
    }

    println!("prompt-0 cached? {}", cache.get(&"prompt-0".to_string()).is_some());
    if let Some(answer) = cache.get(&"prompt-5".to_string()) {
        println!("hit prompt-5: {answer}");
    }
    let order: Vec<_> = cache.keys().cloned().collect();
    println!("recency order: {order:?}");
    Ok(())
}

// Expected output (stdout):
// after put prompt-0: 1 resident
// ...
// after put prompt-7: 8 resident
// after put prompt-8: 5 resident
// after put prompt-9: 6 resident
// prompt-0 cached? false
// hit prompt-5: answer-5
// recency order: ["prompt-5", "prompt-9", "prompt-8", "prompt-7", "prompt-6", "prompt-4"]
//
// Explanation: capacity=8, purge_ratio=0.5. The ninth put finds the cache full
// and purges the four oldest prompts before inserting; the tenth fits.
