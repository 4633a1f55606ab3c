use anyhow::Result;
use dotenvy::dotenv;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

#[derive(Debug, Clone)]
pub struct Config {
    pub max_file_size: usize,
    pub port: u16,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Failed to parse PORT: {}", e))?,
            Err(_) => 3000,
        };

        let max_file_size = match std::env::var("MAX_FILE_SIZE") {
            Ok(value) => value
                .parse()
                .map_err(|e| anyhow::anyhow!("Failed to parse MAX_FILE_SIZE: {}", e))?,
            Err(_) => default_max_file_size(),
        };

        Ok(Config {
            max_file_size,
            port,
        })
    }
}
