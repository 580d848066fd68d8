use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub mongo_url: String,
    pub db_name: String,
    pub upload_dir: String,
    pub frontend_url: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "4000"),
            mongo_url: try_load("MONGO_URL", "mongodb://localhost:27017"),
            db_name: try_load("MONGO_DB", "food-order"),
            upload_dir: try_load("UPLOAD_DIR", "uploads"),
            frontend_url: try_load("FRONTEND_URL", "http://localhost:5173"),
            jwt_secret: read_secret("JWT_SECRET"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> String {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .or_else(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
            env::var(secret_name)
        })
        .expect("Secrets misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::try_load;

    #[test]
    fn try_load_falls_back_to_default() {
        let port: u16 = try_load("FOOD_ORDER_TEST_UNSET_PORT", "4000");
        assert_eq!(port, 4000);
    }

    #[test]
    fn try_load_reads_the_environment() {
        std::env::set_var("FOOD_ORDER_TEST_SET_PORT", "8123");
        let port: u16 = try_load("FOOD_ORDER_TEST_SET_PORT", "4000");
        assert_eq!(port, 8123);
    }
}
