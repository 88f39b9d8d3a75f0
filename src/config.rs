use failure::Error;
use std::env;
use std::path::PathBuf;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_MAX_IN_FLIGHT: usize = 4;
const DEFAULT_IMAGE_DIR: &str = "./images";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the access-control backend.
    pub api_url: Url,
    /// Upper bound on concurrently running requests per screen.
    pub max_in_flight: usize,
    /// Where downloaded access images are written.
    pub image_dir: PathBuf,
}

impl Config {
    pub fn new(api_url: Url) -> Config {
        Config {
            api_url,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }

    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("PLATES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| format_err!("Invalid PLATES_API_URL {:?}: {}", raw_url, e))?;
        if api_url.cannot_be_a_base() {
            return Err(format_err!("PLATES_API_URL {:?} cannot be a base url", raw_url));
        }
        let max_in_flight = match lookup("MAX_IN_FLIGHT") {
            Some(s) => s
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| {
                    format_err!("MAX_IN_FLIGHT must be a positive integer, got {:?}", s)
                })?,
            None => DEFAULT_MAX_IN_FLIGHT,
        };
        let image_dir = lookup("IMAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR));
        Ok(Config {
            api_url,
            max_in_flight,
            image_dir,
        })
    }
}
