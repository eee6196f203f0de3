use anyhow::bail;
use clap::Parser;
use std::time::Duration;

/// Runtime configuration for the `geoloc-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults suitable for local use.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "geoloc-server",
    version,
    about = "A JSON service for geocoding lookups, stored records and cached records"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Path prefix every route is mounted under. Routes live at
    /// `{context_path}/api/...`.
    ///
    /// Environment variable: `CONTEXT_PATH`
    #[arg(long, env = "CONTEXT_PATH", default_value_t = String::from("/Location"))]
    pub context_path: String,

    /// Reverse geocoding endpoint (Google Geocoding API compatible).
    ///
    /// Environment variable: `GEOCODER_URL`
    #[arg(
        long,
        env = "GEOCODER_URL",
        default_value_t = String::from("https://maps.googleapis.com/maps/api/geocode/json")
    )]
    pub geocoder_url: String,

    /// API key sent to the geocoding provider, if it requires one.
    ///
    /// Environment variable: `GEOCODER_API_KEY`
    #[arg(long, env = "GEOCODER_API_KEY", hide_env_values = true)]
    pub geocoder_api_key: Option<String>,

    /// Timeout in seconds for a single provider request.
    ///
    /// Environment variable: `GEOCODER_TIMEOUT_SECS`
    #[arg(long, env = "GEOCODER_TIMEOUT_SECS", default_value_t = 10)]
    pub geocoder_timeout_secs: u64,

    /// Title of the published API document.
    ///
    /// Environment variable: `API_TITLE`
    #[arg(long, env = "API_TITLE", default_value_t = String::from("Location Services"))]
    pub api_title: String,

    /// Description of the published API document.
    ///
    /// Environment variable: `API_DESCRIPTION`
    #[arg(
        long,
        env = "API_DESCRIPTION",
        default_value_t = String::from("Geocoding lookups backed by a document store and a record cache")
    )]
    pub api_description: String,

    /// Allow cross-origin requests from any origin.
    ///
    /// Environment variable: `CORS`
    #[arg(long, env = "CORS", default_value_t = false)]
    pub cors: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub context_path: String,
    pub geocoder_url: String,
    pub geocoder_api_key: Option<String>,
    pub geocoder_timeout: Duration,
    pub api_title: String,
    pub api_description: String,
    pub cors: bool,
}

impl ServerConfig {
    /// Root of the JSON API, e.g. `/Location/api`.
    pub fn api_root(&self) -> String {
        format!("{}/api", self.context_path)
    }

    /// Where the OpenAPI document is served, e.g. `/Location/api-doc`.
    pub fn api_doc_path(&self) -> String {
        format!("{}/api-doc", self.context_path)
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !args.context_path.starts_with('/') {
            bail!(
                "CONTEXT_PATH ({}) must start with '/'",
                args.context_path
            );
        }
        if args.context_path.len() > 1 && args.context_path.ends_with('/') {
            bail!(
                "CONTEXT_PATH ({}) must not end with '/'",
                args.context_path
            );
        }
        if args.geocoder_timeout_secs == 0 {
            bail!("GEOCODER_TIMEOUT_SECS must be greater than 0");
        }
        if !(args.geocoder_url.starts_with("http://") || args.geocoder_url.starts_with("https://"))
        {
            bail!(
                "GEOCODER_URL ({}) must be an http(s) URL",
                args.geocoder_url
            );
        }

        // "/" as a context path means the API sits at "/api".
        let context_path = if args.context_path == "/" {
            String::new()
        } else {
            args.context_path
        };

        Ok(Self {
            server_addr: args.server_addr,
            context_path,
            geocoder_url: args.geocoder_url,
            geocoder_api_key: args.geocoder_api_key.filter(|key| !key.is_empty()),
            geocoder_timeout: Duration::from_secs(args.geocoder_timeout_secs),
            api_title: args.api_title,
            api_description: args.api_description,
            cors: args.cors,
        })
    }
}
