/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Interpreter used to launch the prediction script (e.g. "python3").
    pub oracle_command: String,
    /// Path to the prediction script passed as the first argument.
    pub oracle_script: String,
    /// Base URL of the Nominatim-compatible geocoding service.
    pub nominatim_base_url: String,
    /// Base URL of the OSRM-compatible routing service.
    pub osrm_base_url: String,
    /// User-Agent sent to the geocoding service (required by Nominatim's
    /// usage policy).
    pub geocoder_user_agent: String,
    /// When true, internal error messages are included in 500 responses.
    pub is_development: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            oracle_command: std::env::var("ORACLE_COMMAND")
                .unwrap_or_else(|_| "python3".to_string()),
            oracle_script: std::env::var("ORACLE_SCRIPT")
                .unwrap_or_else(|_| "./predict.py".to_string()),
            nominatim_base_url: std::env::var("NOMINATIM_BASE_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            osrm_base_url: std::env::var("OSRM_BASE_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            geocoder_user_agent: std::env::var("GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| "TrafficPulse/0.1 traffic-pulse-api".to_string()),
            is_development: std::env::var("ENVIRONMENT")
                .map(|v| v == "development")
                .unwrap_or(false),
        }
    }
}
