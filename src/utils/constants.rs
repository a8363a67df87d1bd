/// Column names
pub const COL_TIMESTAMP: &str = "timestamp";
pub const COL_LOCATION: &str = "location";
pub const COL_RAIN_RATE: &str = "rain_rate";
pub const COL_HUMIDITY: &str = "relative_humidity_2m";
pub const COL_CLOUDCOVER: &str = "cloudcover";
pub const COL_WINDSPEED: &str = "windspeed_10m";
pub const COL_PRESSURE: &str = "pressure_msl";
pub const COL_TEMPERATURE: &str = "temperature_2m";
pub const COL_SIGNAL: &str = "signal_dbm";

/// Header aliases used by Open-Meteo exports
pub const ALIAS_TIMESTAMP: &str = "time";
pub const ALIAS_RAIN_RATE: &str = "rain";

/// Columns every input table must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_LOCATION,
    COL_RAIN_RATE,
    COL_HUMIDITY,
    COL_CLOUDCOVER,
    COL_WINDSPEED,
    COL_PRESSURE,
    COL_TEMPERATURE,
];

/// Columns with a fixed meaning; any other input column is passed through
pub const KNOWN_COLUMNS: [&str; 11] = [
    COL_TIMESTAMP,
    ALIAS_TIMESTAMP,
    COL_LOCATION,
    COL_RAIN_RATE,
    ALIAS_RAIN_RATE,
    COL_HUMIDITY,
    COL_CLOUDCOVER,
    COL_WINDSPEED,
    COL_PRESSURE,
    COL_TEMPERATURE,
    COL_SIGNAL,
];

/// Defaults substituted for null weather fields
pub const DEFAULT_RAIN_RATE: f64 = 0.0;
pub const DEFAULT_HUMIDITY: f64 = 50.0;
pub const DEFAULT_CLOUDCOVER: f64 = 0.0;
pub const DEFAULT_WINDSPEED: f64 = 0.0;
pub const DEFAULT_PRESSURE: f64 = 1013.25;
pub const DEFAULT_TEMPERATURE: f64 = 20.0;
pub const DEFAULT_HOUR: u32 = 12;
pub const DEFAULT_MONTH: u32 = 6;

/// Valid physical ranges used by the quality checker
pub const VALID_TEMPERATURE: (f64, f64) = (-50.0, 50.0);
pub const VALID_HUMIDITY: (f64, f64) = (0.0, 100.0);
pub const VALID_PRESSURE: (f64, f64) = (900.0, 1100.0);
pub const VALID_CLOUDCOVER: (f64, f64) = (0.0, 100.0);
pub const VALID_WINDSPEED: (f64, f64) = (0.0, 150.0);
pub const VALID_RAIN_RATE: (f64, f64) = (0.0, 100.0);

/// Sensor malfunction ranges used for outlier injection
pub const MALFUNCTION_RAIN_RATE: (f64, f64) = (50.0, 100.0);
pub const MALFUNCTION_HUMIDITY: (f64, f64) = (95.0, 100.0);
pub const MALFUNCTION_WINDSPEED: (f64, f64) = (30.0, 50.0);

/// Receiver model
pub const DEFAULT_BASE_DBM: f64 = -70.0;
pub const MIN_SIGNAL_DBM: f64 = -120.0;
pub const MAX_SIGNAL_DBM: f64 = -40.0;
pub const QUANTIZATION_STEP_DB: f64 = 0.5;

/// Degradation rates used by the simulation pipeline
pub const PIPELINE_MISSING_RATE: f64 = 0.02;
pub const PIPELINE_OUTLIER_RATE: f64 = 0.015;

/// Degradation rates of a standalone degrader
pub const DEFAULT_MISSING_RATE: f64 = 0.05;
pub const DEFAULT_OUTLIER_RATE: f64 = 0.02;

/// Location bias jitter
pub const DEFAULT_BIAS_NOISE_STD: f64 = 0.4;

/// Processing defaults
pub const DEFAULT_RANDOM_SEED: u64 = 42;
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "SIGNAL_SIM";
