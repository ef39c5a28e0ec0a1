/// Shared constants for sources, map rendering and the HTTP surface

// Brazilian state boundaries consumed by the external choropleth renderer
pub const BRAZIL_STATES_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/codeforamerica/click_that_hood/master/public/data/brazil-states.geojson";
// The renderer joins ChoroplethPoint::abbreviation against this feature property
pub const GEOJSON_FEATURE_ID_KEY: &str = "properties.sigla";
pub const DEFAULT_COLOR_SCALE: &str = "Blues";
pub const DEFAULT_VALUE_LABEL: &str = "População (milhares)";
pub const MAP_SCOPE: &str = "south america";
pub const POPULATION_HOVER_FORMAT: &str = ":.1f";

// Source defaults
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_POPULATION_PATH: &str = "base/POP2022_Brasil_e_UFs.xlsx";
pub const DEFAULT_CSV_DELIMITER: char = ';';
pub const DEFAULT_STATE_COLUMN: &str = "estado";
pub const DEFAULT_POPULATION_COLUMN: &str = "populacao";

// Demographics CSV columns
pub const DEMOGRAPHICS_STATE_COLUMN: &str = "estado";
pub const DEMOGRAPHICS_REGION_COLUMN: &str = "regiao";
pub const DEMOGRAPHICS_MALE_COLUMN: &str = "populacao_masculina";
pub const DEMOGRAPHICS_FEMALE_COLUMN: &str = "populacao_feminina";

// Server defaults
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_LOGIN_URL: &str = "http://127.0.0.1:8000/login";
pub const DEFAULT_LOGOUT_URL: &str = "http://127.0.0.1:8000/logout";
pub const DEFAULT_SESSION_COOKIE: &str = "session";

// Environment overrides
pub const ENV_POPULATION_PATH: &str = "LUMINA_POPULATION_PATH";
pub const ENV_PORT: &str = "LUMINA_PORT";
