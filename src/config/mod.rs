//! Connection configuration for the schema applier.
//!
//! Every field comes from one of the standard libpq `PG*` environment
//! variables, falling back to a local development default when the variable
//! is absent or empty. `ConnectionConfig::from_env` performs that loading;
//! `from_lookup` does the same against an arbitrary source so the resolution
//! rules can be exercised without touching the process environment.

use std::collections::HashMap;
use std::env;
use std::fmt::Formatter;
use std::path::Path;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use tracing::{debug, warn};

/// Environment variable names.
pub const ENV_HOST: &str = "PGHOST";
pub const ENV_PORT: &str = "PGPORT";
pub const ENV_USER: &str = "PGUSER";
pub const ENV_PASSWORD: &str = "PGPASSWORD";
pub const ENV_DATABASE: &str = "PGDATABASE";
pub const ENV_SSLMODE: &str = "PGSSLMODE";

/// Defaults used when the corresponding variable is unset or empty.
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "volleyleague";

/// The only `PGSSLMODE` value that turns TLS on.
const SSLMODE_REQUIRE: &str = "require";

/// Reported to the server so our session is identifiable in `pg_stat_activity`.
pub const APPLICATION_NAME: &str = "schema-applier";

/// Resolved connection parameters. Built once per run and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    database: String,
    require_tls: bool,
}

impl ConnectionConfig {
    /// Create a config explicitly.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: Option<String>,
        database: impl Into<String>,
        require_tls: bool,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password,
            database: database.into(),
            require_tls,
        }
    }

    /// Load from the process environment, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from the process environment, letting `KEY=value` lines of the
    /// file at `path` take precedence. A missing file is skipped; an
    /// unparsable one is logged and skipped.
    pub fn from_env_and_file(path: &Path) -> Self {
        let overrides = read_env_file(path);
        Self::from_lookup(|key| overrides.get(key).cloned().or_else(|| env::var(key).ok()))
    }

    /// Resolve against `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            host: get(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: get(ENV_PORT).map_or(DEFAULT_PORT, |raw| parse_port(&raw)),
            user: get(ENV_USER).unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: get(ENV_PASSWORD),
            database: get(ENV_DATABASE).unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            require_tls: get(ENV_SSLMODE).as_deref() == Some(SSLMODE_REQUIRE),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn user(&self) -> &str {
        &self.user
    }
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
    pub fn database(&self) -> &str {
        &self.database
    }
    /// Whether the session must be encrypted.
    pub fn require_tls(&self) -> bool {
        self.require_tls
    }

    /// Human readable `database at host:port`, safe to log.
    pub fn target(&self) -> String {
        format!("{} at {}:{}", self.database, self.host, self.port)
    }

    /// Translate into sqlx options.
    ///
    /// `~/.pgpass` is not consulted, and without `require_tls` the session
    /// still upgrades to TLS opportunistically when the server offers it.
    pub fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_tls {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        let options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .application_name(APPLICATION_NAME);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_PORT,
            DEFAULT_USER,
            None,
            DEFAULT_DATABASE,
            false,
        )
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("require_tls", &self.require_tls)
            .finish()
    }
}

/// Anything that is not a port in `1..=65535` yields the default port.
fn parse_port(raw: &str) -> u16 {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => port,
        _ => {
            warn!(value = raw, default = DEFAULT_PORT, "Ignoring unusable PGPORT");
            DEFAULT_PORT
        }
    }
}

fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => {
            debug!(path = %path.display(), "No env file");
            return HashMap::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not open env file");
            return HashMap::new();
        }
    };

    match iter.collect::<Result<HashMap<_, _>, _>>() {
        Ok(vars) => {
            debug!(path = %path.display(), count = vars.len(), "Loaded env file");
            vars
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not parse env file");
            HashMap::new()
        }
    }
}
