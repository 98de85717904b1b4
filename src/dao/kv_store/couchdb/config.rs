use std::env;

use super::error::{CouchDaoError, CouchResult};

const BASE_URL_ENV: &str = "COUCH_BASE_URL";
const USERNAME_ENV: &str = "COUCH_USERNAME";
const PASSWORD_ENV: &str = "COUCH_PASSWORD";

/// Where one key-value namespace lives: a server and a database on it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    pub base_url: String,
    pub database: String,
    /// Basic-auth credentials, sent only when both parts are known.
    pub credentials: Option<(String, String)>,
}

impl CouchConfig {
    pub fn new(base_url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            database: database.into(),
            credentials: None,
        }
    }

    /// Read the server from `COUCH_BASE_URL` and the database from `database_var`.
    ///
    /// The mods and images namespaces share a server but use separate
    /// databases, hence the variable name parameter.
    pub fn from_env(database_var: &'static str) -> CouchResult<Self> {
        let base_url = required(BASE_URL_ENV)?;
        let database = required(database_var)?;

        let mut config = Self::new(base_url, database);
        if let (Ok(username), Ok(password)) = (env::var(USERNAME_ENV), env::var(PASSWORD_ENV)) {
            config.credentials = Some((username, password));
        }
        Ok(config)
    }
}

fn required(var: &'static str) -> CouchResult<String> {
    env::var(var).map_err(|_| CouchDaoError::MissingEnvVar { var })
}
