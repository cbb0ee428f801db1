use config::{Config, Environment as EnvSource, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JWTSettings,
    pub superadmin: Option<SuperadminSettings>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub name: String,
    #[serde(default)]
    pub require_ssl: bool,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct JWTSettings {
    pub secret: SecretString,
    pub expiry_hours: u64,
}

// Seeded at startup when present so a fresh deployment has someone to
// approve account requests.
#[derive(Deserialize, Debug, Clone)]
pub struct SuperadminSettings {
    pub email: String,
    pub name: String,
    pub password: SecretString,
}

fn default_max_connections() -> u32 {
    10
}

fn default_run_migrations() -> bool {
    true
}

impl DatabaseSettings {
    fn ssl_mode(&self) -> &'static str {
        if self.require_ssl {
            "require"
        } else {
            "prefer"
        }
    }

    // Url of the server itself, used to create databases
    pub fn get_database_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/postgres?sslmode={}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.ssl_mode()
        )
    }

    // Url of the application database
    pub fn get_database_table_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.name,
            self.ssl_mode()
        )
    }
}

pub enum AppEnvironment {
    Local,
    Production,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Local => "local",
            AppEnvironment::Production => "production",
        }
    }
}

impl TryFrom<String> for AppEnvironment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

impl Settings {
    pub fn get() -> Self {
        Self::try_get().expect("Failed to get configuration")
    }

    pub fn try_get() -> Result<Self, anyhow::Error> {
        let base_path = std::env::current_dir()?;
        let configuration_directory = base_path.join("configuration");

        let environment: AppEnvironment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let settings = Config::builder()
            .add_source(File::from(configuration_directory.join("base.yaml")))
            .add_source(
                File::from(configuration_directory.join(format!("{}.yaml", environment.as_str())))
                    .required(false),
            )
            .add_source(
                EnvSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }
}
