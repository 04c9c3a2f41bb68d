use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_users::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

/// Application configuration, composed from the shared config components.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// `USERS_COLLECTION`, default `users`
    pub users_collection: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            users_collection: env_or_default("USERS_COLLECTION", DEFAULT_COLLECTION),
        })
    }
}
