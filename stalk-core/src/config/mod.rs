use crate::error::AppError;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Resolve `<crate_dir>/config`, whether the process runs from the
/// workspace root or from inside the crate directory.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("cannot read current dir: {}", e)))?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

/// Load `base.yaml` for the given crate, overlaid by `APP_` environment
/// variables (`APP_API__BASE_URL` sets `api.base_url`).
pub fn load<T: DeserializeOwned>(crate_dir: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let directory = configuration_directory(crate_dir)?;

    let settings = config::Config::builder()
        .add_source(config::File::from(directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}
