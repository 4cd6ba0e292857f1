use std::path::{Path, PathBuf};

/// The `.env` next to this crate's manifest, whatever the working directory.
pub fn default_env_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(".env")
}

/// What happened to the env file. Nothing here is fatal.
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, dotenvy::Error),
}

impl EnvFile {
    /// Reported after tracing is up, since loading happens before it.
    pub fn log(&self) {
        match self {
            EnvFile::Loaded(path) => tracing::info!("loaded environment from {}", path.display()),
            EnvFile::Missing(path) => {
                tracing::warn!("no env file at {}, using process environment", path.display())
            }
            EnvFile::Invalid(path, err) => {
                tracing::warn!("cannot fully read env file {}: {err}", path.display())
            }
        }
    }
}

/// Load the env file into the process environment without overriding
/// variables that are already set.
pub async fn init_env(path: Option<&Path>) -> EnvFile {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_env_file);

    match dotenvy::from_path(&path) {
        Ok(()) => EnvFile::Loaded(path),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            EnvFile::Missing(path)
        }
        Err(err) => EnvFile::Invalid(path, err),
    }
}
