// Handler writer: owns the generated output directory
use futures::future::try_join_all;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use crate::descriptor::RenderedHandler;
use crate::error::{GenerationError, Result, WrapError};

#[derive(Debug, Clone)]
pub struct HandlerWriter {
    output_dir: PathBuf,
}

impl HandlerWriter {
    /// Writer for `<service_path>/<handlers_dir>`
    pub fn new(service_path: &Path, handlers_dir: &str) -> Self {
        Self {
            output_dir: service_path.join(handlers_dir),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Remove the output directory and everything in it. Returns whether
    /// anything was removed; an absent directory is not an error.
    pub async fn clean(&self) -> Result<bool> {
        match fs::remove_dir_all(&self.output_dir).await {
            Ok(()) => {
                info!(path = %self.output_dir.display(), "Removed handlers directory");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WrapError::Io(e)),
        }
    }

    /// Create the output directory. An existing directory is fine; anything
    /// else in the way, or any other failure, is fatal.
    pub async fn prepare(&self) -> Result<()> {
        let failure = |error: String| {
            WrapError::Generation(Box::new(GenerationError::OutputDirectory {
                path: self.output_dir.clone(),
                error,
            }))
        };

        match fs::create_dir_all(&self.output_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let is_dir = fs::metadata(&self.output_dir)
                    .await
                    .map(|metadata| metadata.is_dir())
                    .unwrap_or(false);
                if is_dir {
                    Ok(())
                } else {
                    Err(failure(e.to_string()))
                }
            }
            Err(e) => Err(failure(e.to_string())),
        }
    }

    /// Create the directory once, then write every handler concurrently.
    /// Returns the written paths in input order.
    pub async fn write_all(&self, handlers: &[RenderedHandler]) -> Result<Vec<PathBuf>> {
        self.prepare().await?;

        let writes = handlers.iter().map(|handler| {
            let path = self.output_dir.join(&handler.file_name);
            async move {
                fs::write(&path, &handler.source).await.map_err(|e| {
                    WrapError::Generation(Box::new(GenerationError::WriteFailed {
                        path: path.clone(),
                        error: e.to_string(),
                    }))
                })?;
                debug!(function = %handler.key, path = %path.display(), "Wrote handler");
                Ok::<PathBuf, WrapError>(path)
            }
        });

        try_join_all(writes).await
    }
}
