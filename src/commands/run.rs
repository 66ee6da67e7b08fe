// Run and hook commands: load the manifest, drive the plugin, persist the result
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CliError, Result, WrapError};
use crate::lifecycle::{HookAction, LifecycleEvent};
use crate::logging::utils;
use crate::manifest::ServiceManifest;
use crate::plugin::{HookOutcome, RunOutcome, WrapPlugin};

/// Paths shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub service_path: PathBuf,
    pub manifest_path: PathBuf,
}

impl CommandContext {
    /// `manifest` is taken relative to `service_path` unless absolute
    pub fn new(service_path: impl Into<PathBuf>, manifest: impl AsRef<Path>) -> Self {
        let service_path = service_path.into();
        let manifest_path = service_path.join(manifest.as_ref());
        Self {
            service_path,
            manifest_path,
        }
    }

    pub fn load_plugin(&self) -> Result<WrapPlugin> {
        let manifest = {
            let _span = utils::manifest_loading_span(&self.manifest_path).entered();
            ServiceManifest::from_file(&self.manifest_path)?
        };
        debug!(functions = manifest.functions().len(), "Loaded manifest");
        Ok(WrapPlugin::new(&self.service_path, manifest))
    }

    /// Refuse to write the rewritten manifest over its own input
    pub fn check_output(&self, output: Option<&Path>) -> Result<()> {
        let Some(output) = output else {
            return Ok(());
        };

        if same_file(&self.manifest_path, output) {
            return Err(WrapError::Cli(Box::new(CliError::ConflictingArguments {
                first: "--config".to_string(),
                second: "--output".to_string(),
                suggestion: "Write the rewritten manifest to a separate file; rewriting the \
                             input would wrap the generated handlers again on the next run"
                    .to_string(),
            })));
        }
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Write the manifest to `output`, or to stdout when no file is given
pub fn persist_manifest(manifest: &ServiceManifest, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            manifest.write_to(path)?;
            info!(path = %path.display(), "Wrote rewritten manifest");
        }
        None => {
            let yaml = manifest.to_yaml()?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(yaml.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Wrap the service's functions and persist the resulting manifest
pub async fn execute_run_command(
    context: &CommandContext,
    output: Option<&Path>,
) -> Result<RunOutcome> {
    context.check_output(output)?;
    let mut plugin = context.load_plugin()?;
    let outcome = plugin.run().await?;
    persist_manifest(plugin.manifest(), output)?;
    Ok(outcome)
}

/// Invoke the hook registered for `event`. Only run hooks produce a manifest.
pub async fn execute_hook_command(
    context: &CommandContext,
    event: LifecycleEvent,
    output: Option<&Path>,
) -> Result<HookOutcome> {
    if event.action() == HookAction::Run {
        context.check_output(output)?;
    }

    let mut plugin = context.load_plugin()?;
    let outcome = plugin.handle(event).await?;
    if matches!(outcome, HookOutcome::Run(_)) {
        persist_manifest(plugin.manifest(), output)?;
    }
    Ok(outcome)
}
