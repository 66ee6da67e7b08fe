// The packaging plugin: run, cleanup and link over one service manifest
use std::path::{Path, PathBuf};
use tracing::{debug, info, Instrument};

use crate::config::{PluginConfig, ResolvedConfig};
use crate::descriptor::{RenderedHandler, ResolvedFunction};
use crate::discovery::discover_functions;
use crate::error::Result;
use crate::language::{refine_dialects, Language};
use crate::library::check_libraries;
use crate::lifecycle::{HookAction, LifecycleEvent};
use crate::logging::{utils, Notice, NoticeLog};
use crate::manifest::{ServiceManifest, PLUGIN_KEY};
use crate::rewriter::{rewrite_manifest, RewriteSummary};
use crate::template::render_handler;
use crate::validation::BlockScope;
use crate::writer::HandlerWriter;

pub const DASHBOARD_URL: &str = "https://app.epsagon.com/functions";

/// Why a run wrapped nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    MissingToken,
}

/// Everything a wrapping run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub handlers: Vec<RenderedHandler>,
    pub files: Vec<PathBuf>,
    pub rewrite: RewriteSummary,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Skipped {
        reason: SkipReason,
        notices: Vec<Notice>,
    },
    Wrapped(RunReport),
}

impl RunOutcome {
    pub fn notices(&self) -> &[Notice] {
        match self {
            RunOutcome::Skipped { notices, .. } => notices,
            RunOutcome::Wrapped(report) => &report.notices,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, RunOutcome::Wrapped(_))
    }
}

/// Result of one lifecycle hook
#[derive(Debug, Clone)]
pub enum HookOutcome {
    Run(RunOutcome),
    Cleanup { removed: bool, notices: Vec<Notice> },
    Link(Notice),
}

/// The plugin bound to one service. Owns the manifest it rewrites.
#[derive(Debug)]
pub struct WrapPlugin {
    service_path: PathBuf,
    manifest: ServiceManifest,
}

impl WrapPlugin {
    pub fn new(service_path: impl Into<PathBuf>, manifest: ServiceManifest) -> Self {
        Self {
            service_path: service_path.into(),
            manifest,
        }
    }

    pub fn service_path(&self) -> &Path {
        &self.service_path
    }

    pub fn manifest(&self) -> &ServiceManifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> ServiceManifest {
        self.manifest
    }

    /// `custom.epsagon`, with its schema warnings recorded in `log`
    fn global_config(&self, log: &mut NoticeLog) -> Result<PluginConfig> {
        let parsed = PluginConfig::parse_block(
            &format!("custom.{PLUGIN_KEY}"),
            BlockScope::Service,
            self.manifest.plugin_block(),
        )?;
        log.extend(parsed.warnings.into_iter().map(Notice::warning));
        Ok(parsed.config)
    }

    /// Dispatch a lifecycle event to its action
    pub async fn handle(&mut self, event: LifecycleEvent) -> Result<HookOutcome> {
        let span = utils::hook_span(event.as_str());
        async move {
            debug!("Handling lifecycle event");
            match event.action() {
                HookAction::Run => self.run().await.map(HookOutcome::Run),
                HookAction::Cleanup => {
                    let mut log = NoticeLog::new();
                    let removed = self.cleanup(&mut log).await?;
                    Ok(HookOutcome::Cleanup {
                        removed,
                        notices: log.into_vec(),
                    })
                }
                HookAction::Link => Ok(HookOutcome::Link(self.link())),
            }
        }
        .instrument(span)
        .await
    }

    /// Wrap every eligible function: discover, refine dialects, check the
    /// library, render, write, then rewrite the manifest.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let mut log = NoticeLog::new();
        let global = self.global_config(&mut log)?;
        let service = ResolvedConfig::resolve(&global, None);

        if service.disable {
            log.push(Notice::info("Epsagon disabled - not wrapping functions"));
            return Ok(RunOutcome::Skipped {
                reason: SkipReason::Disabled,
                notices: log.into_vec(),
            });
        }
        if service.token.is_none() {
            log.push(Notice::info(
                "No epsagon token was supplied - not wrapping functions",
            ));
            return Ok(RunOutcome::Skipped {
                reason: SkipReason::MissingToken,
                notices: log.into_vec(),
            });
        }

        log.push(Notice::info("Wrapping your functions with Epsagon..."));

        let handlers_dir = service.handlers_dir();
        let writer = HandlerWriter::new(&self.service_path, &handlers_dir);
        writer.clean().await?;

        let discovery = discover_functions(&self.manifest)?;
        log.extend(discovery.notices);
        let functions = refine_dialects(discovery.functions, &self.service_path).await?;
        info!(count = functions.len(), "Functions selected for wrapping");

        let resolved: Vec<ResolvedFunction> = functions
            .into_iter()
            .map(|function| ResolvedFunction::resolve(function, &global, &handlers_dir))
            .collect();

        let languages: Vec<Language> = resolved.iter().map(|function| function.language).collect();
        log.extend(check_libraries(&languages, &self.service_path, &service).await?);

        let handlers = resolved
            .iter()
            .map(render_handler)
            .collect::<Result<Vec<_>>>()?;
        let files = writer.write_all(&handlers).await?;

        let rewrite = rewrite_manifest(&mut self.manifest, &handlers, &handlers_dir);
        info!(
            rewritten = rewrite.rewritten.len(),
            output_dir = %writer.output_dir().display(),
            "Wrapped functions"
        );

        Ok(RunOutcome::Wrapped(RunReport {
            handlers,
            files,
            rewrite,
            notices: log.into_vec(),
        }))
    }

    /// Remove the generated output directory. Returns whether it existed.
    pub async fn cleanup(&self, log: &mut NoticeLog) -> Result<bool> {
        let global = self.global_config(log)?;
        let service = ResolvedConfig::resolve(&global, None);

        log.push(Notice::info("Cleaning up Epsagon's handlers"));
        HandlerWriter::new(&self.service_path, &service.handlers_dir())
            .clean()
            .await
    }

    /// Notice pointing at the monitoring dashboard
    pub fn link(&self) -> Notice {
        let notice = Notice::info(format!(
            "Monitor and troubleshoot your functions at \u{1b}[4m{DASHBOARD_URL}\u{1b}[24m"
        ));
        notice.emit();
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn plugin(dir: &Path, yaml: &str) -> WrapPlugin {
        WrapPlugin::new(dir, ServiceManifest::from_yaml(yaml).unwrap())
    }

    #[tokio::test]
    async fn test_disabled_service_skips() {
        let dir = tempdir().unwrap();
        let mut plugin = plugin(
            dir.path(),
            r#"
custom:
  epsagon:
    token: T1
    disable: "True"
provider:
  runtime: python3.9
functions:
  hello:
    handler: handlers.hello
"#,
        );

        let outcome = plugin.run().await.unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::Skipped {
                reason: SkipReason::Disabled,
                ..
            }
        ));
        assert!(!dir.path().join("epsagon_handlers").exists());
    }

    #[tokio::test]
    async fn test_missing_token_skips() {
        let dir = tempdir().unwrap();
        let mut plugin = plugin(
            dir.path(),
            r#"
provider:
  runtime: python3.9
functions:
  hello:
    handler: handlers.hello
"#,
        );

        let outcome = plugin.run().await.unwrap();
        assert!(!outcome.is_wrapped());
        assert_eq!(
            outcome.notices().last().unwrap().message,
            "No epsagon token was supplied - not wrapping functions"
        );
        assert_eq!(
            plugin.manifest().document()["functions"]["hello"]["handler"].as_str(),
            Some("handlers.hello")
        );
    }

    #[tokio::test]
    async fn test_run_wraps_python() {
        let dir = tempdir().unwrap();
        let mut plugin = plugin(
            dir.path(),
            r#"
custom:
  epsagon:
    token: T1
provider:
  runtime: python3.9
functions:
  hello:
    handler: handlers.hello
"#,
        );

        let RunOutcome::Wrapped(report) = plugin.run().await.unwrap() else {
            panic!("expected a wrapping run");
        };
        assert_eq!(
            report.files,
            vec![dir.path().join("epsagon_handlers/hello-epsagon.py")]
        );
        assert!(report
            .notices
            .iter()
            .any(|notice| notice.message.contains("Python functions found")));
        assert_eq!(
            plugin.manifest().document()["functions"]["hello"]["handler"].as_str(),
            Some("epsagon_handlers/hello-epsagon.hello")
        );
    }

    #[tokio::test]
    async fn test_handle_cleanup_event() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("epsagon_handlers")).unwrap();
        let mut plugin = plugin(dir.path(), "service: demo\n");

        let outcome = plugin
            .handle(LifecycleEvent::AfterPackageCreateArtifacts)
            .await
            .unwrap();
        assert!(matches!(outcome, HookOutcome::Cleanup { removed: true, .. }));
        assert!(!dir.path().join("epsagon_handlers").exists());
    }

    #[tokio::test]
    async fn test_handle_link_event() {
        let dir = tempdir().unwrap();
        let mut plugin = plugin(dir.path(), "service: demo\n");
        let HookOutcome::Link(notice) = plugin.handle(LifecycleEvent::AfterDeploy).await.unwrap()
        else {
            panic!("expected a link notice");
        };
        assert!(notice.message.contains(DASHBOARD_URL));
    }
}
