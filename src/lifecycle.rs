// Host lifecycle events and the action each one triggers
use std::fmt;
use std::str::FromStr;

use crate::error::{CliError, WrapError};

/// Packaging stages the plugin hooks into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    AfterPackageInitialize,
    BeforeDeployFunctionPackage,
    BeforeInvokeLocal,
    BeforeOfflineStart,
    BeforeStepFunctionsOfflineStart,
    AfterPackageCreateArtifacts,
    AfterInvokeLocal,
    CleanCommand,
    RunCommand,
    AfterDeploy,
}

/// What a lifecycle event asks the plugin to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookAction {
    /// Generate wrappers and rewrite the manifest
    Run,
    /// Remove the generated output directory
    Cleanup,
    /// Point the user at the monitoring dashboard
    Link,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::AfterPackageInitialize => "after:package:initialize",
            LifecycleEvent::BeforeDeployFunctionPackage => "before:deploy:function:packageFunction",
            LifecycleEvent::BeforeInvokeLocal => "before:invoke:local:invoke",
            LifecycleEvent::BeforeOfflineStart => "before:offline:start:init",
            LifecycleEvent::BeforeStepFunctionsOfflineStart => "before:step-functions-offline:start",
            LifecycleEvent::AfterPackageCreateArtifacts => "after:package:createDeploymentArtifacts",
            LifecycleEvent::AfterInvokeLocal => "after:invoke:local:invoke",
            LifecycleEvent::CleanCommand => "epsagon:clean:init",
            LifecycleEvent::RunCommand => "epsagon:run:init",
            LifecycleEvent::AfterDeploy => "after:deploy:deploy",
        }
    }

    /// Every event the plugin registers for
    pub fn all() -> Vec<LifecycleEvent> {
        vec![
            LifecycleEvent::AfterPackageInitialize,
            LifecycleEvent::BeforeDeployFunctionPackage,
            LifecycleEvent::BeforeInvokeLocal,
            LifecycleEvent::BeforeOfflineStart,
            LifecycleEvent::BeforeStepFunctionsOfflineStart,
            LifecycleEvent::AfterPackageCreateArtifacts,
            LifecycleEvent::AfterInvokeLocal,
            LifecycleEvent::CleanCommand,
            LifecycleEvent::RunCommand,
            LifecycleEvent::AfterDeploy,
        ]
    }

    pub fn action(&self) -> HookAction {
        match self {
            LifecycleEvent::AfterPackageInitialize
            | LifecycleEvent::BeforeDeployFunctionPackage
            | LifecycleEvent::BeforeInvokeLocal
            | LifecycleEvent::BeforeOfflineStart
            | LifecycleEvent::BeforeStepFunctionsOfflineStart
            | LifecycleEvent::RunCommand => HookAction::Run,
            LifecycleEvent::AfterPackageCreateArtifacts
            | LifecycleEvent::AfterInvokeLocal
            | LifecycleEvent::CleanCommand => HookAction::Cleanup,
            LifecycleEvent::AfterDeploy => HookAction::Link,
        }
    }
}

impl FromStr for LifecycleEvent {
    type Err = WrapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LifecycleEvent::all()
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| {
                WrapError::Cli(Box::new(CliError::UnknownLifecycleEvent {
                    event: s.to_string(),
                    available: LifecycleEvent::all()
                        .iter()
                        .map(|event| event.as_str().to_string())
                        .collect(),
                }))
            })
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
