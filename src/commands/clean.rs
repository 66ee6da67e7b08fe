// Clean command: remove generated handlers
use crate::commands::run::CommandContext;
use crate::error::Result;
use crate::logging::{Notice, NoticeLog};

/// Result of a cleanup
#[derive(Debug)]
pub struct CleanupResult {
    pub removed: bool,
    pub notices: Vec<Notice>,
}

/// Delete the handlers directory configured in the service manifest
pub async fn execute_clean_command(context: &CommandContext) -> Result<CleanupResult> {
    let plugin = context.load_plugin()?;
    let mut log = NoticeLog::new();
    let removed = plugin.cleanup(&mut log).await?;
    Ok(CleanupResult {
        removed,
        notices: log.into_vec(),
    })
}
