//! File batch policy.
//!
//! ```text
//! relive.toml        → reload config
//! code file          → full restart
//! content file       → (settle) ForceReloadFile | RestartScreen [+ ReloadGlobalContent]
//!                      nothing sent → full restart
//! project file       → left to the editor
//! ```

use std::path::Path;
use std::time::Duration;

use crate::actor::fs::{ChangeKind, FileChange, FileClass};
use crate::config::SessionConfig;
use crate::live::dto::ForceReloadFile;
use crate::session::Session;
use crate::utils::path::stripped_name;

/// Extra wait before asking for a global content reload.
const GLOBAL_CONTENT_SETTLE: Duration = Duration::from_millis(500);

struct ContentChange<'a> {
    change: &'a FileChange,
    global: bool,
    reloadable: bool,
    localization: bool,
}

pub(super) async fn handle_batch(session: &Session, batch: Vec<FileChange>) {
    let config = session.config();

    if batch.iter().any(|c| config.is_config_file(&c.path)) {
        match session.reload_config() {
            Ok(true) => {}
            Ok(false) => crate::debug!("config"; "unchanged"),
            Err(e) => crate::logger::status_error("Config reload failed", &format!("{e:#}")),
        }
    }

    if !should_act(session, &config) {
        crate::debug!("sync"; "not running in edit mode, ignoring {} change(s)", batch.len());
        return;
    }

    let mut content = Vec::new();
    for change in &batch {
        let shown = display(&config, &change.path);
        match FileClass::of(&change.path, &config) {
            FileClass::Ignored | FileClass::Config | FileClass::Other => {}
            FileClass::Project => {
                crate::debug!("sync"; "{} {}, left to the editor", shown, change.kind.label());
            }
            FileClass::Code => {
                session
                    .orchestrator
                    .request_restart(format!("File {shown} changed"));
            }
            FileClass::Content {
                global,
                reloadable,
                localization,
            } => content.push(ContentChange {
                change,
                global,
                reloadable,
                localization,
            }),
        }
    }

    if content.is_empty() {
        return;
    }

    // let copies into the content folder finish
    tokio::time::sleep(config.live.copy_settle()).await;
    for item in content {
        handle_content(session, &config, item).await;
    }
}

/// Content changes matter in edit mode, in auto restart, or when asked to.
fn should_act(session: &Session, config: &SessionConfig) -> bool {
    session.state.is_auto_restart()
        || session.state.accepts_edits()
        || config.restart.restart_screen_on_content_change
}

async fn handle_content(session: &Session, config: &SessionConfig, item: ContentChange<'_>) {
    let path = &item.change.path;
    let shown = display(config, path);
    let dispatcher = &session.dispatcher;
    let mut handled = false;

    if session.state.is_running() {
        if item.reloadable && item.change.kind != ChangeKind::Deleted {
            let reload = ForceReloadFile {
                elements_containing_file: Vec::new(),
                load_in_global_content: item.global,
                is_localization_database: item.localization,
                file_relative_to_project: shown.clone(),
                stripped_file_name: stripped_name(path),
            };
            handled = report(dispatcher.force_reload_file(reload).await, "ForceReloadFile");
            if item.localization {
                report(dispatcher.restart_screen(false).await, "RestartScreen");
            }
        } else {
            handled = report(dispatcher.restart_screen(item.global).await, "RestartScreen");
        }

        if item.global {
            tokio::time::sleep(GLOBAL_CONTENT_SETTLE).await;
            handled |= report(
                dispatcher.reload_global_content(stripped_name(path)).await,
                "ReloadGlobalContent",
            );
        }
    }

    if handled {
        crate::log!("sync"; "reloaded {}", shown);
    } else {
        session
            .orchestrator
            .request_restart(format!("File {shown} changed"));
    }
}

fn report(result: Result<(), crate::live::LiveError>, kind: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            crate::debug!("sync"; "{} failed: {}", kind, e);
            false
        }
    }
}

/// Root-relative path with `/` separators.
fn display(config: &SessionConfig, path: &Path) -> String {
    config
        .root_relative(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
