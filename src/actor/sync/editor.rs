//! Editor event policy.
//!
//! Object-structure commands go out only while the game runs in edit mode;
//! variable pushes only need it running. Anything the game cannot apply on
//! its own becomes a restart request.

use std::path::Path;
use std::time::Duration;

use crate::actor::messages::{EditorEvent, ExclusionChange};
use crate::live::LiveError;
use crate::live::dto::{ApplyState, UpdateStateCategory};
use crate::session::Session;
use crate::utils::path::resolve_path;

/// How long the generated code file of a new entity is ignored.
const ENTITY_CODE_IGNORE: Duration = Duration::from_secs(5);

pub(super) async fn handle(session: &Session, event: EditorEvent) {
    crate::debug!("editor"; "{}", event.name());
    let state = &session.state;
    let dispatcher = &session.dispatcher;

    match event {
        // ------------------------------------------------------------------
        // object structure
        // ------------------------------------------------------------------
        EditorEvent::ObjectsAdded { objects } => {
            if state.accepts_edits()
                && let Err(e) = dispatcher.add_objects(objects).await
            {
                escalate(session, "AddObjects", &e);
            }
        }

        EditorEvent::ObjectsRemoved {
            element_names,
            object_names,
        } => {
            if !state.accepts_edits() {
                return;
            }
            let shown = object_names.join(", ");
            match dispatcher.remove_objects(element_names, object_names).await {
                Ok(Some(response)) if response.is_out_of_sync() => {
                    session
                        .orchestrator
                        .request_restart(format!("{shown} could not be removed"));
                }
                Ok(Some(_)) => {}
                // paused in a debugger, most likely
                Ok(None) => crate::debug!("sync"; "no remove result for {}", shown),
                Err(e) => escalate(session, "RemoveObjects", &e),
            }
        }

        EditorEvent::ObjectReordered(reorder) => {
            if state.accepts_edits()
                && let Err(e) = dispatcher.reorder(reorder).await
            {
                escalate(session, "ReorderObject", &e);
            }
        }

        EditorEvent::ObjectsMovedToContainer { changes } => {
            if state.accepts_edits()
                && let Err(e) = dispatcher.move_objects(changes).await
            {
                escalate(session, "MoveObjectsToContainer", &e);
            }
        }

        EditorEvent::EntityCreated {
            entity,
            custom_code_file,
        } => {
            if !state.accepts_edits() {
                return;
            }
            if let Some(path) = custom_code_file {
                session
                    .suppressor
                    .register_ignore_for(resolve(session, &path), ENTITY_CODE_IGNORE);
            }
            match dispatcher.create_entity(entity).await {
                Ok(()) => repush(session).await,
                Err(e) => escalate(session, "CreateEntity", &e),
            }
        }

        EditorEvent::ScreenCreated { name } => {
            session
                .orchestrator
                .request_restart(format!("New screen {name}"));
        }

        // ------------------------------------------------------------------
        // variables and states
        // ------------------------------------------------------------------
        EditorEvent::ObjectVariableChanged(assignment)
        | EditorEvent::ElementVariableChanged(assignment) => {
            if state.is_running()
                && let Err(e) = dispatcher.set_variables(vec![assignment]).await
            {
                escalate(session, "SetVariables", &e);
            }
        }

        EditorEvent::VariableAdded {
            element_name_game,
            variable,
            is_tunneled,
        } => {
            if !is_tunneled {
                // no runtime hook for a brand-new variable
                session
                    .orchestrator
                    .request_restart(format!("New variable added to {element_name_game}"));
            } else if state.is_running()
                && let Err(e) = dispatcher.add_variable(element_name_game, variable).await
            {
                escalate(session, "AddVariable", &e);
            }
        }

        EditorEvent::StateCreated(create) => {
            if state.is_running()
                && let Err(e) = dispatcher.create_state(create).await
            {
                escalate(session, "CreateState", &e);
            }
        }

        EditorEvent::StateVariableChanged {
            element_name_game,
            category_name,
            state_name,
            state: state_value,
            variable_name,
        } => {
            if !state.is_running() {
                return;
            }
            let apply = ApplyState {
                element_name_game,
                category_name,
                state: state_value,
                changed_variable: variable_name,
            };
            if let Err(e) = dispatcher.apply_state(apply).await {
                escalate(session, "ApplyState", &e);
                return;
            }

            let is_current = state
                .last_pushed_selection()
                .is_some_and(|s| s.state_name.as_deref() == Some(state_name.as_str()));
            if state.is_edit_mode() && is_current {
                repush(session).await;
            }
        }

        EditorEvent::CategoryExcludedVariablesChanged {
            element_name_game,
            category,
            change,
        } => match change {
            ExclusionChange::Excluded => {
                session
                    .orchestrator
                    .request_restart(format!("Variable excluded from a category of {element_name_game}"));
            }
            ExclusionChange::Included => {
                let update = UpdateStateCategory {
                    element_name_game,
                    category,
                };
                if state.is_running()
                    && let Err(e) = dispatcher.update_state_category(update).await
                {
                    escalate(session, "UpdateStateCategory", &e);
                }
            }
        },

        // ------------------------------------------------------------------
        // selection
        // ------------------------------------------------------------------
        EditorEvent::Selected(request) => {
            if state.take_ignore_next_select() {
                crate::debug!("select"; "ignoring selection of {}", request.element_name);
                return;
            }
            if state.accepts_edits()
                && let Err(e) = session.reconciler.push(&request).await
            {
                crate::debug!("select"; "push failed: {}", e);
            }
        }

        EditorEvent::SubIndexSelected { index } => {
            if state.accepts_edits()
                && let Err(e) = dispatcher.select_sub_index(index).await
            {
                crate::debug!("select"; "sub index push failed: {}", e);
            }
        }

        EditorEvent::IgnoreNextSelect => state.set_ignore_next_select(),

        // ------------------------------------------------------------------
        // suppression
        // ------------------------------------------------------------------
        EditorEvent::IgnoreChange { path, times } => {
            session
                .suppressor
                .register_ignore(resolve(session, &path), times);
        }

        EditorEvent::IgnoreChangeUntil { path, seconds } => {
            // Out-of-range seconds mean "for a long time"; the suppressor caps it
            let duration =
                Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX);
            session
                .suppressor
                .register_ignore_for(resolve(session, &path), duration);
        }

        // ------------------------------------------------------------------
        // session
        // ------------------------------------------------------------------
        EditorEvent::SetEditMode { enabled } => {
            state.set_edit_mode(enabled);
            if state.is_running()
                && let Err(e) = dispatcher.set_edit_mode(enabled).await
            {
                crate::log!("sync"; "could not switch edit mode: {}", e);
            }
        }

        EditorEvent::SetAutoRestart { enabled } => state.set_auto_restart(enabled),

        EditorEvent::ProjectClosed => session.reset(),
    }
}

/// React to a failed command.
///
/// Lost connections and untrustworthy results restart the game; a
/// single timed-out command does not.
fn escalate(session: &Session, kind: &str, err: &LiveError) {
    if !err.escalates_to_restart() {
        crate::debug!("sync"; "{} failed: {}", kind, err);
        return;
    }

    session
        .orchestrator
        .request_restart(format!("{kind} failed: {err}"));
    if matches!(err, LiveError::Transport(_) | LiveError::NotConnected) {
        session.orchestrator.process_lost();
    }
}

async fn repush(session: &Session) {
    if let Err(e) = session.reconciler.repush().await {
        crate::debug!("select"; "re-push failed: {}", e);
    }
}

/// Editor paths are relative to the watched root.
fn resolve(session: &Session, path: &Path) -> std::path::PathBuf {
    resolve_path(path, &session.config().watch.root)
}
