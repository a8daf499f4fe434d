//! Selection reconciler.
//!
//! Remembers what the game's inspector was last told to show and decides
//! how to get it to show the next selection:
//!
//! ```text
//! last: A + state S   next: A, no state   → RestartScreen, then select
//! last: A             next: B             → select (with B's definition)
//! next: abstract A    no concrete derived → skip
//! ```
//!
//! Applying a state in the game cannot be undone, so dropping back to the
//! stateless element needs a fresh screen.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::dispatch::CommandDispatcher;
use super::dto::Selection;
use super::error::LiveError;
use crate::core::SessionState;

/// A selection as the editor reports it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionRequest {
    pub element_name: String,
    /// Abstract elements cannot be instantiated by the game.
    pub is_abstract: bool,
    /// Concrete elements deriving from `element_name`, best candidate first.
    pub derived_elements: Vec<String>,
    /// Element definition, sent along when the selected element changes.
    pub definition: Option<Value>,
    pub named_object_names: Vec<String>,
    pub state_name: Option<String>,
    pub state_category_name: Option<String>,
    pub bring_into_focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Nothing the game could show.
    Skipped,
    Pushed { reloaded_screen: bool },
}

pub struct Reconciler {
    dispatcher: Arc<CommandDispatcher>,
    state: Arc<SessionState>,
}

impl Reconciler {
    pub fn new(dispatcher: Arc<CommandDispatcher>, state: Arc<SessionState>) -> Self {
        Self { dispatcher, state }
    }

    /// Push `request` to the live process.
    ///
    /// `last_pushed_selection` only moves when the game accepted the push.
    pub async fn push(&self, request: &SelectionRequest) -> Result<PushOutcome, LiveError> {
        let Some(mut selection) = Self::resolve(request) else {
            crate::debug!("select"; "no concrete element for {}, skipping", request.element_name);
            return Ok(PushOutcome::Skipped);
        };

        let last = self.state.last_pushed_selection();
        let same_element = last
            .as_ref()
            .is_some_and(|last| last.element_name_glue == selection.element_name_glue);
        let needs_screen_reload = same_element
            && last.as_ref().is_some_and(Selection::has_state)
            && !selection.has_state();

        if !same_element {
            selection.element = request.definition.clone();
        }

        if needs_screen_reload {
            crate::debug!("select"; "state cleared on {}, reloading screen", selection.element_name_glue);
            self.dispatcher.restart_screen(false).await?;
        }

        self.dispatcher.select(selection.clone()).await?;
        if same_element {
            // keep the definition around for re-pushes
            selection.element = last.and_then(|last| last.element);
        }
        self.state.set_last_pushed_selection(Some(selection));

        Ok(PushOutcome::Pushed {
            reloaded_screen: needs_screen_reload,
        })
    }

    /// Send the last pushed selection again (e.g. after the game rebuilt
    /// the selected object).
    pub async fn repush(&self) -> Result<bool, LiveError> {
        let Some(selection) = self.state.last_pushed_selection() else {
            return Ok(false);
        };
        self.dispatcher.select(selection).await?;
        Ok(true)
    }

    /// The live process forgot what it showed (relaunch, project closed).
    pub fn forget(&self) {
        self.state.set_last_pushed_selection(None);
    }

    fn resolve(request: &SelectionRequest) -> Option<Selection> {
        let backup = if request.is_abstract {
            Some(request.derived_elements.first()?.clone())
        } else {
            None
        };

        Some(Selection {
            element_name_glue: request.element_name.clone(),
            backup_element_name_glue: backup,
            element: None,
            named_object_names: request.named_object_names.clone(),
            state_name: request.state_name.clone(),
            state_category_name: request.state_category_name.clone(),
            bring_into_focus: request.bring_into_focus,
        })
    }
}
