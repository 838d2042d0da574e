//! Keyboard shortcuts for waterfall navigation.
//!
//! Maps `egui` key presses to [`NavAction`]s and runs them against a
//! [`ScrollNavigator`]. The default layout follows the trace viewer
//! convention: `s`/`w` page down/up, `f`/`b` jump to the next/previous
//! visible span, `Home` jumps to the first one.

use crate::config::KeyBindingConfig;
use crate::error::NavError;
use crate::navigator::ScrollNavigator;
use anyhow::{anyhow, Result};
use egui::{Event, Key, Modifiers};
use std::collections::HashMap;

/// A navigation command bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavAction {
    PageDown,
    PageUp,
    NextVisibleSpan,
    PrevVisibleSpan,
    FirstVisibleSpan,
}

impl NavAction {
    pub const ALL: [NavAction; 5] = [
        NavAction::PageDown,
        NavAction::PageUp,
        NavAction::NextVisibleSpan,
        NavAction::PrevVisibleSpan,
        NavAction::FirstVisibleSpan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NavAction::PageDown => "page_down",
            NavAction::PageUp => "page_up",
            NavAction::NextVisibleSpan => "next_visible_span",
            NavAction::PrevVisibleSpan => "prev_visible_span",
            NavAction::FirstVisibleSpan => "first_visible_span",
        }
    }
}

/// Key to action table.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    bindings: HashMap<Key, NavAction>,
}

impl KeyBindings {
    /// Builds bindings from key names. Unknown names are an error; a key named
    /// for two actions keeps the later one.
    pub fn from_config(config: &KeyBindingConfig) -> Result<Self> {
        let mut bindings = HashMap::new();
        for action in NavAction::ALL {
            let names = match action {
                NavAction::PageDown => &config.page_down,
                NavAction::PageUp => &config.page_up,
                NavAction::NextVisibleSpan => &config.next_visible_span,
                NavAction::PrevVisibleSpan => &config.prev_visible_span,
                NavAction::FirstVisibleSpan => &config.first_visible_span,
            };
            for name in names {
                let key = Key::from_name(name)
                    .ok_or_else(|| anyhow!("Unknown key '{}' bound to {}", name, action.name()))?;
                bindings.insert(key, action);
            }
        }
        Ok(Self { bindings })
    }

    /// Returns the action for a key press. Presses with Ctrl, Alt or Cmd held
    /// are left to the host.
    pub fn action_for(&self, key: Key, modifiers: Modifiers) -> Option<NavAction> {
        if modifiers.ctrl || modifiers.alt || modifiers.command || modifiers.mac_cmd {
            return None;
        }
        self.bindings.get(&key).copied()
    }

    /// Keys bound to an action, sorted by name.
    pub fn keys_for(&self, action: NavAction) -> Vec<Key> {
        let mut keys: Vec<Key> = self
            .bindings
            .iter()
            .filter(|(_, &bound)| bound == action)
            .map(|(&key, _)| key)
            .collect();
        keys.sort_by_key(|key| key.name());
        keys
    }

    /// Collects actions for the key presses in a frame's input events.
    pub fn actions_from_events(&self, events: &[Event]) -> Vec<NavAction> {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Key { key, pressed: true, modifiers, .. } => self.action_for(*key, *modifiers),
                _ => None,
            })
            .collect()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            (Key::S, NavAction::PageDown),
            (Key::W, NavAction::PageUp),
            (Key::F, NavAction::NextVisibleSpan),
            (Key::B, NavAction::PrevVisibleSpan),
            (Key::Home, NavAction::FirstVisibleSpan),
        ];
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

/// Runs one action against the navigator.
pub fn dispatch(navigator: &ScrollNavigator, action: NavAction) -> Result<(), NavError> {
    match action {
        NavAction::PageDown => navigator.scroll_page_down(),
        NavAction::PageUp => navigator.scroll_page_up(),
        NavAction::NextVisibleSpan => navigator.scroll_to_next_visible_span()?,
        NavAction::PrevVisibleSpan => navigator.scroll_to_prev_visible_span()?,
        NavAction::FirstVisibleSpan => navigator.scroll_to_first_visible_span()?,
    }
    Ok(())
}

/// Looks up and runs the action for a key press, returning the action taken.
pub fn handle_key(
    navigator: &ScrollNavigator,
    bindings: &KeyBindings,
    key: Key,
    modifiers: Modifiers,
) -> Result<Option<NavAction>, NavError> {
    let Some(action) = bindings.action_for(key, modifiers) else {
        return Ok(None);
    };
    tracing::debug!(action = action.name(), "key shortcut");
    dispatch(navigator, action)?;
    Ok(Some(action))
}
