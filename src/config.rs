use crate::components::views::types::Action as ViewAction;
use crate::types::Action as AppAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub keybindings: Keybindings,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AccountConfig {
    #[serde(default)]
    pub id: String,
    pub community: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    Http {
        endpoint: String,
        token: Option<String>,
    },
    Local {
        dir: Option<PathBuf>,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Local { dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UploadConfig {
    pub concurrency: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Keybindings {
    #[serde(default)]
    pub global: HashMap<Key, GlobalAction>,
    #[serde(default)]
    pub view: HashMap<Key, ViewKeyAction>,
}

impl Config {
    /// Fill in default bindings for every key the config file leaves unset.
    pub fn set_default_keybindings(&mut self) {
        let global = [
            (Key::ctrl('c'), GlobalAction::Quit),
            (Key::ctrl('q'), GlobalAction::Quit),
            (Key::ctrl('z'), GlobalAction::Suspend),
        ];
        for (key, action) in global {
            self.keybindings.global.entry(key).or_insert(action);
        }
        let view = [
            (Key::ctrl('n'), ViewKeyAction::NextItem),
            (Key::ctrl('p'), ViewKeyAction::PrevItem),
            (Key(KeyCode::Tab, None), ViewKeyAction::NextInput),
            (Key(KeyCode::BackTab, None), ViewKeyAction::PrevInput),
            (
                Key(KeyCode::BackTab, Some(KeyModifiers::SHIFT)),
                ViewKeyAction::PrevInput,
            ),
            (Key(KeyCode::Down, None), ViewKeyAction::NextItem),
            (Key(KeyCode::Up, None), ViewKeyAction::PrevItem),
            (Key(KeyCode::Enter, None), ViewKeyAction::Enter),
            (Key::ctrl('m'), ViewKeyAction::Enter),
            (Key(KeyCode::Esc, None), ViewKeyAction::Back),
            (Key(KeyCode::Delete, None), ViewKeyAction::Remove),
            (Key(KeyCode::Char('d'), None), ViewKeyAction::Remove),
            (Key::ctrl('s'), ViewKeyAction::Submit),
            (Key(KeyCode::Char('n'), None), ViewKeyAction::NewThread),
        ];
        for (key, action) in view {
            self.keybindings.view.entry(key).or_insert(action);
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Key(KeyCode, Option<KeyModifiers>);

impl Key {
    fn ctrl(c: char) -> Self {
        Self(KeyCode::Char(c), Some(KeyModifiers::CONTROL))
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self(
            event.code,
            match event.modifiers {
                KeyModifiers::CONTROL | KeyModifiers::SHIFT => Some(event.modifiers),
                _ => None,
            },
        )
    }
}

const NAMED_KEYS: [(&str, KeyCode); 8] = [
    ("Enter", KeyCode::Enter),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Delete", KeyCode::Delete),
    ("Backspace", KeyCode::Backspace),
];

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let code = match self.0 {
            KeyCode::Char(c) => c.to_string(),
            code => match NAMED_KEYS.iter().find(|(_, k)| *k == code) {
                Some((name, _)) => name.to_string(),
                None => return Err(serde::ser::Error::custom("invalid key code")),
            },
        };
        match self.1 {
            Some(modifier) => {
                let modifier = match modifier {
                    KeyModifiers::CONTROL => "Ctrl",
                    KeyModifiers::SHIFT => "Shift",
                    _ => return Err(serde::ser::Error::custom("invalid key modifier")),
                };
                format!("{modifier}-{code}").serialize(serializer)
            }
            None => code.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        fn code<E: serde::de::Error>(s: &str) -> Result<KeyCode, E> {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Ok(KeyCode::Char(c));
            }
            NAMED_KEYS
                .iter()
                .find(|(name, _)| *name == s)
                .map(|(_, code)| *code)
                .ok_or_else(|| E::custom("invalid key"))
        }

        let s = String::deserialize(deserializer)?;
        match s.split_once('-') {
            Some((modifier, rest)) if !rest.is_empty() => Ok(Self(
                code(rest)?,
                match modifier {
                    "Ctrl" => Some(KeyModifiers::CONTROL),
                    "Shift" => Some(KeyModifiers::SHIFT),
                    _ => return Err(serde::de::Error::custom("invalid key modifier")),
                },
            )),
            _ => Ok(Self(code(&s)?, None)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Suspend,
}

impl From<&GlobalAction> for AppAction {
    fn from(action: &GlobalAction) -> Self {
        match action {
            GlobalAction::Quit => AppAction::Quit,
            GlobalAction::Suspend => AppAction::Suspend,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ViewKeyAction {
    NextItem,
    PrevItem,
    NextInput,
    PrevInput,
    Enter,
    Back,
    Remove,
    Submit,
    NewThread,
}

impl From<&ViewKeyAction> for ViewAction {
    fn from(action: &ViewKeyAction) -> Self {
        match action {
            ViewKeyAction::NextItem => ViewAction::NextItem,
            ViewKeyAction::PrevItem => ViewAction::PrevItem,
            ViewKeyAction::NextInput => ViewAction::NextInput,
            ViewKeyAction::PrevInput => ViewAction::PrevInput,
            ViewKeyAction::Enter => ViewAction::Enter,
            ViewKeyAction::Back => ViewAction::Back,
            ViewKeyAction::Remove => ViewAction::Remove,
            ViewKeyAction::Submit => ViewAction::Submit,
            ViewKeyAction::NewThread => ViewAction::NewThread,
        }
    }
}
