//! Key sequence encoding.
//!
//! Translates semantic answers (free text, confirm, single select, multi
//! select) into the literal bytes a terminal form interprets as keystrokes.
//! Encoding is pure and happens once, when a question is registered.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

/// Appended to every answer to move to the next question (`\r\n`).
pub const SUBMIT: &[u8] = b"\x0D\x0A";

/// Submit marker for select questions; a trailing newline confuses them.
pub const SELECT_SUBMIT: &[u8] = b"\x0D";

/// Marks or unmarks the option under the cursor.
pub const TOGGLE: &[u8] = b"\x20";

/// Moves the cursor one option down.
pub const ARROW_DOWN: &[u8] = b"\x1b[B";

/// Moves between the two options of a confirm.
pub const ARROW_RIGHT: &[u8] = b"\x1b[C";

/// The control-byte vocabulary of the prompt toolkit being driven.
///
/// The defaults match forms that read ANSI arrow keys, space to toggle and
/// carriage return to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    /// Default submit marker.
    pub submit: Bytes,
    /// Submit marker used by single-select questions.
    pub select_submit: Bytes,
    /// Select/toggle keystroke.
    pub toggle: Bytes,
    /// Cursor-down keystroke.
    pub down: Bytes,
    /// Cursor-right keystroke.
    pub right: Bytes,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            submit: Bytes::from_static(SUBMIT),
            select_submit: Bytes::from_static(SELECT_SUBMIT),
            toggle: Bytes::from_static(TOGGLE),
            down: Bytes::from_static(ARROW_DOWN),
            right: Bytes::from_static(ARROW_RIGHT),
        }
    }
}

impl KeyMap {
    /// Create the default key map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a confirm answer.
    ///
    /// Affirm moves to the right-hand option before toggling; negative
    /// toggles the default left-hand option.
    #[must_use]
    pub fn confirm(&self, answer: Confirm) -> Bytes {
        match answer {
            Confirm::Affirm => {
                let mut out = BytesMut::with_capacity(self.right.len() + self.toggle.len());
                out.put_slice(&self.right);
                out.put_slice(&self.toggle);
                out.freeze()
            }
            Confirm::Negative => self.toggle.clone(),
        }
    }

    /// Encode picking option `index` from a list, starting at the first.
    #[must_use]
    pub fn select(&self, index: usize) -> Bytes {
        Bytes::from(self.down.repeat(index))
    }

    /// Encode picking a set of options from a list.
    ///
    /// Walks every position up to the highest requested index, toggling the
    /// requested ones. The cursor never moves past the last toggled option.
    /// Returns `None` when `indices` is empty.
    #[must_use]
    pub fn multi_select(&self, indices: &[usize]) -> Option<Bytes> {
        let last = *indices.iter().max()?;

        let mut out = BytesMut::new();
        for position in 0..=last {
            if indices.contains(&position) {
                out.put_slice(&self.toggle);
            }
            out.put_slice(&self.down);
        }

        out.truncate(out.len() - self.down.len());
        Some(out.freeze())
    }

    /// Render control bytes in a form that reads well in logs.
    #[must_use]
    pub fn readable(&self, data: &[u8]) -> String {
        let text = String::from_utf8_lossy(data);
        let mut text = text.into_owned();
        for (key, label) in [
            (&self.submit, "<submit>"),
            (&self.down, "<down>"),
            (&self.right, "<right>"),
        ] {
            if let Ok(key) = std::str::from_utf8(key) {
                if !key.is_empty() {
                    text = text.replace(key, label);
                }
            }
        }
        text
    }
}

/// Render control bytes using the default [`KeyMap`].
#[must_use]
pub fn readable(data: &[u8]) -> String {
    KeyMap::default().readable(data)
}

/// The two answers of a confirm question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Confirm {
    /// The "yes" answer.
    Affirm,
    /// The "no" answer.
    Negative,
}

impl From<bool> for Confirm {
    fn from(value: bool) -> Self {
        if value { Self::Affirm } else { Self::Negative }
    }
}

impl FromStr for Confirm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "affirm" => Ok(Self::Affirm),
            "no" | "n" | "false" | "negative" => Ok(Self::Negative),
            other => Err(format!("unknown confirm answer '{other}'")),
        }
    }
}

impl fmt::Display for Confirm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Affirm => write!(f, "yes"),
            Self::Negative => write!(f, "no"),
        }
    }
}

/// A semantic answer, before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Free text, typed as-is.
    Text(String),
    /// A confirm choice.
    Confirm(Confirm),
    /// One option of a single-select list.
    Select(usize),
    /// A set of options of a multi-select list.
    MultiSelect(Vec<usize>),
}

impl Answer {
    /// Encode this answer with the given key map.
    ///
    /// Returns `None` for a multi-select answer that names no options.
    #[must_use]
    pub fn encode(&self, keys: &KeyMap) -> Option<Bytes> {
        match self {
            Self::Text(text) => Some(Bytes::copy_from_slice(text.as_bytes())),
            Self::Confirm(answer) => Some(keys.confirm(*answer)),
            Self::Select(index) => Some(keys.select(*index)),
            Self::MultiSelect(indices) => keys.multi_select(indices),
        }
    }

    /// The submit marker this kind of answer needs instead of the default.
    #[must_use]
    pub fn submit_override(&self, keys: &KeyMap) -> Option<Bytes> {
        match self {
            Self::Select(_) => Some(keys.select_submit.clone()),
            Self::Text(_) | Self::Confirm(_) | Self::MultiSelect(_) => None,
        }
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Confirm> for Answer {
    fn from(c: Confirm) -> Self {
        Self::Confirm(c)
    }
}
