//! Tab identity resolution
//!
//! A tab's identity is derived from the reference (href) of the menu item that
//! opened it. The same reference always yields the same identity, which is how
//! a second click on a menu item finds the tab the first click created.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Separator substituted for reserved characters
pub const SEPARATOR: char = '-';

/// Reference that marks a menu item as a no-op placeholder
pub const PLACEHOLDER_REFERENCE: &str = "#";

const RELATIVE_MARKER: &str = "./";
const SCRIPT_SCHEME: &str = "javascript:";

/// Quotes, `#`, `&`, `'`, `.`, `/`, `:`, `=`, `?`, `[` and `]`
static RESERVED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r##"["#&'./:=?\[\]]"##).expect("reserved character pattern"));

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("separator run pattern"));

/// Normalized key distinguishing tabs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabIdentity(String);

impl TabIdentity {
    /// Wrap an already-normalized key (e.g. one parsed back out of an element id)
    pub fn from_normalized(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity made unique per instance, used in duplicate-tabs mode
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self(format!("{}{}{}", self.0, SEPARATOR, suffix))
    }

    /// `id` of the tab-strip button for this tab
    pub fn nav_id(&self) -> String {
        format!("tab-{}", self.0)
    }

    /// `id` of the content pane for this tab
    pub fn pane_id(&self) -> String {
        format!("panel-{}", self.0)
    }
}

impl fmt::Display for TabIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TabIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check whether a reference can never open a tab
pub fn is_unusable_reference(reference: &str) -> bool {
    let trimmed = reference.trim();
    trimmed.is_empty()
        || trimmed == PLACEHOLDER_REFERENCE
        || trimmed
            .get(..SCRIPT_SCHEME.len())
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case(SCRIPT_SCHEME))
}

/// Derive the identity of the tab a reference opens.
///
/// Strips a leading `./`, replaces every reserved character with `-` and
/// collapses runs of `-`. Empty, `#` and `javascript:` references fail with
/// [`Error::InvalidTarget`].
pub fn resolve_identity(reference: &str) -> Result<TabIdentity> {
    if is_unusable_reference(reference) {
        return Err(Error::invalid_target(reference));
    }

    let trimmed = reference.trim();
    let relative = trimmed.strip_prefix(RELATIVE_MARKER).unwrap_or(trimmed);
    let replaced = RESERVED_CHARS.replace_all(relative, "-");
    let collapsed = SEPARATOR_RUNS.replace_all(&replaced, "-");

    // A reference made only of reserved characters, e.g. "./"
    if collapsed.trim_matches(SEPARATOR).is_empty() {
        return Err(Error::invalid_target(reference));
    }

    Ok(TabIdentity(collapsed.into_owned()))
}
