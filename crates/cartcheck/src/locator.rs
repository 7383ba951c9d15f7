//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a lazy description of a set of elements. It never holds
//! a DOM handle; every use re-resolves it inside the page, so a locator made
//! before a navigation is still valid after it.
//!
//! Resolution is compiled to JavaScript: [`Locator::resolve_js`] yields an
//! expression evaluating to an array of elements, and the script builders
//! wrap it for probing, acting on the first match, or mapping over all
//! matches. Each script carries a leading `/*tag*/` comment naming the
//! operation, which keeps scripts greppable in traces and lets the mock
//! driver answer them by fragment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Render a Rust string as a JavaScript string literal
#[must_use]
pub fn js_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Visibility predicate shared by every script
pub(crate) const VISIBLE_FN: &str = "const __vis = el => { \
const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; };";

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "#button-cart")
    Css(String),
    /// CSS selector whose matches must contain some text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Form control by placeholder text
    Placeholder(String),
    /// Element by ARIA role and accessible name
    Role {
        /// Role name (button, link, heading, textbox, checkbox, combobox)
        role: String,
        /// Substring of the accessible name, case-insensitive
        name: Option<String>,
    },
    /// Nearest proper ancestor matching a CSS selector
    Closest(String),
    /// Innermost element whose text matches
    Text {
        /// Text to find
        text: String,
        /// Require the trimmed text to equal `text`
        exact: bool,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a substring text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create a placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Create a role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<&str>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.map(str::to_string),
        }
    }

    /// CSS equivalent of an ARIA role, covering implicit roles
    fn role_css(role: &str) -> String {
        let implicit = match role {
            "button" => "button, input[type='button'], input[type='submit'], input[type='reset']",
            "link" => "a[href]",
            "heading" => "h1, h2, h3, h4, h5, h6",
            "textbox" => {
                "input:not([type]), input[type='text'], input[type='email'], \
                 input[type='password'], input[type='tel'], input[type='search'], textarea"
            }
            "checkbox" => "input[type='checkbox']",
            "radio" => "input[type='radio']",
            "combobox" => "select",
            "img" => "img",
            _ => "",
        };
        if implicit.is_empty() {
            format!("[role='{role}']")
        } else {
            format!("{implicit}, [role='{role}']")
        }
    }

    /// JavaScript expression yielding the matches under `root` as an array
    #[must_use]
    pub fn to_query(&self, root: &str) -> String {
        match self {
            Self::Css(css) => format!("Array.from({root}.querySelectorAll({}))", js_str(css)),
            Self::CssWithText { css, text } => format!(
                "Array.from({root}.querySelectorAll({})).filter(el => el.textContent.includes({}))",
                js_str(css),
                js_str(text)
            ),
            Self::Placeholder(text) => format!(
                "Array.from({root}.querySelectorAll('[placeholder]')).filter(el => el.getAttribute('placeholder').includes({}))",
                js_str(text)
            ),
            Self::Role { role, name } => {
                let base = format!(
                    "Array.from({root}.querySelectorAll({}))",
                    js_str(&Self::role_css(role))
                );
                match name {
                    None => base,
                    Some(name) => format!(
                        "{base}.filter(el => (el.getAttribute('aria-label') || el.textContent || el.value || '').trim().toLowerCase().includes({}))",
                        js_str(&name.to_lowercase())
                    ),
                }
            }
            Self::Closest(css) => format!(
                "[{root}.parentElement && {root}.parentElement.closest({})].filter(Boolean)",
                js_str(css)
            ),
            Self::Text { text, exact } => {
                let test = if *exact {
                    format!("(t => (t || '').trim() === {})", js_str(text))
                } else {
                    format!("(t => (t || '').includes({}))", js_str(text))
                };
                format!(
                    "(() => {{ const m = {test}; return Array.from({root}.querySelectorAll('*')).filter(el => m(el.textContent) && !Array.from(el.children).some(c => m(c.textContent))); }})()"
                )
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text(\"{text}\")"),
            Self::Placeholder(text) => write!(f, "placeholder=\"{text}\""),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name=\"{name}\"]"),
            Self::Closest(css) => write!(f, "closest={css}"),
            Self::Text { text, exact: true } => write!(f, "text=\"{text}\"s"),
            Self::Text { text, exact: false } => write!(f, "text=\"{text}\""),
        }
    }
}

/// Which of the matched elements a locator keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pick {
    /// Every match
    #[default]
    All,
    /// The first match
    First,
    /// The last match
    Last,
    /// The match at a zero-based index
    Nth(usize),
}

/// A locator for finding elements, optionally scoped inside another locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    selector: Selector,
    parent: Option<Box<Locator>>,
    has_text: Option<String>,
    pick: Pick,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            parent: None,
            has_text: None,
            pick: Pick::All,
        }
    }

    /// Locate by innermost text match
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Locate by exact trimmed text
    #[must_use]
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text {
            text: text.into(),
            exact: true,
        })
    }

    /// Locate a form control by placeholder
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::placeholder(text))
    }

    /// Locate by role and optional accessible name
    #[must_use]
    pub fn role(role: &str, name: Option<&str>) -> Self {
        Self::from_selector(Selector::role(role, name))
    }

    /// Keep only matches containing `text`
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let text = text.into();
        match self.selector {
            Selector::Css(css) if self.has_text.is_none() => Self {
                selector: Selector::CssWithText { css, text },
                ..self
            },
            selector => Self {
                selector,
                has_text: Some(text),
                ..self
            },
        }
    }

    /// Resolve `child` inside each match of this locator
    #[must_use]
    pub fn locator(&self, child: Locator) -> Self {
        child.within(self.clone())
    }

    /// Resolve a CSS selector inside each match of this locator
    #[must_use]
    pub fn find(&self, css: impl Into<String>) -> Self {
        self.locator(Self::new(css))
    }

    /// Nearest ancestor of each match that matches `css`
    #[must_use]
    pub fn closest(&self, css: impl Into<String>) -> Self {
        self.locator(Self::from_selector(Selector::Closest(css.into())))
    }

    /// Scope this locator under `parent`
    #[must_use]
    pub fn within(mut self, parent: Locator) -> Self {
        self.parent = Some(Box::new(match self.parent.take() {
            Some(existing) => existing.within(parent),
            None => parent,
        }));
        self
    }

    /// Keep only the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.pick(Pick::First)
    }

    /// Keep only the last match
    #[must_use]
    pub fn last(self) -> Self {
        self.pick(Pick::Last)
    }

    /// Keep only the match at `index`
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        self.pick(Pick::Nth(index))
    }

    fn pick(mut self, pick: Pick) -> Self {
        self.pick = pick;
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the parent scope, if any
    #[must_use]
    pub fn parent(&self) -> Option<&Locator> {
        self.parent.as_deref()
    }

    /// JavaScript expression evaluating to the array of matched elements
    #[must_use]
    pub fn resolve_js(&self) -> String {
        let roots = self
            .parent
            .as_ref()
            .map_or_else(|| "[document]".to_string(), |p| p.resolve_js());
        let mut expr = format!(
            "Array.from(new Set({roots}.flatMap(root => {})))",
            self.selector.to_query("root")
        );
        if let Some(ref text) = self.has_text {
            expr.push_str(&format!(
                ".filter(el => el.textContent.includes({}))",
                js_str(text)
            ));
        }
        match self.pick {
            Pick::All => {}
            Pick::First => expr.push_str(".slice(0, 1)"),
            Pick::Last => expr.push_str(".slice(-1)"),
            Pick::Nth(i) => expr.push_str(&format!(".slice({i}, {})", i + 1)),
        }
        expr
    }

    /// Script reporting `{count, visible}` for the current matches
    #[must_use]
    pub fn probe_script(&self) -> String {
        format!(
            "/*probe*/ (() => {{ {VISIBLE_FN} const els = {}; return {{ count: els.length, visible: els.filter(__vis).length }}; }})()",
            self.resolve_js()
        )
    }

    /// Script evaluating `value` with `el` bound to the first match.
    ///
    /// Returns `{ok: false}` when nothing matches and
    /// `{ok: true, value}` otherwise.
    #[must_use]
    pub fn element_script(&self, tag: &str, value: &str) -> String {
        format!(
            "/*{tag}*/ (async () => {{ {VISIBLE_FN} const el = ({})[0]; if (!el) return {{ ok: false }}; return {{ ok: true, value: await ({value}) }}; }})()",
            self.resolve_js()
        )
    }

    /// Script mapping `value` over every match, with `el` bound to each
    #[must_use]
    pub fn map_script(&self, tag: &str, value: &str) -> String {
        format!(
            "/*{tag}*/ (() => {{ {VISIBLE_FN} return ({}).map(el => ({value})); }})()",
            self.resolve_js()
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref parent) = self.parent {
            write!(f, "{parent} >> ")?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(ref text) = self.has_text {
            write!(f, " >> has-text=\"{text}\"")?;
        }
        match self.pick {
            Pick::All => Ok(()),
            Pick::First => write!(f, " >> nth=0"),
            Pick::Last => write!(f, " >> nth=-1"),
            Pick::Nth(i) => write!(f, " >> nth={i}"),
        }
    }
}

impl From<&str> for Locator {
    fn from(css: &str) -> Self {
        Self::new(css)
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}
