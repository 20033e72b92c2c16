// src/network/template.rs
//! Rendering of pool descriptors into the first-run page's pool list
//!
//! Templates are plain markup with `{{path}}` placeholders, where `path` is a
//! dotted path into the descriptor's JSON form, e.g. `{{name}}`,
//! `{{mining_ports.cpu}}` or any extra field the service sends (`{{fee}}`).

use crate::network::pool::PoolDescriptor;
use crate::utils::error::MinerError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Number of pools shown before the "show all" link
pub const VISIBLE_POOLS: usize = 3;

/// Inserted before the first hidden pool; opens the hidden container
pub const SHOW_ALL_MARKER: &str =
    "<a href=\"#\" id=\"show_pool_list\">Show all</a><div id=\"pool_list_bottom\" class=\"dn\">";

/// Closes the container opened by [`SHOW_ALL_MARKER`]
pub const HIDDEN_LIST_END: &str = "</div>";

/// Template used when the installation ships none
pub const DEFAULT_POOL_TEMPLATE: &str = r#"<div class="pool" data-pool-id="{{id}}">
  <span class="pool-name">{{name}}</span>
  <span class="pool-fee">{{fee}}</span>
  <span class="pool-miners">{{miners}}</span>
  <a class="pool-url" href="{{url}}">{{url}}</a>
</div>
"#;

/// A loaded pool template
#[derive(Debug, Clone, PartialEq)]
pub struct PoolTemplate {
    source: String,
}

impl Default for PoolTemplate {
    fn default() -> Self {
        PoolTemplate::new(DEFAULT_POOL_TEMPLATE)
    }
}

impl PoolTemplate {
    /// Wraps template source text
    pub fn new(source: impl Into<String>) -> Self {
        PoolTemplate {
            source: source.into(),
        }
    }

    /// Loads the template at `path`, or the built-in one if the file is absent
    ///
    /// # Errors
    /// Returns `MinerError::IoError` if the file exists but cannot be read
    pub fn load(path: &Path) -> Result<Self, MinerError> {
        if !path.exists() {
            return Ok(PoolTemplate::default());
        }
        Ok(PoolTemplate::new(fs::read_to_string(path)?))
    }

    /// Renders one descriptor
    pub fn render(&self, pool: &PoolDescriptor) -> Result<String, MinerError> {
        let data = serde_json::to_value(pool)?;
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source.as_str();

        while let Some(open) = rest.find("{{") {
            let Some(close) = rest[open + 2..].find("}}") else {
                break;
            };
            out.push_str(&rest[..open]);
            let key = rest[open + 2..open + 2 + close].trim();
            if let Some(value) = lookup(&data, key) {
                out.push_str(&display(value));
            }
            rest = &rest[open + 2 + close + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Renders all descriptors, hiding everything after the first
    /// [`VISIBLE_POOLS`] behind a "show all" link
    pub fn render_list(&self, pools: &[PoolDescriptor]) -> Result<String, MinerError> {
        let mut list = String::new();
        for (i, pool) in pools.iter().enumerate() {
            if i == VISIBLE_POOLS {
                list.push_str(SHOW_ALL_MARKER);
            }
            list.push_str(&self.render(pool)?);
        }
        if pools.len() > VISIBLE_POOLS {
            list.push_str(HIDDEN_LIST_END);
        }
        Ok(list)
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |value, key| value.get(key))
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => escape_html(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => escape_html(&other.to_string()),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
