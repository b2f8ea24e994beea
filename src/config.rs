//! The configuration instance: loading, typed access, and the structural
//! operations (`split`, `apply`, `dump`, `write`).
//!
//! A `Config` is immutable from the outside. `split` and `apply` return a
//! new instance backed by a fresh tree and leave the receiver untouched,
//! so a loaded instance can be shared and read concurrently.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::error::EtcError;
use crate::path::{self, ROOT};
use crate::sml;
use crate::template;
use crate::tree::{self, Tree};
use crate::value;

/// Flat path→value overrides, as consumed by [`Config::apply`] and produced
/// by [`Config::dump`]. Keys are root-relative slash paths.
pub type Application = BTreeMap<String, String>;

/// A loaded configuration tree.
///
/// Paths are slash-separated, case-insensitive, and relative to the
/// document root; segments consist of `a-z0-9-`. Typed getters never fail —
/// a missing path or an unparsable value yields the caller's default.
#[derive(Debug, Clone)]
pub struct Config {
    values: Tree,
}

impl Config {
    /// Read a configuration document from a stream.
    pub fn read(mut source: impl io::Read) -> Result<Config, EtcError> {
        let mut buffer = String::new();
        source
            .read_to_string(&mut buffer)
            .map_err(|err| EtcError::IllegalSourceFormat {
                reason: err.to_string(),
            })?;
        Config::read_str(&buffer)
    }

    /// Read a configuration document from a string.
    pub fn read_str(source: &str) -> Result<Config, EtcError> {
        let document = sml::parse(source)?;
        if document.tag != ROOT {
            return Err(EtcError::IllegalSourceFormat {
                reason: format!("root node '{ROOT}' missing, found '{}'", document.tag),
            });
        }
        let mut values = Tree::with_root(to_tree_node(&document));
        template::resolve(&mut values).map_err(|err| EtcError::CannotPostProcess {
            source: Box::new(err),
        })?;
        Ok(Config { values })
    }

    /// Read a configuration document from a file. I/O failures are wrapped
    /// with the filename.
    pub fn read_file(filename: impl AsRef<Path>) -> Result<Config, EtcError> {
        let filename = filename.as_ref();
        let source = fs::read_to_string(filename).map_err(|source| EtcError::CannotReadFile {
            path: filename.to_path_buf(),
            source,
        })?;
        Config::read_str(&source)
    }

    /// Whether the path resolves to a node, leaf or intermediate.
    pub fn has_path(&self, path: &str) -> bool {
        self.values.node_at(&path::full_path(path)).is_some()
    }

    /// Retrieve and parse the value at `path` through `FromStr`, falling
    /// back to `default` when the path is missing or the value does not
    /// parse. This is the generic core behind the typed getters.
    pub fn get<T: FromStr>(&self, path: &str, default: T) -> T {
        value::parse_or(self.value_at(path).ok().as_deref(), default)
    }

    pub fn get_str(&self, path: &str, default: &str) -> String {
        self.value_at(path).unwrap_or_else(|_| default.to_string())
    }

    pub fn get_bool(&self, path: &str, default: bool) -> bool {
        value::bool_or(self.value_at(path).ok().as_deref(), default)
    }

    pub fn get_int(&self, path: &str, default: i64) -> i64 {
        self.get(path, default)
    }

    pub fn get_float(&self, path: &str, default: f64) -> f64 {
        self.get(path, default)
    }

    /// Interpret the value at `path` as a timestamp in the given chrono
    /// layout, e.g. `%Y-%m-%d %H:%M:%S`.
    pub fn get_time(&self, path: &str, layout: &str, default: NaiveDateTime) -> NaiveDateTime {
        value::time_or(self.value_at(path).ok().as_deref(), layout, default)
    }

    pub fn get_duration(&self, path: &str, default: Duration) -> Duration {
        value::duration_or(self.value_at(path).ok().as_deref(), default)
    }

    /// Extract the subtree below `at` into a new instance whose root is the
    /// split point. A path that does not resolve yields an empty
    /// configuration, not an error.
    pub fn split(&self, at: &str) -> Result<Config, EtcError> {
        if !self.has_path(at) {
            return Config::read_str("{etc}");
        }
        let full = path::full_path(at);
        let mut values = self
            .values
            .copy_at(&full)
            .ok_or_else(|| EtcError::CannotSplit {
                reason: format!("no subtree at {}", path::display(&full)),
            })?;
        values.set_root_key(ROOT);
        Ok(Config { values })
    }

    /// Produce a new instance with every override created or overwritten.
    /// The receiver is untouched; on any failure no instance is returned.
    pub fn apply(&self, appl: &Application) -> Result<Config, EtcError> {
        let mut values = self.values.clone();
        for (p, v) in appl {
            values
                .set_value_at(&path::full_path(p), v)
                .map_err(|err| EtcError::CannotApply {
                    path: p.clone(),
                    reason: err.to_string(),
                })?;
        }
        Ok(Config { values })
    }

    /// Flatten the tree into root-relative path→value pairs. The root
    /// node's own value is skipped.
    pub fn dump(&self) -> Result<Application, EtcError> {
        let mut appl = Application::new();
        self.values.for_each(|segments, value| {
            if segments.len() == 1 {
                return;
            }
            appl.insert(segments[1..].join("/"), value.to_string());
        });
        Ok(appl)
    }

    /// Serialize the tree back to its document form. Pretty mode indents
    /// 3 spaces per level; compact mode emits a single line.
    pub fn write(&self, target: &mut impl io::Write, pretty: bool) -> io::Result<()> {
        // Rebuild the document by diffing each visited node's depth against
        // the previous one: deeper opens a child, equal closes and opens a
        // sibling, shallower closes back up first.
        let mut builder = sml::Builder::new();
        let mut depth = 0usize;
        self.values.for_each(|segments, value| {
            let node_depth = segments.len();
            let tag = &segments[node_depth - 1];
            while depth > node_depth {
                builder.end_tag();
                depth -= 1;
            }
            if node_depth > depth {
                depth = node_depth;
            } else {
                builder.end_tag();
            }
            builder.begin_tag(tag);
            builder.text(value);
        });
        while depth > 0 {
            builder.end_tag();
            depth -= 1;
        }
        match builder.root() {
            Some(document) => sml::write(&document, target, pretty),
            None => Ok(()),
        }
    }

    fn value_at(&self, path: &str) -> Result<String, EtcError> {
        let full = path::full_path(path);
        self.values
            .value_at(&full)
            .map(str::to_string)
            .ok_or_else(|| EtcError::InvalidPath {
                path: path::display(&full),
            })
    }
}

/// The compact document form, mainly for logs and debugging.
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::new();
        self.write(&mut out, false).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&out))
    }
}

fn to_tree_node(node: &sml::Node) -> tree::Node {
    tree::Node {
        key: node.tag.clone(),
        value: node.text.clone(),
        children: node.children.iter().map(to_tree_node).collect(),
    }
}
