//! Hierarchical configuration trees with typed access, load-time template
//! substitution, and structural transforms.
//!
//! A configuration is a nested tagged-text document whose single root tag
//! is `etc`; nested tags are path segments and tag text is the value:
//!
//! ```text
//! {etc
//!    {host localhost}
//!    {services
//!       {web
//!          {port 8080}
//!       }
//!    }
//! }
//! ```
//!
//! Loading parses the document, verifies the root, and resolves templates
//! once; the result is an immutable [`Config`] addressed by slash paths:
//!
//! ```
//! use etcfg::Config;
//!
//! let cfg = Config::read_str(r#"{etc {host "localhost"}{port "8080"}}"#)?;
//! assert_eq!(cfg.get_int("port", 0), 8080);
//! assert_eq!(cfg.get_str("missing", "fallback"), "fallback");
//! # Ok::<(), etcfg::EtcError>(())
//! ```
//!
//! # Paths and typed access
//!
//! Paths are case-insensitive and slash-separated (`services/web/port`);
//! empty segments are dropped, so `/a//b/` equals `a/b`. Every typed getter
//! takes a default and never fails: a missing path or an unparsable value
//! degrades to the default. Configuration access favors availability over
//! strictness — load-time errors are loud, read-time errors are not.
//!
//! # Templates
//!
//! Values may embed `[source||default]` placeholders, resolved exactly once
//! at load time. A `$NAME` source reads the process environment; any other
//! source is a configuration path. Without `||` the literal bracketed text
//! is the fallback, and only the first placeholder per value is resolved
//! per load.
//!
//! # Structural operations
//!
//! - [`Config::split`] extracts a subtree as a new, re-rooted instance; a
//!   missing path yields an empty configuration, not an error.
//! - [`Config::apply`] merges path→value overrides into a new instance.
//! - [`Config::dump`] flattens the tree into an [`Application`] map.
//! - [`Config::write`] serializes back to the document form, pretty or
//!   compact.
//!
//! Instances are copy-on-write: `split` and `apply` derive new instances
//! and never mutate the receiver, so a loaded `Config` is safe to share
//! across threads for reading.
//!
//! # Ambient propagation
//!
//! [`Context`] carries a configuration through call chains without global
//! state: [`new_context`] derives a carrier holding the instance and
//! [`from_context`] retrieves it.

pub mod error;

mod config;
mod context;
mod path;
mod sml;
mod template;
mod tree;
mod value;

pub use config::{Application, Config};
pub use context::{Context, from_context, new_context};
pub use error::EtcError;
