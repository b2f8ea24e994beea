//! Ambient value carrier for request-scoped propagation.
//!
//! `Context` is an immutable typed map: attaching a value returns a derived
//! carrier and leaves the receiver untouched, so a carrier can be shared
//! across call chains without synchronization. Entries are keyed by their
//! `TypeId`, which makes keys collision-proof without a registry — two
//! different types can never shadow each other.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone, Default)]
pub struct Context {
    values: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Derive a carrier that additionally holds `value`. An existing value
    /// of the same type is shadowed in the derived carrier.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(&self, value: T) -> Context {
        let mut values = self.values.clone();
        values.insert(TypeId::of::<T>(), Arc::new(value));
        Context { values }
    }

    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
    }
}

/// Derive a carrier holding the configuration.
#[must_use]
pub fn new_context(ctx: &Context, cfg: Config) -> Context {
    ctx.with(cfg)
}

/// The configuration stored in `ctx`, if any.
pub fn from_context(ctx: &Context) -> Option<&Config> {
    ctx.get::<Config>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_and_retrieve_config() {
        let cfg = Config::read_str("{etc {host x}}").unwrap();
        let ctx = new_context(&Context::new(), cfg);
        let retrieved = from_context(&ctx).unwrap();
        assert_eq!(retrieved.get_str("host", ""), "x");
    }

    #[test]
    fn empty_context_has_no_config() {
        assert!(from_context(&Context::new()).is_none());
    }

    #[test]
    fn attach_leaves_receiver_untouched() {
        let base = Context::new();
        let cfg = Config::read_str("{etc}").unwrap();
        let _derived = new_context(&base, cfg);
        assert!(from_context(&base).is_none());
    }

    #[test]
    fn later_attachment_shadows_earlier() {
        let first = Config::read_str("{etc {v 1}}").unwrap();
        let second = Config::read_str("{etc {v 2}}").unwrap();
        let ctx = new_context(&new_context(&Context::new(), first), second);
        assert_eq!(from_context(&ctx).unwrap().get_int("v", 0), 2);
    }

    #[test]
    fn other_types_do_not_collide() {
        let cfg = Config::read_str("{etc}").unwrap();
        let ctx = new_context(&Context::new(), cfg).with(7u32);
        assert!(from_context(&ctx).is_some());
        assert_eq!(ctx.get::<u32>(), Some(&7));
        assert_eq!(ctx.get::<String>(), None);
    }
}
