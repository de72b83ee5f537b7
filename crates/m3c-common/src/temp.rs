//! Temporaries and labels. Both are process-scoped: fresh ones are drawn from
//! global counters, so two calls never produce the same identity.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static TEMPS: AtomicUsize = AtomicUsize::new(0);
static LABELS: AtomicUsize = AtomicUsize::new(0);

/// An abstract register. Physical registers are temporaries too, carrying their
/// register name as a hint.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Temp {
    id: usize,
    hint: Option<&'static str>,
}

impl Temp {
    pub fn fresh() -> Self {
        Self {
            id: TEMPS.fetch_add(1, Ordering::Relaxed),
            hint: None,
        }
    }

    pub fn named(hint: &'static str) -> Self {
        Self {
            id: TEMPS.fetch_add(1, Ordering::Relaxed),
            hint: Some(hint),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hint {
            Some(hint) => write!(f, "{hint}"),
            None => write!(f, "t.{}", self.id),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Label {
    Fresh(usize),
    /// Labels with the same name are the same label.
    Named(Rc<str>),
}

impl Label {
    pub fn fresh() -> Self {
        Self::Fresh(LABELS.fetch_add(1, Ordering::Relaxed))
    }

    pub fn named(name: &str) -> Self {
        Self::Named(name.into())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fresh(id) => write!(f, "L.{id}"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}
