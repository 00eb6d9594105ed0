//! Phonetic units and the contexts that make them context-dependent.

use std::fmt;
use std::sync::Arc;

/// Neighboring phones a unit is conditioned on.
///
/// A side that is `None` is unconstrained and matches any neighbor; a side
/// that is `Some(vec![])` explicitly has no neighbors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Context {
    /// Context-independent unit
    #[default]
    Empty,
    /// Left and right neighbor phones
    LeftRight {
        left: Option<Vec<Arc<Unit>>>,
        right: Option<Vec<Arc<Unit>>>,
    },
}

impl Context {
    /// Create a left/right context.
    pub fn left_right(left: Option<Vec<Arc<Unit>>>, right: Option<Vec<Arc<Unit>>>) -> Self {
        Context::LeftRight { left, right }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Context::Empty)
    }

    /// Left neighbors, `None` when unconstrained or context-independent.
    pub fn left(&self) -> Option<&[Arc<Unit>]> {
        match self {
            Context::Empty => None,
            Context::LeftRight { left, .. } => left.as_deref(),
        }
    }

    /// Right neighbors, `None` when unconstrained or context-independent.
    pub fn right(&self) -> Option<&[Arc<Unit>]> {
        match self {
            Context::Empty => None,
            Context::LeftRight { right, .. } => right.as_deref(),
        }
    }

    /// Whether `candidate` agrees with every side this context constrains.
    ///
    /// `self` is the query. An `Empty` query constrains nothing. A left/right
    /// query against an `Empty` candidate matches only when both query sides
    /// are unconstrained.
    pub fn is_partial_match(&self, candidate: &Context) -> bool {
        match (self, candidate) {
            (Context::Empty, _) => true,
            (Context::LeftRight { left, right }, Context::Empty) => {
                left.is_none() && right.is_none()
            }
            (
                Context::LeftRight { left, right },
                Context::LeftRight {
                    left: candidate_left,
                    right: candidate_right,
                },
            ) => {
                side_matches(left.as_deref(), candidate_left.as_deref())
                    && side_matches(right.as_deref(), candidate_right.as_deref())
            }
        }
    }
}

/// An unconstrained query side matches anything. A constrained side needs a
/// candidate side with the same phone names.
fn side_matches(query: Option<&[Arc<Unit>]>, candidate: Option<&[Arc<Unit>]>) -> bool {
    match (query, candidate) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(query), Some(candidate)) => {
            query.len() == candidate.len()
                && query
                    .iter()
                    .zip(candidate)
                    .all(|(q, c)| q.name() == c.name())
        }
    }
}

/// A phonetic unit: base phone, filler flag and context.
///
/// Units are immutable once built. Context-independent units are interned by
/// [`UnitManager`](crate::unit_manager::UnitManager).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Unit {
    name: String,
    filler: bool,
    context: Context,
}

impl Unit {
    pub fn new(name: impl Into<String>, filler: bool, context: Context) -> Self {
        Self {
            name: name.into(),
            filler,
            context,
        }
    }

    /// Base phone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_filler(&self) -> bool {
        self.filler
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn is_context_dependent(&self) -> bool {
        !self.context.is_empty()
    }

    /// Whether this unit has base phone `name` and agrees with every side
    /// `context` constrains.
    pub fn is_partial_match(&self, name: &str, context: &Context) -> bool {
        self.name == name && context.is_partial_match(&self.context)
    }

    /// Whether a composite HMM may be synthesized for this unit.
    ///
    /// Fillers never qualify. Other units qualify when their left or right
    /// context is unconstrained.
    pub fn is_composite_candidate(&self) -> bool {
        if self.filler {
            return false;
        }

        match &self.context {
            Context::LeftRight { left, right } => left.is_none() || right.is_none(),
            Context::Empty => false,
        }
    }
}

/// Canonical string identity: `NAME` or `NAME[left,right]`.
///
/// Each side prints `*` when unconstrained, `-` when empty, else phone names
/// joined with `.`.
impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Context::Empty => write!(f, "{}", self.name),
            Context::LeftRight { left, right } => write!(
                f,
                "{}[{},{}]",
                self.name,
                SideDisplay(left.as_deref()),
                SideDisplay(right.as_deref())
            ),
        }
    }
}

struct SideDisplay<'a>(Option<&'a [Arc<Unit>]>);

impl fmt::Display for SideDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("*"),
            Some([]) => f.write_str("-"),
            Some(units) => {
                for (i, unit) in units.iter().enumerate() {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(unit.name())?;
                }
                Ok(())
            }
        }
    }
}
