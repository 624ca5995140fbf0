use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by every id type.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Process-wide mint counter. Shared so ids minted for different types never
/// reuse a suffix within one session.
static COUNTER: AtomicU64 = AtomicU64::new(0);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing handle.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate a fresh id with a prefix (e.g. `shape-7`, `kf-12`).
            ///
            /// Fresh within this process; callers that need uniqueness against
            /// a loaded document must still check for collisions.
            pub fn with_prefix(prefix: &str) -> Self {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{prefix}-{n}"))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "@{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id! {
    /// A lightweight, interned identifier for nodes in the scene graph.
    /// Internally a 4-byte `Spur` index, so `Copy` and O(1) `Eq`/`Hash`.
    NodeId
}

interned_id! {
    /// Identifier of an animation timeline.
    TimelineId
}

interned_id! {
    /// Identifier of a keyframe inside a timeline.
    KeyframeId
}

/// Next value of the shared mint counter, for suffix-based disambiguation.
pub(crate) fn next_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}
