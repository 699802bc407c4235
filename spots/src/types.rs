use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The animation a surface should use when applying a structural change.
///
/// The core never interprets this value; it is forwarded to the [`crate::UserInterface`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Animation {
    Fade,
    Right,
    Left,
    Top,
    Bottom,
    None,
    Middle,
    #[default]
    Automatic,
}

/// Selects which surface and layout rules a component uses.
///
/// Unknown kinds round-trip through [`ComponentKind::Custom`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    #[default]
    List,
    Grid,
    Carousel,
    Row,
    Custom(String),
}

impl ComponentKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::List => "list",
            Self::Grid => "grid",
            Self::Carousel => "carousel",
            Self::Row => "row",
            Self::Custom(s) => s,
        }
    }

    /// Horizontal kinds lay their items out on a single scrolling row.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Carousel | Self::Row)
    }
}

impl From<String> for ComponentKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "list" => Self::List,
            "grid" => Self::Grid,
            "carousel" => Self::Carousel,
            "row" => Self::Row,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for ComponentKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<ComponentKind> for String {
    fn from(value: ComponentKind) -> Self {
        match value {
            ComponentKind::Custom(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque per-component identity used to address composite children and deferred surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub(crate) u64);

impl ComponentId {
    pub(crate) fn next() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}
