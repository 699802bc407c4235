use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::item::items_strict_eq;
use crate::{ComponentKind, Interaction, Item, Layout, Size};

/// How a new component model differs from the one it replaces.
///
/// Variants are listed in the order [`ComponentModel::diff`] checks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentModelDiff {
    Kind,
    Identifier,
    Layout,
    Header,
    Footer,
    Meta,
    Items,
    New,
    Removed,
    None,
}

impl ComponentModelDiff {
    /// Whether this change can only be applied by replacing the whole component.
    pub fn requires_replacement(self) -> bool {
        matches!(
            self,
            Self::Kind | Self::Identifier | Self::Layout | Self::Header | Self::Footer | Self::Meta
        )
    }
}

/// The value-type data backing a component.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ComponentModel {
    pub identifier: Option<String>,
    pub index: usize,
    pub kind: ComponentKind,
    pub header: Option<Item>,
    pub footer: Option<Item>,
    pub layout: Option<Layout>,
    pub interaction: Interaction,
    pub items: Vec<Item>,
    pub size: Option<Size>,
    pub meta: Map<String, Value>,
    /// Limits how many items are written when the model is serialized.
    #[serde(rename = "amountOfItemsToCache")]
    pub amount_of_items_to_cache: Option<usize>,
}

impl ComponentModel {
    pub fn new(kind: impl Into<ComponentKind>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self.refresh_indexes();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_header(mut self, header: Item) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: Item) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_amount_of_items_to_cache(mut self, amount: usize) -> Self {
        self.amount_of_items_to_cache = Some(amount);
        self
    }

    /// Rewrites every item's `index` to its position in `items`.
    pub fn refresh_indexes(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.index = index;
        }
    }

    /// Returns the layout, falling back to the default for this model's kind.
    pub fn layout_or_default(&self) -> Layout {
        self.layout
            .clone()
            .unwrap_or_else(|| Layout::default_for(&self.kind))
    }

    /// Typed lookup into `meta`.
    pub fn meta<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.meta.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Classifies how `self` differs from `old`; the first mismatch wins.
    pub fn diff(&self, old: &ComponentModel) -> ComponentModelDiff {
        if self.kind != old.kind {
            ComponentModelDiff::Kind
        } else if self.identifier != old.identifier {
            ComponentModelDiff::Identifier
        } else if self.layout != old.layout {
            ComponentModelDiff::Layout
        } else if self.header != old.header {
            ComponentModelDiff::Header
        } else if self.footer != old.footer {
            ComponentModelDiff::Footer
        } else if self.meta != old.meta {
            ComponentModelDiff::Meta
        } else if !items_strict_eq(&self.items, &old.items) {
            ComponentModelDiff::Items
        } else {
            ComponentModelDiff::None
        }
    }

    /// Compares every field, including item sizes and nested children.
    pub fn strict_eq(&self, other: &ComponentModel) -> bool {
        self.diff(other) == ComponentModelDiff::None && self.interaction == other.interaction
    }
}

impl PartialEq for ComponentModel {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.kind == other.kind
            && self.layout == other.layout
            && self.header == other.header
            && self.footer == other.footer
            && self.interaction == other.interaction
            && self.meta == other.meta
            && self.items == other.items
    }
}

#[derive(Serialize)]
struct ComponentModelRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    identifier: Option<&'a String>,
    index: usize,
    kind: &'a ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    header: Option<&'a Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<&'a Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<&'a Layout>,
    interaction: &'a Interaction,
    items: &'a [Item],
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<&'a Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a Map<String, Value>>,
    #[serde(
        rename = "amountOfItemsToCache",
        skip_serializing_if = "Option::is_none"
    )]
    amount_of_items_to_cache: Option<usize>,
}

impl Serialize for ComponentModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items = match self.amount_of_items_to_cache {
            Some(amount) => &self.items[..amount.min(self.items.len())],
            None => &self.items[..],
        };
        ComponentModelRef {
            identifier: self.identifier.as_ref(),
            index: self.index,
            kind: &self.kind,
            header: self.header.as_ref(),
            footer: self.footer.as_ref(),
            layout: self.layout.as_ref(),
            interaction: &self.interaction,
            items,
            size: self.size.as_ref(),
            meta: (!self.meta.is_empty()).then_some(&self.meta),
            amount_of_items_to_cache: self.amount_of_items_to_cache,
        }
        .serialize(serializer)
    }
}
