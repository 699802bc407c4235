use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ComponentModel, ItemDiff, Size};

/// One renderable row/cell.
///
/// Equality has two tiers:
/// - `==` (shallow) compares the user-visible fields: identifier, title, subtitle, text, image,
///   kind, action, meta and relations.
/// - [`Item::strict_eq`] additionally compares `size` and `children`, and compares relations
///   strictly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<i64>,
    pub title: String,
    pub subtitle: String,
    pub text: String,
    pub image: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub size: Size,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<String, Vec<Item>>,
    /// Serialized nested component definitions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Map<String, Value>>,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_identifier(mut self, identifier: i64) -> Self {
        self.identifier = Some(identifier);
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.size.height = height;
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_relation(mut self, key: impl Into<String>, items: Vec<Item>) -> Self {
        self.relations.insert(key.into(), items);
        self
    }

    /// Replaces `children` with the serialized form of `models`.
    pub fn with_children(mut self, models: &[ComponentModel]) -> Self {
        self.children = models
            .iter()
            .filter_map(|m| match serde_json::to_value(m) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            })
            .collect();
        self
    }

    /// Decodes `children` into component models.
    ///
    /// Entries that do not decode are skipped.
    pub fn child_models(&self) -> Vec<ComponentModel> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| {
                match serde_json::from_value::<ComponentModel>(Value::Object(child.clone())) {
                    Ok(mut model) => {
                        model.index = index;
                        model.refresh_indexes();
                        Some(model)
                    }
                    Err(_err) => {
                        swarn!(item = self.index, child = index, error = %_err, "Item: undecodable child");
                        None
                    }
                }
            })
            .collect()
    }

    /// Typed lookup into `meta`.
    pub fn meta<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.meta.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn meta_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.meta(key).unwrap_or(default)
    }

    pub fn relation(&self, key: &str, index: usize) -> Option<&Item> {
        self.relations.get(key)?.get(index)
    }

    /// Compares every field including `size`, `children` and strict relations.
    pub fn strict_eq(&self, other: &Item) -> bool {
        self == other
            && self.size == other.size
            && self.children == other.children
            && relations_eq(&self.relations, &other.relations, Item::strict_eq)
    }

    /// Classifies how `self` differs from `old`.
    ///
    /// Fields are checked in a fixed order and the first mismatch wins. `Children` is only
    /// reported when nothing else differs; use [`Item::children_differ`] to detect child changes
    /// independently.
    pub fn diff(&self, old: &Item) -> ItemDiff {
        if self.kind != old.kind {
            ItemDiff::Kind
        } else if self.size != old.size {
            ItemDiff::Size
        } else if self.identifier != old.identifier {
            ItemDiff::Identifier
        } else if self.title != old.title {
            ItemDiff::Title
        } else if self.subtitle != old.subtitle {
            ItemDiff::Subtitle
        } else if self.text != old.text {
            ItemDiff::Text
        } else if self.image != old.image {
            ItemDiff::Image
        } else if self.action != old.action {
            ItemDiff::Action
        } else if self.meta != old.meta {
            ItemDiff::Meta
        } else if !relations_eq(&self.relations, &old.relations, Item::eq) {
            ItemDiff::Relations
        } else if self.children_differ(old) {
            ItemDiff::Children
        } else {
            ItemDiff::None
        }
    }

    pub fn children_differ(&self, old: &Item) -> bool {
        self.children != old.children
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.title == other.title
            && self.subtitle == other.subtitle
            && self.text == other.text
            && self.image == other.image
            && self.kind == other.kind
            && self.action == other.action
            && self.meta == other.meta
            && relations_eq(&self.relations, &other.relations, Item::eq)
    }
}

fn relations_eq(
    lhs: &BTreeMap<String, Vec<Item>>,
    rhs: &BTreeMap<String, Vec<Item>>,
    eq: fn(&Item, &Item) -> bool,
) -> bool {
    lhs.len() == rhs.len()
        && lhs.iter().zip(rhs.iter()).all(|((lk, lv), (rk, rv))| {
            lk == rk && lv.len() == rv.len() && lv.iter().zip(rv).all(|(a, b)| eq(a, b))
        })
}

/// Strict comparison of two item slices.
pub fn items_strict_eq(lhs: &[Item], rhs: &[Item]) -> bool {
    lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(a, b)| a.strict_eq(b))
}
