//! Token model: placed images, the three layers, and per-layer containers.
//!
//! A [`TokenLayer`] owns every token placed on one layer. Tokens are stored
//! under opaque [`TokenKey`] handles; a name index gives O(1) lookup by the
//! unique per-layer name, and a separate order list preserves insertion
//! order, which is also the draw order (last inserted is on top).
//!
//! The three layers are held in a [`LayerSet`], one independently owned
//! field per [`Layer`].

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::transform::{Point, Size};

new_key_type! {
    /// Opaque handle to a token within one [`TokenLayer`].
    pub struct TokenKey;
}

/// One of the three token namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Layer {
    /// Map art under everything else.
    Background,
    /// Walls and obstacles; blocks observer sight lines.
    Barrier,
    /// Player tokens; each one is an observer for the fog of war.
    #[default]
    Player,
}

impl Layer {
    /// All layers in draw order (bottom first).
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Barrier, Layer::Player];

    /// Wire value of this layer.
    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Barrier => 1,
            Self::Player => 2,
        }
    }

    /// Parse a wire value.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Background),
            1 => Some(Self::Barrier),
            2 => Some(Self::Player),
            _ => None,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Background => "BACKGROUND",
            Self::Barrier => "BARRIER",
            Self::Player => "PLAYER",
        };
        f.write_str(name)
    }
}

/// One value per layer, each independently owned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSet<T> {
    pub background: T,
    pub barrier: T,
    pub player: T,
}

impl<T> LayerSet<T> {
    #[must_use]
    pub fn get(&self, layer: Layer) -> &T {
        match layer {
            Layer::Background => &self.background,
            Layer::Barrier => &self.barrier,
            Layer::Player => &self.player,
        }
    }

    pub fn get_mut(&mut self, layer: Layer) -> &mut T {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Barrier => &mut self.barrier,
            Layer::Player => &mut self.player,
        }
    }

    /// `(layer, value)` pairs in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &T)> {
        [
            (Layer::Background, &self.background),
            (Layer::Barrier, &self.barrier),
            (Layer::Player, &self.player),
        ]
        .into_iter()
    }
}

/// A validated image reference as supplied by the upload layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// URL or inline data URL of the image.
    pub url: String,
    /// Natural image width in pixels.
    pub width: f64,
    /// Natural image height in pixels.
    pub height: f64,
}

impl ImageSource {
    #[must_use]
    pub fn new(url: impl Into<String>, width: f64, height: f64) -> Self {
        Self { url: url.into(), width, height }
    }

    #[must_use]
    pub fn natural_size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A placed image on one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Unique name within the owning layer.
    pub name: String,
    /// Image drawn for this token.
    pub source: ImageSource,
    /// Top-left corner in scene-local pixels.
    pub position: Point,
    /// Drawn size in scene-local pixels.
    pub size: Size,
    /// Opacity in `[0, 1]`.
    pub alpha: f64,
    /// Whether the token currently receives pointer events.
    pub interactive: bool,
}

impl Token {
    /// A fully opaque, non-interactive token drawn at its natural size.
    #[must_use]
    pub fn new(name: impl Into<String>, source: ImageSource, position: Point) -> Self {
        let size = source.natural_size();
        Self { name: name.into(), source, position, size, alpha: 1.0, interactive: false }
    }

    /// Center of the token's bounding box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.position.x + self.size.width / 2.0, self.position.y + self.size.height / 2.0)
    }

    /// Whether `p` lies inside the bounding box (right/bottom edges exclusive).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.position.x
            && p.y >= self.position.y
            && p.x < self.position.x + self.size.width
            && p.y < self.position.y + self.size.height
    }
}

/// Every token placed on one layer.
#[derive(Debug, Default)]
pub struct TokenLayer {
    tokens: SlotMap<TokenKey, Token>,
    names: HashMap<String, TokenKey>,
    order: Vec<TokenKey>,
}

impl TokenLayer {
    /// Create an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token on top of the layer. Returns `None` without touching
    /// the layer if the name is already taken.
    pub fn insert(&mut self, token: Token) -> Option<TokenKey> {
        if self.names.contains_key(&token.name) {
            return None;
        }
        let name = token.name.clone();
        let key = self.tokens.insert(token);
        self.names.insert(name, key);
        self.order.push(key);
        Some(key)
    }

    /// Remove a token by name, returning its key and value.
    pub fn remove(&mut self, name: &str) -> Option<(TokenKey, Token)> {
        let key = self.names.remove(name)?;
        self.order.retain(|k| *k != key);
        self.tokens.remove(key).map(|token| (key, token))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    #[must_use]
    pub fn key_of(&self, name: &str) -> Option<TokenKey> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, key: TokenKey) -> Option<&Token> {
        self.tokens.get(key)
    }

    pub fn get_mut(&mut self, key: TokenKey) -> Option<&mut Token> {
        self.tokens.get_mut(key)
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Token> {
        self.key_of(name).and_then(|key| self.tokens.get(key))
    }

    /// `(key, token)` pairs in draw order (bottom first).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (TokenKey, &Token)> {
        self.order
            .iter()
            .filter_map(|key| self.tokens.get(*key).map(|token| (*key, token)))
    }

    /// Keys in draw order.
    #[must_use]
    pub fn keys(&self) -> Vec<TokenKey> {
        self.order.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
