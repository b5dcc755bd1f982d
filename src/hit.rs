#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::token::{TokenKey, TokenLayer};
use crate::transform::Point;

/// Topmost interactive token under `local_pt`, searching from the last drawn.
#[must_use]
pub fn hit_test(local_pt: Point, layer: &TokenLayer) -> Option<TokenKey> {
    layer
        .iter()
        .rev()
        .find(|(_, token)| token.interactive && token.contains(local_pt))
        .map(|(key, _)| key)
}
