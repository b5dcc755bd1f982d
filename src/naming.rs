//! Display names for uploaded images and the tokens placed from them.
//!
//! Image names drop the file extension and take a `" (n)"` suffix when the
//! bare name is taken. Token names always carry an `"<n> "` prefix that
//! numbers instances of one image within a layer, starting at `<0>`.

#[cfg(test)]
#[path = "naming_test.rs"]
mod naming_test;

/// Name for an uploaded file, unique among `existing` image names.
#[must_use]
pub fn image_name<'a>(file_name: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let base = strip_extension(file_name);
    let next = existing
        .into_iter()
        .map(|name| match name.strip_prefix(base) {
            Some("") => 1,
            Some(rest) => paren_suffix(rest).and_then(|n| n.checked_add(1)).unwrap_or(0),
            None => 0,
        })
        .max()
        .unwrap_or(0);

    if next == 0 { base.to_string() } else { format!("{base} ({next})") }
}

/// Name for a new token of `image`, unique among `existing` token names in
/// the target layer.
#[must_use]
pub fn token_name<'a>(image: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let next = existing
        .into_iter()
        .map(|name| {
            if name == image {
                return 1;
            }
            match angle_prefix(name) {
                Some((n, rest)) if rest == image => n.checked_add(1).unwrap_or(0),
                _ => 0,
            }
        })
        .max()
        .unwrap_or(0);

    format!("<{next}> {image}")
}

/// `"map.final.png"` -> `"map.final"`; names without an extension,
/// dotfiles, and dots inside a directory part are left alone.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => &file_name[..dot],
        _ => file_name,
    }
}

/// Parse `" (n)"` exactly.
fn paren_suffix(rest: &str) -> Option<u32> {
    let digits = rest.strip_prefix(" (")?.strip_suffix(')')?;
    parse_digits(digits)
}

/// Split `"<n> rest"` into `(n, rest)`.
fn angle_prefix(name: &str) -> Option<(u32, &str)> {
    let inner = name.strip_prefix('<')?;
    let (digits, rest) = inner.split_once("> ")?;
    Some((parse_digits(digits)?, rest))
}

/// Non-empty ASCII decimal that fits in a `u32`.
fn parse_digits(digits: &str) -> Option<u32> {
    if digits.is_empty() {
        return None;
    }
    digits.bytes().try_fold(0u32, |acc, b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}
