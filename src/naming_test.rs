use super::*;

const NONE: [&str; 0] = [];

// =============================================================
// Image names
// =============================================================

#[test]
fn image_name_strips_extension() {
    assert_eq!(image_name("goblin.png", NONE), "goblin");
    assert_eq!(image_name("map.final.jpeg", NONE), "map.final");
}

#[test]
fn image_name_without_extension_is_kept() {
    assert_eq!(image_name("goblin", NONE), "goblin");
    assert_eq!(image_name("goblin.", NONE), "goblin.");
}

#[test]
fn image_name_numbers_collisions() {
    assert_eq!(image_name("goblin.png", ["goblin"]), "goblin (1)");
    assert_eq!(image_name("goblin.png", ["goblin", "goblin (1)"]), "goblin (2)");
}

#[test]
fn image_name_continues_after_highest_suffix() {
    assert_eq!(image_name("goblin.png", ["goblin (4)", "goblin"]), "goblin (5)");
}

#[test]
fn image_name_ignores_other_images() {
    assert_eq!(image_name("goblin.png", ["goblins", "orc", "goblin (x)"]), "goblin");
}

// =============================================================
// Token names
// =============================================================

#[test]
fn first_token_is_numbered_zero() {
    assert_eq!(token_name("goblin", NONE), "<0> goblin");
}

#[test]
fn token_name_continues_after_highest_instance() {
    assert_eq!(token_name("goblin", ["<0> goblin"]), "<1> goblin");
    assert_eq!(token_name("goblin", ["<0> goblin", "<3> goblin"]), "<4> goblin");
}

#[test]
fn token_name_ignores_other_images() {
    assert_eq!(token_name("goblin", ["<5> orc", "<2> goblin (1)"]), "<0> goblin");
}

#[test]
fn token_name_handles_numbered_image_names() {
    assert_eq!(token_name("goblin (1)", ["<0> goblin (1)"]), "<1> goblin (1)");
}

#[test]
fn bare_image_name_counts_as_first_instance() {
    assert_eq!(token_name("goblin", ["goblin"]), "<1> goblin");
}

#[test]
fn malformed_prefix_is_ignored() {
    assert_eq!(token_name("goblin", ["<a> goblin", "<> goblin", "<1>goblin"]), "<0> goblin");
}

#[test]
fn dotfile_keeps_its_name() {
    assert_eq!(image_name(".png", NONE), ".png");
    assert_eq!(image_name(".png", [".png"]), ".png (1)");
}

// =============================================================
// Counter limits
// =============================================================

#[test]
fn image_suffix_at_limit_is_not_reissued() {
    assert_eq!(image_name("img.png", ["img (4294967295)"]), "img");
    assert_eq!(image_name("img.png", ["img (4294967295)", "img"]), "img (1)");
}

#[test]
fn token_instance_at_limit_is_not_reissued() {
    assert_eq!(token_name("img", ["<4294967295> img"]), "<0> img");
    assert_eq!(token_name("img", ["<4294967295> img", "<2> img"]), "<3> img");
}
