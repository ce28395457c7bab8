//! Shared fixtures for unit tests

use crate::database::{ClothingCategory, ClothingItem, ImageRef, NewClothingItem};

/// 1x1 transparent PNG
pub const PNG_1X1: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

pub fn sample_image() -> ImageRef {
    ImageRef::new("image/png", PNG_1X1)
}

pub fn new_item(name: &str, category: ClothingCategory) -> NewClothingItem {
    NewClothingItem {
        name: name.to_string(),
        category,
        image: sample_image(),
    }
}

pub fn sample_item(name: &str, category: ClothingCategory) -> ClothingItem {
    new_item(name, category).into_item()
}
