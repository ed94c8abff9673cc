//! Label-to-emoji annotation.
//!
//! A label is lower-cased and tested against [`CATEGORY_RULES`] in order. A
//! rule matches when any of its keywords is a substring of the label, and the
//! first matching rule wins. Rule order is therefore part of the behavior:
//! `"hot dog"` is annotated as an animal because the animal rule (which
//! contains `"dog"`) is checked before the food rule.

use serde::Serialize;

/// Emoji returned when no rule matches
pub const FALLBACK_EMOJI: &str = "❓";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Animal,
    Food,
    Vehicle,
    Nature,
    Person,
    Electronics,
    Building,
}

/// One entry of the ordered annotation table
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
    pub emoji: &'static str,
}

impl CategoryRule {
    /// `lowered` must already be lower-case.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }
}

pub static CATEGORY_RULES: [CategoryRule; 7] = [
    CategoryRule {
        category: Category::Animal,
        keywords: &[
            "dog", "cat", "bird", "fish", "bear", "lion", "tiger",
            "elephant", "monkey", "horse", "cow", "sheep", "pig",
            "rabbit", "fox", "wolf", "deer", "zebra", "giraffe",
            "panda", "koala", "kangaroo", "penguin", "owl",
        ],
        emoji: "🐾",
    },
    CategoryRule {
        category: Category::Food,
        keywords: &[
            "food", "pizza", "burger", "sandwich", "hot dog", "taco",
            "coffee", "tea", "juice", "ice cream", "cake", "cookie",
            "bread", "pasta", "salad", "soup", "rice", "noodle",
            "fruit", "apple", "banana", "orange", "strawberry",
        ],
        emoji: "🍽️",
    },
    CategoryRule {
        category: Category::Vehicle,
        keywords: &[
            "car", "truck", "bus", "vehicle", "automobile",
            "airplane", "aircraft", "helicopter", "train", "subway",
            "boat", "ship", "motorcycle", "bicycle", "scooter",
        ],
        emoji: "🚗",
    },
    CategoryRule {
        category: Category::Nature,
        keywords: &[
            "tree", "plant", "flower", "rose", "grass", "leaf",
            "mountain", "forest", "beach", "ocean", "river", "lake",
        ],
        emoji: "🌿",
    },
    CategoryRule {
        category: Category::Person,
        keywords: &[
            "person", "people", "man", "woman", "child", "boy", "girl",
            "face", "human",
        ],
        emoji: "👤",
    },
    CategoryRule {
        category: Category::Electronics,
        keywords: &[
            "phone", "computer", "laptop", "tablet", "monitor", "keyboard",
            "mouse", "camera", "television", "tv", "remote", "headphone",
            "speaker", "console", "device", "electronic",
        ],
        emoji: "💻",
    },
    CategoryRule {
        category: Category::Building,
        keywords: &[
            "building", "house", "castle", "church", "temple", "tower",
            "bridge", "monument", "stadium",
        ],
        emoji: "🏢",
    },
];

/// Returns the first rule matching `label`, case-insensitively.
pub fn rule_for(label: &str) -> Option<&'static CategoryRule> {
    let lowered = label.to_lowercase();
    CATEGORY_RULES.iter().find(|rule| rule.matches(&lowered))
}

pub fn category_for(label: &str) -> Option<Category> {
    rule_for(label).map(|rule| rule.category)
}

/// Emoji for a classifier label, or [`FALLBACK_EMOJI`] when nothing matches.
pub fn emoji_for(label: &str) -> &'static str {
    rule_for(label).map_or(FALLBACK_EMOJI, |rule| rule.emoji)
}
