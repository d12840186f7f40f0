//! Core types used throughout the domain layer
//!
//! This module defines the shop categories, the item catalogs that belong to
//! them, and the `StockItem` observed in a shop listing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use crate::domain::DomainError;

/// Known seed names, in shop order
pub const SEED_NAMES: &[&str] = &[
    "Carrot",
    "Strawberry",
    "Blueberry",
    "Orange Tulip",
    "Tomato",
    "Daffodil",
    "Watermelon",
    "Pumpkin",
    "Apple",
    "Bamboo",
    "Coconut",
    "Cactus",
    "Dragon Fruit",
    "Mango",
    "Grape",
    "Mushroom",
    "Pepper",
    "Cacao",
    "Beanstalk",
    "Ember Lily",
    "Sugar Apple",
    "Burning Bud",
    "Giant Pinecone",
    "Elder Strawberry",
];

/// Known gear names, in shop order
pub const GEAR_NAMES: &[&str] = &[
    "Watering Can",
    "Trading Ticket",
    "Trowel",
    "Recall Wrench",
    "Basic Sprinkler",
    "Advanced Sprinkler",
    "Medium Toy",
    "Medium Treat",
    "Godly Sprinkler",
    "Magnifying Glass",
    "Master Sprinkler",
    "Cleaning Spray",
    "Favorite Tool",
    "Harvest Tool",
    "Friendship Pot",
    "Grandmaster Sprinkler",
    "Levelup Lollipop",
];

/// Known egg names, in shop order
pub const EGG_NAMES: &[&str] = &[
    "Common Egg",
    "Common Summer Egg",
    "Rare Summer Egg",
    "Mythical Egg",
    "Paradise Egg",
    "Bug Egg",
];

/// The three shops the collector polls
///
/// Every category has its own store file per day and its own report block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Seeds,
    Gear,
    Eggs,
}

impl Category {
    /// All categories in the order they are loaded, reported and displayed
    pub const ALL: [Category; 3] = [Category::Seeds, Category::Gear, Category::Eggs];

    /// Lowercase name, also the API path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Seeds => "seeds",
            Category::Gear => "gear",
            Category::Eggs => "eggs",
        }
    }

    /// Name of the per-day store file for this category
    pub fn file_name(&self) -> &'static str {
        match self {
            Category::Seeds => "seeds_stock.txt",
            Category::Gear => "gear_stock.txt",
            Category::Eggs => "eggs_stock.txt",
        }
    }

    /// Singular label used in alert messages
    pub fn item_label(&self) -> &'static str {
        match self {
            Category::Seeds => "Seed",
            Category::Gear => "Gear",
            Category::Eggs => "Egg",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Seeds => "🌱",
            Category::Gear => "🔧",
            Category::Eggs => "🥚",
        }
    }

    /// Catalog of item names the shop is known to sell
    ///
    /// Used for reference only. Unknown names are still stored.
    pub fn catalog(&self) -> &'static [&'static str] {
        match self {
            Category::Seeds => SEED_NAMES,
            Category::Gear => GEAR_NAMES,
            Category::Eggs => EGG_NAMES,
        }
    }

    pub fn is_known_item(&self, name: &str) -> bool {
        self.catalog().contains(&name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "seeds" | "seed" => Ok(Category::Seeds),
            "gear" => Ok(Category::Gear),
            "eggs" | "egg" => Ok(Category::Eggs),
            other => Err(DomainError::InvalidCategory(other.to_string())),
        }
    }
}

/// One line of a shop listing
///
/// Field order matters: serialized snapshots are written with sorted keys,
/// and `name` < `quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub name: String,
    pub quantity: u64,
}

impl StockItem {
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Holds one value per category
///
/// Replaces loose `{"seeds": .., "gear": .., "eggs": ..}` maps so a missing
/// category is impossible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerCategory<T> {
    pub seeds: T,
    pub gear: T,
    pub eggs: T,
}

impl<T> PerCategory<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            seeds: f(Category::Seeds),
            gear: f(Category::Gear),
            eggs: f(Category::Eggs),
        }
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Seeds => &self.seeds,
            Category::Gear => &self.gear,
            Category::Eggs => &self.eggs,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Seeds => &mut self.seeds,
            Category::Gear => &mut self.gear,
            Category::Eggs => &mut self.eggs,
        }
    }

    /// Iterate in `Category::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}
