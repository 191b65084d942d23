//! Label to surrogate-key dictionaries for categories and manufacturers.
//!
//! Lookups are exact string matches. A miss resolves to [`DEFAULT_KEY`], which
//! is also the key of the first entry in both built-in tables, so a miss cannot
//! be told apart from a real match in the emitted SQL.

use std::collections::HashMap;

use log::debug;

pub const DEFAULT_KEY: u32 = 1;

pub const DEFAULT_CATEGORIES: [(&str, u32); 15] = [
    ("テレビ", 1),
    ("冷蔵庫", 2),
    ("洗濯機", 3),
    ("エアコン", 4),
    ("電子レンジ", 5),
    ("掃除機", 6),
    ("オーディオ", 7),
    ("デジタルカメラ", 8),
    ("ノートパソコン", 9),
    ("タブレット", 10),
    ("スマートフォン", 11),
    ("炊飯器", 12),
    ("ドライヤー", 13),
    ("加湿器", 14),
    ("扇風機", 15),
];

pub const DEFAULT_MANUFACTURERS: [(&str, u32); 25] = [
    ("ソニー", 1),
    ("パナソニック", 2),
    ("シャープ", 3),
    ("東芝", 4),
    ("日立", 5),
    ("三菱電機", 6),
    ("アイリスオーヤマ", 7),
    ("ダイキン", 8),
    ("富士通", 9),
    ("キヤノン", 10),
    ("エプソン", 11),
    ("カシオ", 12),
    ("アップル", 13),
    ("サムスン", 14),
    ("LG", 15),
    ("ファーウェイ", 16),
    ("デル", 17),
    ("レノボ", 18),
    ("エイスース", 19),
    ("バルミューダ", 20),
    ("ダイソン", 21),
    ("フィリップス", 22),
    ("ブラウン", 23),
    ("タイガー", 24),
    ("象印", 25),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTable {
    name: &'static str,
    entries: HashMap<String, u32>,
}

impl LookupTable {
    pub fn new(name: &'static str, entries: HashMap<String, u32>) -> Self {
        Self { name, entries }
    }

    pub fn categories() -> Self {
        Self::from_pairs("category", &DEFAULT_CATEGORIES)
    }

    pub fn manufacturers() -> Self {
        Self::from_pairs("manufacturer", &DEFAULT_MANUFACTURERS)
    }

    fn from_pairs(name: &'static str, pairs: &[(&str, u32)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(label, key)| (label.to_string(), *key))
            .collect();
        Self { name, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<u32> {
        self.entries.get(label).copied()
    }

    /// Key for `label`, or [`DEFAULT_KEY`] when the label is unknown.
    pub fn resolve(&self, label: &str) -> u32 {
        self.get(label).unwrap_or_else(|| {
            debug!("Unknown {} label '{label}'; using key {DEFAULT_KEY}", self.name);
            DEFAULT_KEY
        })
    }
}
