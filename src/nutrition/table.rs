use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Macro values for a 100 g canonical serving.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct NutrientRecord {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

impl NutrientRecord {
    pub const fn new(calories: f64, protein: f64, fat: f64, carbs: f64) -> Self {
        Self { calories, protein, fat, carbs }
    }
}

/// Ingredient name -> per-100g record, iterated in insertion order.
///
/// The containment scan of the estimator walks entries in this order and takes the first hit,
/// so the order is observable.
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    entries: Vec<(String, NutrientRecord)>,
    positions: HashMap<String, usize>,
}

impl NutritionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new key, or replaces the record of an existing key without moving it.
    pub fn insert(&mut self, name: impl Into<String>, record: NutrientRecord) {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&pos) => self.entries[pos].1 = record,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, record));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&NutrientRecord> {
        self.positions.get(name).map(|&pos| &self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NutrientRecord)> {
        self.entries.iter().map(|(name, record)| (name.as_str(), record))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedded table of common ingredients used when no reference dataset is available.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (name, record) in DEFAULT_INGREDIENTS {
            table.insert(*name, *record);
        }
        table
    }
}

const DEFAULT_INGREDIENTS: &[(&str, NutrientRecord)] = &[
    // Proteins
    ("chicken breast", NutrientRecord::new(165.0, 31.0, 3.6, 0.0)),
    ("chicken", NutrientRecord::new(165.0, 31.0, 3.6, 0.0)),
    ("beef", NutrientRecord::new(250.0, 26.0, 15.0, 0.0)),
    ("pork", NutrientRecord::new(242.0, 27.0, 14.0, 0.0)),
    ("fish", NutrientRecord::new(206.0, 22.0, 12.0, 0.0)),
    ("salmon", NutrientRecord::new(208.0, 20.0, 13.0, 0.0)),
    ("tuna", NutrientRecord::new(144.0, 30.0, 1.0, 0.0)),
    ("egg", NutrientRecord::new(155.0, 13.0, 11.0, 1.1)),
    ("tofu", NutrientRecord::new(76.0, 8.0, 4.8, 1.9)),
    // Carbs
    ("rice", NutrientRecord::new(130.0, 2.7, 0.3, 28.0)),
    ("pasta", NutrientRecord::new(131.0, 5.0, 1.1, 25.0)),
    ("bread", NutrientRecord::new(265.0, 9.0, 3.2, 49.0)),
    ("potato", NutrientRecord::new(77.0, 2.0, 0.1, 17.0)),
    ("sweet potato", NutrientRecord::new(86.0, 1.6, 0.1, 20.0)),
    ("oats", NutrientRecord::new(389.0, 17.0, 7.0, 66.0)),
    ("quinoa", NutrientRecord::new(120.0, 4.4, 1.9, 21.0)),
    // Vegetables
    ("broccoli", NutrientRecord::new(34.0, 2.8, 0.4, 7.0)),
    ("tomato", NutrientRecord::new(18.0, 0.9, 0.2, 3.9)),
    ("spinach", NutrientRecord::new(23.0, 2.9, 0.4, 3.6)),
    ("carrot", NutrientRecord::new(41.0, 0.9, 0.2, 10.0)),
    ("lettuce", NutrientRecord::new(15.0, 1.4, 0.2, 2.9)),
    ("onion", NutrientRecord::new(40.0, 1.1, 0.1, 9.3)),
    ("bell pepper", NutrientRecord::new(31.0, 1.0, 0.3, 6.0)),
    // Dairy
    ("milk", NutrientRecord::new(42.0, 3.4, 1.0, 5.0)),
    ("cheese", NutrientRecord::new(402.0, 25.0, 33.0, 1.3)),
    ("yogurt", NutrientRecord::new(59.0, 10.0, 0.4, 3.6)),
    ("butter", NutrientRecord::new(717.0, 0.9, 81.0, 0.1)),
    // Prepared foods
    ("pizza", NutrientRecord::new(266.0, 11.0, 10.0, 33.0)),
    ("burger", NutrientRecord::new(295.0, 17.0, 14.0, 24.0)),
    ("sandwich", NutrientRecord::new(220.0, 12.0, 8.0, 25.0)),
    ("salad", NutrientRecord::new(50.0, 3.0, 2.0, 7.0)),
    ("soup", NutrientRecord::new(40.0, 2.0, 1.0, 6.0)),
    // Fruits
    ("apple", NutrientRecord::new(52.0, 0.3, 0.2, 14.0)),
    ("banana", NutrientRecord::new(89.0, 1.1, 0.3, 23.0)),
    ("orange", NutrientRecord::new(47.0, 0.9, 0.1, 12.0)),
    ("strawberry", NutrientRecord::new(32.0, 0.7, 0.3, 7.7)),
    // Fats & oils
    ("olive oil", NutrientRecord::new(884.0, 0.0, 100.0, 0.0)),
    ("avocado", NutrientRecord::new(160.0, 2.0, 15.0, 9.0)),
    ("nuts", NutrientRecord::new(607.0, 21.0, 54.0, 16.0)),
];
