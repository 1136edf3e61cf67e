use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use super::neighbors::NeighborIndex;
use crate::profile::UserProfile;

pub const DEFAULT_STRATEGY: &str = "Balanced";
pub const DEFAULT_NEIGHBORS: usize = 5;
pub const DEFAULT_LABEL_COLUMN: &str = "Diet_Recommendation";
pub const DEFAULT_FEATURES: &[&str] = &["Age", "Weight_kg", "Height_cm", "BMI"];

/// Offline-built neighbor artifact: which profile features it was built on, which dataset column
/// holds the label, and how many neighbors vote.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StrategyModel {
    pub features: Vec<String>,
    pub label_column: String,
    pub k: usize,
    pub index: NeighborIndex,
}

impl StrategyModel {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read strategy model at {:?}", path))?;
        let model: StrategyModel = bincode::deserialize(&bytes)
            .with_context(|| format!("Failed to decode strategy model at {:?}", path))?;
        if model.index.dimension() != model.features.len() {
            anyhow::bail!(
                "Strategy model is inconsistent: {} features but index dimension {}",
                model.features.len(),
                model.index.dimension()
            );
        }
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self).context("Failed to encode strategy model")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        std::fs::write(path, bytes).with_context(|| format!("Failed to write strategy model to {:?}", path))
    }

    /// Builds the artifact from a historical dataset CSV.
    ///
    /// Missing or unparseable numeric cells count as 0. When one of `features` is not a column
    /// of the dataset, every numeric column other than the label is used instead.
    pub fn fit_from_csv(csv_path: &Path, features: &[String], label_column: &str, k: usize) -> Result<Self> {
        let file = std::fs::File::open(csv_path)
            .with_context(|| format!("Failed to open strategy dataset at {:?}", csv_path))?;
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let records = rdr
            .records()
            .enumerate()
            .map(|(row_index, r)| r.with_context(|| format!("Failed to read record at row index {}", row_index)))
            .collect::<Result<Vec<_>>>()?;

        let label_idx = headers
            .iter()
            .position(|h| h == label_column)
            .ok_or_else(|| anyhow::anyhow!("Label column '{}' not found", label_column))?;

        let missing: Vec<&String> = features.iter().filter(|f| !headers.contains(f)).collect();
        let chosen: Vec<String> = if missing.is_empty() {
            features.to_vec()
        } else {
            warn!("Dataset missing feature columns {:?}, falling back to all numeric columns", missing);
            headers
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != label_idx)
                .filter(|(idx, _)| {
                    records.iter().all(|record| {
                        let cell = record.get(*idx).unwrap_or("").trim();
                        cell.is_empty() || cell.parse::<f64>().is_ok()
                    })
                })
                .map(|(_, name)| name.clone())
                .collect()
        };
        if chosen.is_empty() {
            anyhow::bail!("No usable numeric feature columns in {:?}", csv_path);
        }

        let feature_idx: Vec<usize> = chosen
            .iter()
            .filter_map(|name| headers.iter().position(|h| h == name))
            .collect();

        let mut index = NeighborIndex::new(chosen.len());
        for record in &records {
            let label = record.get(label_idx).unwrap_or("").trim();
            if label.is_empty() {
                continue;
            }
            let row = feature_idx
                .iter()
                .map(|&idx| record.get(idx).and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0))
                .collect();
            index.add(row, label.to_string())?;
        }
        if index.is_empty() {
            anyhow::bail!("No labelled rows loaded from {:?}", csv_path);
        }

        info!(rows = index.len(), features = ?chosen, "Strategy model fitted");
        Ok(Self { features: chosen, label_column: label_column.to_string(), k, index })
    }
}

fn feature_value(profile: &UserProfile, name: &str) -> Option<f64> {
    match name {
        "Age" => Some(f64::from(profile.age)),
        "Weight_kg" => Some(profile.weight_kg),
        "Height_cm" => Some(profile.height_cm),
        "BMI" => Some(profile.bmi()),
        _ => None,
    }
}

/// Most frequent label; ties go to the lexicographically smallest label.
pub fn majority_label<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels.into_iter().filter(|l| !l.trim().is_empty()) {
        *counts.entry(label).or_insert(0) += 1;
    }
    // BTreeMap iterates in ascending key order; keep the first maximum
    let mut best: Option<(&str, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Maps a profile to a diet strategy label. Never fails: a missing model, a feature the profile
/// cannot provide, or a lookup error all yield [`DEFAULT_STRATEGY`].
#[derive(Debug, Clone, Default)]
pub struct StrategyClassifier {
    model: Option<StrategyModel>,
}

impl StrategyClassifier {
    pub fn new(model: Option<StrategyModel>) -> Self {
        Self { model }
    }

    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::new(None);
        };
        match StrategyModel::load(path) {
            Ok(model) => {
                info!(rows = model.index.len(), k = model.k, "Strategy model loaded from {:?}", path);
                Self::new(Some(model))
            }
            Err(e) => {
                warn!("Strategy model unavailable ({:#}), classifier defaults to {}", e, DEFAULT_STRATEGY);
                Self::new(None)
            }
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn classify(&self, profile: &UserProfile) -> String {
        let Some(model) = &self.model else {
            return DEFAULT_STRATEGY.to_string();
        };
        match Self::vote(model, profile) {
            Ok(Some(label)) => {
                debug!(strategy = %label, age = profile.age, weight_kg = profile.weight_kg, "Strategy predicted");
                label
            }
            Ok(None) => DEFAULT_STRATEGY.to_string(),
            Err(e) => {
                warn!("Strategy classification failed ({:#}), using {}", e, DEFAULT_STRATEGY);
                DEFAULT_STRATEGY.to_string()
            }
        }
    }

    fn vote(model: &StrategyModel, profile: &UserProfile) -> Result<Option<String>> {
        let mut query = Vec::with_capacity(model.features.len());
        for feature in &model.features {
            match feature_value(profile, feature) {
                Some(value) => query.push(value),
                None => {
                    debug!(feature = %feature, "Profile cannot provide model feature");
                    return Ok(None);
                }
            }
        }
        let neighbors = model.index.nearest(&query, model.k)?;
        let labels = neighbors.iter().filter_map(|&idx| model.index.label(idx));
        Ok(majority_label(labels).map(String::from))
    }
}
