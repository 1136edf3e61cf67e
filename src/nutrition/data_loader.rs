use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use super::table::{NutrientRecord, NutritionTable};

// CSV column headers
const NAME_COL: &str = "Name";
const KCAL_COL: &str = "kcal/100g";
const PROTEIN_COL: &str = "Protein (g/100g)";
const FAT_COL: &str = "Fat (g/100g)";
const CARB_COL: &str = "Carbohydrate (g/100g)";

// FoodData Central nutrient ids
const FDC_ENERGY_KCAL: u32 = 1008;
const FDC_PROTEIN: u32 = 1003;
const FDC_FAT: u32 = 1004;
const FDC_CARBOHYDRATE: u32 = 1005;

#[derive(Debug, Deserialize)]
struct FoodDataCentralFile {
    #[serde(rename = "FoundationFoods", default)]
    foundation_foods: Vec<FoundationFood>,
}

#[derive(Debug, Deserialize)]
struct FoundationFood {
    #[serde(default)]
    description: String,
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(default)]
    nutrient: Option<NutrientInfo>,
    #[serde(default)]
    amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NutrientInfo {
    id: Option<u32>,
}

fn parse_f64_or_zero(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

/// Reads reference entries from either a FoodData Central foundation-foods JSON export or a
/// CSV file (chosen by extension). Names are lowercased.
pub fn load_reference_entries(path: &Path) -> Result<Vec<(String, NutrientRecord)>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Nutrition reference file not found at: {:?}", path));
    }
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if is_csv {
        load_reference_csv(path)
    } else {
        load_fooddata_central_json(path)
    }
}

pub fn load_fooddata_central_json(path: &Path) -> Result<Vec<(String, NutrientRecord)>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read FoodData Central file at {:?}", path))?;
    let data: FoodDataCentralFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse FoodData Central JSON at {:?}", path))?;

    let entries: Vec<(String, NutrientRecord)> = data
        .foundation_foods
        .into_iter()
        .filter(|food| !food.description.trim().is_empty())
        .map(|food| {
            let mut record = NutrientRecord::default();
            for food_nutrient in &food.food_nutrients {
                let id = food_nutrient.nutrient.as_ref().and_then(|n| n.id);
                let amount = food_nutrient.amount.unwrap_or(0.0);
                match id {
                    Some(FDC_ENERGY_KCAL) => record.calories = amount,
                    Some(FDC_PROTEIN) => record.protein = amount,
                    Some(FDC_FAT) => record.fat = amount,
                    Some(FDC_CARBOHYDRATE) => record.carbs = amount,
                    _ => {}
                }
            }
            (food.description.trim().to_lowercase(), record)
        })
        .collect();

    if entries.is_empty() {
        return Err(anyhow::anyhow!("No FoundationFoods entries loaded from {:?}", path));
    }
    Ok(entries)
}

pub fn load_reference_csv(path: &Path) -> Result<Vec<(String, NutrientRecord)>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open nutrition CSV file at {:?}", path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    };
    let name_idx = column(NAME_COL)?;
    let kcal_idx = column(KCAL_COL)?;
    let protein_idx = column(PROTEIN_COL)?;
    let fat_idx = column(FAT_COL)?;
    let carb_idx = column(CARB_COL)?;

    let mut entries = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;
        let name = record.get(name_idx).unwrap_or("").trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        let value = |idx: usize| record.get(idx).map(parse_f64_or_zero).unwrap_or(0.0);
        entries.push((
            name,
            NutrientRecord::new(value(kcal_idx), value(protein_idx), value(fat_idx), value(carb_idx)),
        ));
    }

    if entries.is_empty() {
        return Err(anyhow::anyhow!("No valid nutrition rows loaded from {:?}", path));
    }
    Ok(entries)
}

/// Builds the process-wide table: embedded defaults first, then the external dataset merged on
/// top. The flag reports whether the external dataset contributed.
///
/// Never fails; a missing or unreadable dataset leaves the defaults in place.
pub fn build_nutrition_table(path: Option<&Path>) -> (NutritionTable, bool) {
    let mut table = NutritionTable::with_defaults();
    let Some(path) = path else {
        info!("No nutrition reference dataset configured, using {} default ingredients", table.len());
        return (table, false);
    };

    match load_reference_entries(path) {
        Ok(entries) => {
            let merged = entries.len();
            for (name, record) in entries {
                table.insert(name, record);
            }
            info!(merged, total = table.len(), "Nutrition reference dataset loaded from {:?}", path);
            (table, true)
        }
        Err(e) => {
            warn!("Nutrition reference dataset unavailable ({:#}), using defaults only", e);
            (table, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn create_test_csv_file() -> Result<NamedTempFile> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "{},{},{},{},{}", NAME_COL, KCAL_COL, PROTEIN_COL, FAT_COL, CARB_COL)?;
        writeln!(file, "Lentils,116,9,0.4,20")?;
        writeln!(file, "Rice,,2.5,0.3,29")?; // Missing kcal
        writeln!(file, ",10,10,10,10")?; // Empty name
        file.flush()?;
        Ok(file)
    }

    #[test]
    fn test_load_reference_csv() -> Result<()> {
        let file = create_test_csv_file()?;
        let entries = load_reference_entries(file.path())?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "lentils");
        assert_eq!(entries[0].1, NutrientRecord::new(116.0, 9.0, 0.4, 20.0));
        assert_eq!(entries[1].1.calories, 0.0);
        Ok(())
    }

    #[test]
    fn test_load_reference_csv_missing_column() -> Result<()> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "{},{},{}", NAME_COL, PROTEIN_COL, FAT_COL)?;
        writeln!(file, "Apple,0.3,0.2")?;
        file.flush()?;

        let result = load_reference_entries(file.path());
        assert!(result.unwrap_err().to_string().contains(&format!("Column '{}' not found", KCAL_COL)));
        Ok(())
    }

    #[test]
    fn test_load_fooddata_central_json() -> Result<()> {
        let mut file = Builder::new().suffix(".json").tempfile()?;
        write!(
            file,
            r#"{{"FoundationFoods": [
                {{"description": "Hummus, commercial", "foodNutrients": [
                    {{"nutrient": {{"id": 1008}}, "amount": 229}},
                    {{"nutrient": {{"id": 1003}}, "amount": 7.35}},
                    {{"nutrient": {{"id": 1004}}, "amount": 17.1}},
                    {{"nutrient": {{"id": 1005}}, "amount": 14.9}},
                    {{"nutrient": {{"id": 1051}}, "amount": 57}}
                ]}}
            ]}}"#
        )?;
        file.flush()?;

        let entries = load_reference_entries(file.path())?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "hummus, commercial");
        assert_eq!(entries[0].1, NutrientRecord::new(229.0, 7.35, 17.1, 14.9));
        Ok(())
    }

    #[test]
    fn test_build_table_merges_over_defaults() -> Result<()> {
        let mut file = Builder::new().suffix(".csv").tempfile()?;
        writeln!(file, "{},{},{},{},{}", NAME_COL, KCAL_COL, PROTEIN_COL, FAT_COL, CARB_COL)?;
        writeln!(file, "Rice,111,2.6,0.9,23")?;
        writeln!(file, "Lentils,116,9,0.4,20")?;
        file.flush()?;

        let defaults = NutritionTable::with_defaults();
        let (table, loaded) = build_nutrition_table(Some(file.path()));
        assert!(loaded);
        assert_eq!(table.len(), defaults.len() + 1);
        assert_eq!(table.get("rice").map(|r| r.calories), Some(111.0));
        assert_eq!(table.iter().last().map(|(name, _)| name), Some("lentils"));
        // rice keeps its original slot
        let rice_pos = table.iter().position(|(name, _)| name == "rice");
        let default_pos = defaults.iter().position(|(name, _)| name == "rice");
        assert_eq!(rice_pos, default_pos);
        Ok(())
    }

    #[test]
    fn test_build_table_missing_file_falls_back() {
        let (table, loaded) = build_nutrition_table(Some(Path::new("this_file_does_not_exist.json")));
        assert!(!loaded);
        assert_eq!(table.len(), NutritionTable::with_defaults().len());
    }

    #[test]
    fn test_build_table_corrupt_json_falls_back() -> Result<()> {
        let mut file = Builder::new().suffix(".json").tempfile()?;
        write!(file, "{{not json")?;
        file.flush()?;
        let (table, loaded) = build_nutrition_table(Some(file.path()));
        assert!(!loaded);
        assert!(table.get("chicken breast").is_some());
        Ok(())
    }

    #[test]
    fn test_build_table_json_without_foundation_foods_falls_back() -> Result<()> {
        for contents in ["{}", r#"{"SRLegacyFoods": []}"#, r#"{"FoundationFoods": []}"#] {
            let mut file = Builder::new().suffix(".json").tempfile()?;
            write!(file, "{}", contents)?;
            file.flush()?;

            assert!(load_reference_entries(file.path()).is_err());
            let (table, loaded) = build_nutrition_table(Some(file.path()));
            assert!(!loaded, "{} reported as loaded", contents);
            assert_eq!(table.len(), NutritionTable::with_defaults().len());
        }
        Ok(())
    }
}
