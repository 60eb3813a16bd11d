//! Pipeline Configuration
//! File names, column names and category markers for one accident year.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// The four source tables, in join order after the accident base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Dataset {
    Accidents,
    Drivers,
    Passengers,
    Pedestrians,
}

impl Dataset {
    /// Lower-case label, also used as the join collision suffix.
    pub fn label(self) -> &'static str {
        match self {
            Dataset::Accidents => "accident",
            Dataset::Drivers => "driver",
            Dataset::Passengers => "passenger",
            Dataset::Pedestrians => "pedestrian",
        }
    }

    /// Suffix appended to right-table columns that collide during a join.
    pub fn collision_suffix(self) -> String {
        format!("_{}", self.label())
    }
}

/// Column names of the source data.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnNames {
    pub accident_id: String,
    pub vehicle_id: String,
    pub vehicle_category: String,
    pub timestamp: String,
    pub gender: String,
    pub injury: String,
    pub month: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            accident_id: "Id. Acidente".to_string(),
            vehicle_id: "Id. Veículo".to_string(),
            vehicle_category: "Categoria Veículos".to_string(),
            timestamp: "Datahora".to_string(),
            gender: "Sexo".to_string(),
            injury: "Lesões a 30 dias".to_string(),
            month: "Mês".to_string(),
        }
    }
}

/// Output file names.
#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub merged: String,
    pub small_motorcycles: String,
    pub large_motorcycles: String,
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            merged: "merged_cleaned_accidents_2023.csv".to_string(),
            small_motorcycles: "motorcycles_125cc_or_less_2023.csv".to_string(),
            large_motorcycles: "motorcycles_over_125cc_2023.csv".to_string(),
        }
    }
}

/// Settings for one pipeline/verifier run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub accidents_file: String,
    pub drivers_file: String,
    pub passengers_file: String,
    pub pedestrians_file: String,
    pub outputs: OutputFiles,
    pub columns: ColumnNames,
    pub small_marker: String,
    pub large_marker: String,
    /// Report the vehicle category distribution before splitting.
    pub inspect_categories: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            accidents_file: "acidentes_2023.csv".to_string(),
            drivers_file: "condutores_2023.csv".to_string(),
            passengers_file: "passageiros_2023.csv".to_string(),
            pedestrians_file: "peões_2023.csv".to_string(),
            outputs: OutputFiles::default(),
            columns: ColumnNames::default(),
            small_marker: "Motociclo cilindrada <= 125cc".to_string(),
            large_marker: "Motociclo cilindrada > 125cc".to_string(),
            inspect_categories: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn input_path(&self, dataset: Dataset) -> PathBuf {
        let name = match dataset {
            Dataset::Accidents => &self.accidents_file,
            Dataset::Drivers => &self.drivers_file,
            Dataset::Passengers => &self.passengers_file,
            Dataset::Pedestrians => &self.pedestrians_file,
        };
        self.data_dir.join(name)
    }

    pub fn merged_path(&self) -> PathBuf {
        self.data_dir.join(&self.outputs.merged)
    }

    pub fn small_motorcycles_path(&self) -> PathBuf {
        self.data_dir.join(&self.outputs.small_motorcycles)
    }

    pub fn large_motorcycles_path(&self) -> PathBuf {
        self.data_dir.join(&self.outputs.large_motorcycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffixes_follow_one_convention() {
        assert_eq!(Dataset::Drivers.collision_suffix(), "_driver");
        assert_eq!(Dataset::Passengers.collision_suffix(), "_passenger");
        assert_eq!(Dataset::Pedestrians.collision_suffix(), "_pedestrian");
    }

    #[test]
    fn paths_are_resolved_under_data_dir() {
        let config = PipelineConfig::default().with_data_dir("/tmp/run");
        assert_eq!(
            config.input_path(Dataset::Pedestrians),
            PathBuf::from("/tmp/run/peões_2023.csv")
        );
        assert_eq!(
            config.merged_path(),
            PathBuf::from("/tmp/run/merged_cleaned_accidents_2023.csv")
        );
    }
}
