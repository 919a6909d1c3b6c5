//! Medical dataset descriptors and SQLite access.
//!
//! Three fixed, non-overlapping datasets are supported: heart disease,
//! cancer, and diabetes. Each loads from one CSV into one SQLite table.

mod loader;
mod store;

pub use loader::{DatasetLoader, LoadReport};
pub use store::DatasetStore;

use serde::{Deserialize, Serialize};

/// One of the three fixed medical datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    HeartDisease,
    Cancer,
    Diabetes,
}

impl Dataset {
    /// All datasets, in setup order.
    pub fn all() -> [Dataset; 3] {
        [Dataset::HeartDisease, Dataset::Cancer, Dataset::Diabetes]
    }

    /// Stable key used for file names and default table names.
    pub fn key(&self) -> &'static str {
        match self {
            Dataset::HeartDisease => "heart_disease",
            Dataset::Cancer => "cancer",
            Dataset::Diabetes => "diabetes",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Dataset::HeartDisease => "Heart Disease",
            Dataset::Cancer => "Cancer",
            Dataset::Diabetes => "Diabetes",
        }
    }

    /// Default CSV file name within the datasets directory.
    pub fn default_csv_file(&self) -> &'static str {
        match self {
            Dataset::HeartDisease => "heart.csv",
            Dataset::Cancer => "The_Cancer_data_1500_V2.csv",
            Dataset::Diabetes => "diabetes.csv",
        }
    }

    /// Column reference for the dataset, included in the tool description so
    /// the model can write SQL against the fixed schema.
    pub fn schema_notes(&self) -> &'static str {
        match self {
            Dataset::HeartDisease => {
                "Columns: age (years), sex (1=male, 0=female), cp (chest pain type 0-3), \
                 trestbps (resting blood pressure), chol (serum cholesterol), \
                 fbs (fasting blood sugar > 120 mg/dl, 1/0), restecg (resting ECG 0-2), \
                 thalach (max heart rate), exang (exercise-induced angina, 1/0), \
                 oldpeak (ST depression), slope (0-2), ca (major vessels 0-3), \
                 thal (0-3), target (1=heart disease present, 0=absent)"
            }
            Dataset::Cancer => {
                "Columns: Age (years), Gender (0=male, 1=female), BMI, Smoking (1/0), \
                 GeneticRisk (0=low, 1=medium, 2=high), PhysicalActivity (hours/week), \
                 AlcoholIntake (units/week), CancerHistory (1/0), \
                 Diagnosis (1=cancer, 0=no cancer)"
            }
            Dataset::Diabetes => {
                "Columns: Pregnancies, Glucose (plasma glucose), BloodPressure (diastolic), \
                 SkinThickness (mm), Insulin (serum insulin), BMI, \
                 DiabetesPedigreeFunction, Age (years), Outcome (1=diabetic, 0=not)"
            }
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_keys_are_distinct() {
        let keys: Vec<_> = Dataset::all().iter().map(|d| d.key()).collect();
        assert_eq!(keys, vec!["heart_disease", "cancer", "diabetes"]);
    }

    #[test]
    fn test_schema_notes_mention_label_column() {
        assert!(Dataset::HeartDisease.schema_notes().contains("target"));
        assert!(Dataset::Cancer.schema_notes().contains("Diagnosis"));
        assert!(Dataset::Diabetes.schema_notes().contains("Outcome"));
    }
}
