//! Statistics Calculator Module
//! Frequency tables and guarded percentages for the accident reports.

use polars::prelude::*;
use serde::Serialize;

/// Number of months listed in a subset profile.
pub const TOP_MONTHS: usize = 5;

/// One label of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub label: String,
    pub count: usize,
}

/// Non-null value counts of a column, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrequencyTable {
    pub column: String,
    pub rows: Vec<Frequency>,
}

impl FrequencyTable {
    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.rows.iter().map(|f| f.count).sum()
    }

    /// The `n` most frequent labels.
    pub fn top(&self, n: usize) -> &[Frequency] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Share of `part` in `base` as a percentage; `None` when `base` is zero.
pub fn percent_of(part: usize, base: usize) -> Option<f64> {
    if base == 0 {
        None
    } else {
        Some(part as f64 / base as f64 * 100.0)
    }
}

/// Profile of one motorcycle subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsetProfile {
    pub label: String,
    pub rows: usize,
    pub gender: Option<FrequencyTable>,
    pub injury: Option<FrequencyTable>,
    pub months: Option<FrequencyTable>,
}

/// Handles the descriptive statistics of the reports.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Count non-null values of `column`.
    ///
    /// Ordered by descending count, ties by ascending label.
    pub fn frequency(df: &DataFrame, column: &str) -> PolarsResult<FrequencyTable> {
        let counted = df
            .clone()
            .lazy()
            .select([col(column).cast(DataType::String)])
            .filter(col(column).is_not_null())
            .group_by([col(column)])
            .agg([len().alias("frequency")])
            .collect()?;

        let labels = counted.column(column)?.str()?;
        let counts = counted.column("frequency")?.cast(&DataType::UInt64)?;
        let counts = counts.u64()?;

        let mut rows: Vec<Frequency> = labels
            .into_iter()
            .zip(counts.into_iter())
            .filter_map(|(label, count)| {
                Some(Frequency {
                    label: label?.to_string(),
                    count: count? as usize,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

        Ok(FrequencyTable {
            column: column.to_string(),
            rows,
        })
    }

    /// Frequency table of `column`, or `None` if the table lacks it.
    pub fn frequency_if_present(
        df: &DataFrame,
        column: &str,
    ) -> PolarsResult<Option<FrequencyTable>> {
        if df.get_column_names().iter().any(|c| c.as_str() == column) {
            Self::frequency(df, column).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Gender, injury and top-month breakdown of a subset.
    pub fn profile_subset(
        label: &str,
        df: &DataFrame,
        gender_col: &str,
        injury_col: &str,
        month_col: &str,
    ) -> PolarsResult<SubsetProfile> {
        let months = Self::frequency_if_present(df, month_col)?.map(|mut table| {
            table.rows.truncate(TOP_MONTHS);
            table
        });

        Ok(SubsetProfile {
            label: label.to_string(),
            rows: df.height(),
            gender: Self::frequency_if_present(df, gender_col)?,
            injury: Self::frequency_if_present(df, injury_col)?,
            months,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_skip_nulls_and_sort_by_count() {
        let df = df!("Sexo" => [Some("M"), Some("F"), Some("M"), None, Some("M")]).unwrap();

        let table = StatsCalculator::frequency(&df, "Sexo").unwrap();

        assert_eq!(
            table.rows,
            vec![
                Frequency { label: "M".to_string(), count: 3 },
                Frequency { label: "F".to_string(), count: 1 },
            ]
        );
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn ties_are_ordered_by_label() {
        let df = df!("Mês" => ["Maio", "Abril", "Junho", "Abril", "Maio"]).unwrap();

        let table = StatsCalculator::frequency(&df, "Mês").unwrap();

        let labels: Vec<&str> = table.rows.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Abril", "Maio", "Junho"]);
        assert_eq!(table.top(2).len(), 2);
        assert_eq!(table.top(10).len(), 3);
    }

    #[test]
    fn percentage_is_guarded_against_zero_base() {
        assert_eq!(percent_of(0, 0), None);
        assert_eq!(percent_of(5, 0), None);
        assert_eq!(percent_of(1, 4), Some(25.0));
    }

    #[test]
    fn profile_includes_only_present_columns() {
        let months = ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jan"];
        let df = df!("Mês" => months, "Sexo" => ["M"; 7]).unwrap();

        let profile =
            StatsCalculator::profile_subset("<= 125cc", &df, "Sexo", "Lesões a 30 dias", "Mês")
                .unwrap();

        assert_eq!(profile.rows, 7);
        assert!(profile.injury.is_none());
        assert_eq!(profile.gender.unwrap().rows[0].count, 7);
        let months = profile.months.unwrap();
        assert_eq!(months.rows.len(), TOP_MONTHS);
        assert_eq!(months.rows[0].label, "Jan");
    }
}
