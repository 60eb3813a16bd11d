//! Stats module - Frequency tables and percentages

mod calculator;

pub use calculator::{
    percent_of, Frequency, FrequencyTable, StatsCalculator, SubsetProfile, TOP_MONTHS,
};
