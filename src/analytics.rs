//! # Analytics
//!
//! Fixed aggregates over the dataset, selected by metric name. Every metric
//! is a pure function of the [`DatasetStore`], so repeated calls return
//! identical results.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::dataset::DatasetStore;
use crate::errors::AssistantError;

const REVENUE_YEAR: i32 = 2017;
const REVENUE_MONTH: &str = "July";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalRevenueJuly2017,
    HighestCancellations,
    AverageBookingPrice,
}

impl FromStr for Metric {
    type Err = AssistantError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "total_revenue_july_2017" => Ok(Metric::TotalRevenueJuly2017),
            "highest_cancellations" => Ok(Metric::HighestCancellations),
            "average_booking_price" => Ok(Metric::AverageBookingPrice),
            _ => Err(AssistantError::InvalidMetric { metric: name.to_string() }),
        }
    }
}

/// Response body of a metric. Serializes to a single-key object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricReport {
    TotalRevenue { total_revenue: f64 },
    /// Canceled bookings per hotel, most canceled first.
    HighestCancellations { highest_cancellations: Map<String, Value> },
    /// `None` when no row carries a rate.
    AveragePrice { average_price: Option<f64> },
}

pub fn compute_metric(store: &DatasetStore, metric: Metric) -> MetricReport {
    match metric {
        Metric::TotalRevenueJuly2017 => MetricReport::TotalRevenue {
            total_revenue: total_revenue(store, REVENUE_YEAR, REVENUE_MONTH),
        },
        Metric::HighestCancellations => MetricReport::HighestCancellations {
            highest_cancellations: cancellations_by_hotel(store),
        },
        Metric::AverageBookingPrice => MetricReport::AveragePrice {
            average_price: average_rate(store),
        },
    }
}

fn total_revenue(store: &DatasetStore, year: i32, month: &str) -> f64 {
    store
        .records()
        .iter()
        .filter(|r| r.arrival_date_year == Some(year) && r.arrival_date_month == month)
        .filter_map(|r| r.adr)
        .sum()
}

fn cancellations_by_hotel(store: &DatasetStore) -> Map<String, Value> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for record in store.records().iter().filter(|r| r.is_canceled) {
        *counts.entry(record.hotel.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    ranked
        .into_iter()
        .map(|(hotel, count)| (hotel.to_string(), Value::from(count)))
        .collect()
}

// Mean over the rows that carry a rate.
fn average_rate(store: &DatasetStore) -> Option<f64> {
    let (sum, count) = store
        .records()
        .iter()
        .filter_map(|r| r.adr)
        .fold((0.0, 0usize), |(sum, count), adr| (sum + adr, count + 1));

    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}
