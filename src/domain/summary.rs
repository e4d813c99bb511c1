//! Batch aggregation over evaluation results.

use serde::Serialize;

use crate::domain::evaluator::{EvaluationResult, round_to};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatchSummary {
    pub overall_avg_profit: f64,
    pub realized_count: usize,
    pub unrealized_count: usize,
    pub avg_realized_days: f64,
}

impl BatchSummary {
    pub fn compute(results: &[EvaluationResult]) -> Self {
        let realized: Vec<&EvaluationResult> = results.iter().filter(|r| r.realized).collect();

        let overall_avg_profit = mean(results.iter().map(|r| r.profit_percent))
            .map(|m| round_to(m, 2))
            .unwrap_or(0.0);
        let avg_realized_days = mean(realized.iter().map(|r| f64::from(r.days_held)))
            .map(|m| round_to(m, 1))
            .unwrap_or(0.0);

        Self {
            overall_avg_profit,
            realized_count: realized.len(),
            unrealized_count: results.len() - realized.len(),
            avg_realized_days,
        }
    }

    pub fn total(&self) -> usize {
        self.realized_count + self.unrealized_count
    }
}

/// Summary plus the realized and unrealized result lists, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub realized_list: Vec<EvaluationResult>,
    pub unrealized_list: Vec<EvaluationResult>,
}

impl BatchReport {
    pub fn from_results(results: Vec<EvaluationResult>) -> Self {
        let summary = BatchSummary::compute(&results);
        let (realized_list, unrealized_list) = results.into_iter().partition(|r| r.realized);
        Self {
            summary,
            realized_list,
            unrealized_list,
        }
    }
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
