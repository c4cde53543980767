//! Channel and segment revenue breakdowns.

use std::collections::HashMap;

use super::facts::SalesFact;
use super::rollup::{ratio, round1, Accumulator};
use crate::config::{DEFAULT_CHANNEL, DEFAULT_SEGMENT, PALETTE};
use crate::models::BreakdownRow;

pub fn channel_breakdown(facts: &[SalesFact]) -> Vec<BreakdownRow> {
    breakdown_by(facts, |f| f.channel.as_deref(), DEFAULT_CHANNEL)
}

pub fn segment_breakdown(facts: &[SalesFact]) -> Vec<BreakdownRow> {
    breakdown_by(facts, |f| f.segment.as_deref(), DEFAULT_SEGMENT)
}

/// Group by a label (missing or blank labels become `fallback`), sort by
/// revenue descending and attach share of total plus a palette color.
///
/// Percentages are all 0 when total revenue is 0.
pub fn breakdown_by<F>(facts: &[SalesFact], label: F, fallback: &str) -> Vec<BreakdownRow>
where
    F: Fn(&SalesFact) -> Option<&str>,
{
    let mut groups: HashMap<String, Accumulator> = HashMap::new();
    for fact in facts {
        let name = match label(fact).map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => fallback.to_string(),
        };
        groups.entry(name).or_default().add(fact);
    }

    let total: f64 = groups.values().map(|a| a.revenue).sum();

    let mut rows: Vec<(String, Accumulator)> = groups.into_iter().collect();
    rows.sort_by(|(an, a), (bn, b)| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| an.cmp(bn))
    });

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, acc))| BreakdownRow {
            percentage: if total > 0.0 {
                round1(ratio(acc.revenue, total) * 100.0)
            } else {
                0.0
            },
            revenue: acc.revenue,
            orders: acc.orders,
            customers: acc.customers(),
            color: PALETTE[i % PALETTE.len()].to_string(),
            name,
        })
        .collect()
}
