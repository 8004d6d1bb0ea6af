use std::collections::BTreeMap;

use crate::models::activity::ActivityRecord;
use crate::models::emission_factor::Scope;
use crate::models::summary::{MonthlySummaryRow, ScopeSummary, ScopeTotal};

#[derive(Default, Clone, Copy)]
struct ScopeBuckets {
    kgco2e: [f64; 3],
    tco2e: [f64; 3],
}

impl ScopeBuckets {
    fn add(&mut self, scope: Scope, kgco2e: f64, tco2e: f64) {
        let slot = usize::from(scope.as_u8() - 1);
        self.kgco2e[slot] += kgco2e;
        self.tco2e[slot] += tco2e;
    }
}

/// Per-scope totals over active activities. Every scope is present.
pub fn scope_totals(activities: &[ActivityRecord]) -> ScopeSummary {
    let mut buckets = ScopeBuckets::default();
    for activity in activities.iter().filter(|activity| activity.is_active()) {
        buckets.add(activity.scope, activity.emission.kgco2e, activity.emission.tco2e);
    }

    let scopes: Vec<ScopeTotal> = Scope::ALL
        .iter()
        .zip(buckets.kgco2e.iter().zip(buckets.tco2e.iter()))
        .map(|(scope, (kg, t))| ScopeTotal {
            scope: *scope,
            total_kgco2e: *kg,
            total_tco2e: *t,
        })
        .collect();

    ScopeSummary {
        total_kgco2e: scopes.iter().map(|entry| entry.total_kgco2e).sum(),
        total_tco2e: scopes.iter().map(|entry| entry.total_tco2e).sum(),
        scopes,
    }
}

/// Year-month key (`YYYY-MM`) of an activity date.
pub fn month_key(date: &str) -> &str {
    date.get(..7).unwrap_or(date)
}

/// tCO2e per scope and month over active activities, ascending by month.
pub fn monthly_rollup(activities: &[ActivityRecord]) -> Vec<MonthlySummaryRow> {
    let mut months: BTreeMap<&str, ScopeBuckets> = BTreeMap::new();
    for activity in activities.iter().filter(|activity| activity.is_active()) {
        months
            .entry(month_key(&activity.date))
            .or_default()
            .add(activity.scope, activity.emission.kgco2e, activity.emission.tco2e);
    }

    months
        .into_iter()
        .map(|(month, buckets)| {
            let [scope1, scope2, scope3] = buckets.tco2e;
            MonthlySummaryRow {
                month: month.to_string(),
                scope1,
                scope2,
                scope3,
                total: scope1 + scope2 + scope3,
            }
        })
        .collect()
}
