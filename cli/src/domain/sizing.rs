//! Fleet sizing: how many instances of each type a plan needs at its peak,
//! and how long the plan runs.

use std::collections::BTreeMap;

use surge_common::{Plan, Step};

/// Instance type → instance count.
pub type InstanceDemand = BTreeMap<String, u32>;

/// Peak concurrent instance count per instance type.
///
/// Each step occupies the half-open window `[start_delay, start_delay +
/// duration)`; a zero duration is treated as one second so the step still
/// counts. Steps that merely touch end-to-start share capacity. Sweeps the
/// sorted window boundaries once, so cost is `O(n log n)` in the step count.
#[must_use]
pub fn instance_demand(plan: &Plan) -> InstanceDemand {
    // (time, is_start, type, count). `false < true`, so ends sort first.
    let mut events: Vec<(u64, bool, &str, u32)> = Vec::with_capacity(plan.steps.len() * 2);
    for step in &plan.steps {
        if step.instance_count == 0 {
            continue;
        }
        let start = step.start_delay;
        let end = start.saturating_add(step.duration.max(1));
        let instance_type = step.instance_type.as_str();
        events.push((start, true, instance_type, step.instance_count));
        events.push((end, false, instance_type, step.instance_count));
    }
    events.sort_unstable_by_key(|&(time, is_start, _, _)| (time, is_start));

    let mut running: BTreeMap<&str, u32> = BTreeMap::new();
    let mut peak = InstanceDemand::new();
    for (_, is_start, instance_type, count) in events {
        let current = running.entry(instance_type).or_insert(0);
        if is_start {
            *current = current.saturating_add(count);
            let max = peak.entry(instance_type.to_string()).or_insert(0);
            *max = (*max).max(*current);
        } else {
            *current = current.saturating_sub(count);
        }
    }
    peak
}

/// Seconds from plan start until the last step's window closes. Zero for a
/// plan without steps.
#[must_use]
pub fn total_duration(plan: &Plan) -> u64 {
    plan.steps.iter().map(Step::window_end).max().unwrap_or(0)
}

/// Per-type shortfall of `current` against `desired`. Types already at or
/// above their demand are omitted.
#[must_use]
pub fn missing_instances(desired: &InstanceDemand, current: &InstanceDemand) -> InstanceDemand {
    desired
        .iter()
        .filter_map(|(instance_type, &want)| {
            let have = current.get(instance_type).copied().unwrap_or(0);
            (want > have).then(|| (instance_type.clone(), want - have))
        })
        .collect()
}

/// Steps whose window has closed after `elapsed_secs` of run time.
pub fn finished_steps(plan: &Plan, elapsed_secs: u64) -> impl Iterator<Item = &Step> {
    plan.steps
        .iter()
        .filter(move |step| step.window_end() <= elapsed_secs)
}
