//! Plain-text report: resolved costs grouped by category, sorted descending,
//! magnitudes grouped by thousands.

use std::collections::HashMap;

use crate::harness::Measurement;
use crate::Unit;

/// Format a magnitude with grouped-thousands separators, recursing on sign.
pub fn group_thousands(n: f64) -> String {
    if n < 0.0 {
        return format!("-{}", group_thousands(-n));
    }
    let digits = format!("{n:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the report.
///
/// `categories` is an ordered `(tag, description)` list controlling section
/// order and header text; categories encountered in the batch but absent from
/// the list are appended in first-seen order under their raw tag. Within a
/// section, candidates sort descending by resolved cost (name as tie-break).
/// Unnamed candidates are measured overhead sources and never appear.
///
/// The unit multiplier is applied uniformly here, at format time — never
/// before resolution.
pub fn render(measurements: &[Measurement], unit: Unit, categories: &[(&str, &str)]) -> String {
    let multiplier = unit.multiplier();

    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut descriptions: HashMap<&str, &str> = HashMap::new();
    for (priority, (tag, description)) in categories.iter().enumerate() {
        order.insert(tag, priority);
        descriptions.insert(tag, description);
    }
    let mut next_priority = categories.len();

    // Section membership, plus the global magnitude field width.
    let mut sections: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut magnitude_width = 0usize;
    for (idx, m) in measurements.iter().enumerate() {
        if m.spec.name.is_none() {
            continue;
        }
        let magnitude = group_thousands(m.final_per_op() * multiplier);
        magnitude_width = magnitude_width.max(magnitude.len());
        for category in &m.spec.categories {
            let category = category.as_str();
            if !order.contains_key(category) {
                order.insert(category, next_priority);
                next_priority += 1;
            }
            match sections.iter_mut().find(|(tag, _)| *tag == category) {
                Some((_, members)) => members.push(idx),
                None => sections.push((category, vec![idx])),
            }
        }
    }
    sections.sort_by_key(|(tag, _)| order[tag]);

    let mut out = String::new();
    for (tag, mut members) in sections {
        members.sort_by(|&a, &b| {
            let ca = measurements[a].final_per_op();
            let cb = measurements[b].final_per_op();
            cb.total_cmp(&ca)
                .then_with(|| measurements[a].spec.name.cmp(&measurements[b].spec.name))
        });

        let name_width = members
            .iter()
            .filter_map(|&idx| measurements[idx].spec.name.as_deref())
            .map(str::len)
            .max()
            .unwrap_or(0);

        let description = descriptions.get(tag).copied().unwrap_or(tag);
        out.push_str(&format!("-= {description} =-\n\n"));
        for &idx in &members {
            let m = &measurements[idx];
            let magnitude = group_thousands(m.final_per_op() * multiplier);
            let name = m.spec.name.as_deref().unwrap_or_default();
            out.push_str(&format!(
                "{magnitude:>mag$}{unit} {name:<name_width$}\n",
                mag = magnitude_width + 4,
                unit = unit.as_str(),
            ));
        }
        out.push('\n');
    }
    out
}
