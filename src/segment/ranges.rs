//! Range assignment for located steps.

use super::locator::Pattern;

/// Give every found pattern an `end_line`.
///
/// Found patterns are taken in log order; each one ends right before the
/// next one starts, and the last one runs to the final line. Unfound
/// patterns keep `end_line == None` and take no part in the partition.
pub fn assign_ranges(patterns: &mut [Pattern<'_>], total_lines: usize) {
    let starts: Vec<(usize, usize)> = found_in_log_order(patterns)
        .into_iter()
        .filter_map(|index| patterns[index].start_line.map(|start| (start, index)))
        .collect();

    let last_line = total_lines.saturating_sub(1);
    for (position, &(start, index)) in starts.iter().enumerate() {
        let end = match starts.get(position + 1) {
            Some(&(next_start, _)) => next_start.saturating_sub(1).max(start),
            None => last_line.max(start),
        };
        patterns[index].end_line = Some(end);
    }
}

/// Indices of found patterns, ordered by `start_line`.
pub fn found_in_log_order(patterns: &[Pattern<'_>]) -> Vec<usize> {
    let mut order: Vec<(usize, usize)> = patterns
        .iter()
        .enumerate()
        .filter_map(|(index, p)| p.start_line.map(|start| (start, index)))
        .collect();
    order.sort_unstable();
    order.into_iter().map(|(_, index)| index).collect()
}
