/// Canonical ordering of a bucket of entries.
///
/// Stems are stripped of their longest shared literal prefix and suffix; if
/// every remainder parses as an integer the bucket is ordered numerically,
/// otherwise the whole bucket falls back to lexicographic order by full path.
/// Numeric ordering uses a stable sort on the integer key alone, so ties keep
/// their original relative order.
use crate::classify::Entry;

/// Orders `entries` in place into their canonical sequence.
pub fn order(entries: &mut [Entry]) {
    if entries.len() < 2 {
        return;
    }

    let stems: Vec<String> = entries.iter().map(Entry::stem).collect();
    match numeric_keys(&stems) {
        Some(keys) => {
            let mut keyed: Vec<(i64, Entry)> = keys
                .into_iter()
                .zip(entries.iter().cloned())
                .collect();
            keyed.sort_by_key(|(key, _)| *key);
            for (slot, (_, entry)) in entries.iter_mut().zip(keyed) {
                *slot = entry;
            }
        }
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
}

/// Parses every stem, minus the shared affixes, as an integer.
///
/// Returns `None` as soon as any stem fails, which abandons numeric ordering
/// for the whole bucket.
fn numeric_keys(stems: &[String]) -> Option<Vec<i64>> {
    let prefix = common_prefix(stems);
    let suffix = common_suffix(stems);

    stems
        .iter()
        .map(|stem| {
            let end = stem.len().checked_sub(suffix.len())?;
            let middle = stem.get(prefix.len()..end)?;
            middle.parse::<i64>().ok()
        })
        .collect()
}

/// Longest prefix shared by every stem, shrunk from the full first stem.
fn common_prefix(stems: &[String]) -> String {
    let mut prefix = stems[0].clone();
    while !prefix.is_empty() && !stems.iter().all(|s| s.starts_with(&prefix)) {
        prefix.pop();
    }
    prefix
}

/// Longest suffix shared by every stem, shrunk from the full first stem.
fn common_suffix(stems: &[String]) -> String {
    let mut suffix = stems[0].clone();
    while !suffix.is_empty() && !stems.iter().all(|s| s.ends_with(&suffix)) {
        suffix.remove(0);
    }
    suffix
}
