use std::collections::HashMap;

use scorebridge_core::Record;

use crate::error::ReconError;
use crate::model::{MergeOutput, MergeStrategy};

/// Suffix for a source value displaced by a same-named result field.
pub const SOURCE_SUFFIX: &str = "_source";

/// Merge scoring results back onto the source records.
///
/// Joins on `key` when any result carries it, otherwise pairs by position.
/// The output always follows source order.
pub fn merge(source: &[Record], results: &[Record], key: &str) -> Result<MergeOutput, ReconError> {
    if results.iter().any(|r| r.get_non_null(key).is_some()) {
        Ok(merge_by_key(source, results, key))
    } else {
        merge_by_position(source, results, key)
    }
}

/// Left outer join on `key`. First result wins on duplicate keys.
pub fn merge_by_key(source: &[Record], results: &[Record], key: &str) -> MergeOutput {
    let mut index: HashMap<String, &Record> = HashMap::new();
    for result in results {
        if let Some(k) = result.key(key) {
            index.entry(k).or_insert(result);
        }
    }

    let mut unmatched = 0;
    let records = source
        .iter()
        .map(|src| match src.key(key).and_then(|k| index.get(&k)) {
            Some(result) => combine(src, result, key),
            None => {
                unmatched += 1;
                src.clone()
            }
        })
        .collect();

    if unmatched > 0 {
        log::warn!("{unmatched} source record(s) have no scoring result for key '{key}'");
    }

    MergeOutput {
        records,
        strategy: MergeStrategy::Key,
        unmatched,
    }
}

/// Pair `source[i]` with `results[i]`. Lengths must agree.
///
/// The source `key` column is never replaced, even when results carry it
/// (as null) without it being usable for a join.
pub fn merge_by_position(source: &[Record], results: &[Record], key: &str) -> Result<MergeOutput, ReconError> {
    if source.len() != results.len() {
        return Err(ReconError::Alignment {
            source_len: source.len(),
            result_len: results.len(),
        });
    }

    let records = source
        .iter()
        .zip(results)
        .map(|(src, result)| combine(src, result, key))
        .collect();

    Ok(MergeOutput {
        records,
        strategy: MergeStrategy::Position,
        unmatched: 0,
    })
}

/// Overlay `result` on `source`. On a name collision the result value takes
/// the field and the source value moves to `<field>_source`. The join key
/// always keeps the source value.
fn combine(source: &Record, result: &Record, join_key: &str) -> Record {
    let mut merged = source.clone();
    for (field, value) in result.iter() {
        if field == join_key {
            continue;
        }
        if let Some(previous) = source.get(field) {
            let alternate = format!("{field}{SOURCE_SUFFIX}");
            if !merged.contains(&alternate) {
                merged.insert(alternate, previous.clone());
            }
        }
        merged.insert(field, value.clone());
    }
    merged
}
