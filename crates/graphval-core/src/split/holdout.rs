//! Random (Monte Carlo) holdouts.

use super::{examples, group_by_stratum, materialize, HoldoutParams, SplitTarget};
use crate::{Error, Graph, Result};
use rand::prelude::*;
use rand_xorshift::XorShiftRng;

/// Split `graph` into (train, test) by drawing a random `train_size` share of
/// the target's examples.
///
/// With `stratify`, each stratum (node type set / edge type) is shuffled and
/// cut separately, so label proportions are preserved on both sides. The
/// train side still holds `round(n * train_size)` examples in total.
///
/// # Errors
///
/// - `InvalidParameter` if `train_size` is outside (0, 1) or leaves one side empty
/// - `MissingLabels` if the target has no examples
pub fn random_holdout(
    graph: &Graph,
    target: SplitTarget,
    params: &HoldoutParams,
    stratify: bool,
    seed: u64,
) -> Result<(Graph, Graph)> {
    params.validate()?;
    let examples = examples(graph, target)?;
    let mut rng = XorShiftRng::seed_from_u64(seed);

    let mut train = Vec::with_capacity(examples.len());
    let mut test = Vec::new();

    if stratify {
        let mut groups: Vec<Vec<usize>> = group_by_stratum(&examples).into_values().collect();
        let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
        let cuts = stratified_train_counts(&sizes, params.train_size);
        for (group, cut) in groups.iter_mut().zip(cuts) {
            group.shuffle(&mut rng);
            train.extend_from_slice(&group[..cut]);
            test.extend_from_slice(&group[cut..]);
        }
    } else {
        let mut positions: Vec<usize> = examples.iter().map(|e| e.position).collect();
        positions.shuffle(&mut rng);
        let cut = train_count(positions.len(), params.train_size);
        train.extend_from_slice(&positions[..cut]);
        test.extend_from_slice(&positions[cut..]);
    }

    if train.is_empty() || test.is_empty() {
        return Err(Error::InvalidParameter {
            name: "train_size",
            reason: format!(
                "train_size {} leaves an empty train or test side for {} examples",
                params.train_size,
                examples.len()
            ),
        });
    }

    log::debug!(
        "holdout of `{}` ({:?}, stratify={}, seed={}): {} train / {} test",
        graph.name(),
        target,
        stratify,
        seed,
        train.len(),
        test.len()
    );

    Ok(materialize(graph, target, &train, &test))
}

fn train_count(n: usize, train_size: f64) -> usize {
    ((n as f64 * train_size).round() as usize).min(n)
}

/// Per-stratum train counts summing to `round(n * train_size)`.
///
/// Quotas are proportional to stratum size; the leftover after flooring
/// goes to the largest remainders (ties to the earlier stratum). A stratum
/// of two or more examples only gives up its last test example once every
/// other stratum has.
fn stratified_train_counts(sizes: &[usize], train_size: f64) -> Vec<usize> {
    let n: usize = sizes.iter().sum();
    if n == 0 {
        return vec![0; sizes.len()];
    }
    let total = train_count(n, train_size);
    let quotas: Vec<f64> = sizes.iter().map(|&s| s as f64 * total as f64 / n as f64).collect();
    let mut counts: Vec<usize> = quotas
        .iter()
        .zip(sizes)
        .map(|(&q, &s)| (q.floor() as usize).min(s))
        .collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = quotas[a] - quotas[a].floor();
        let rb = quotas[b] - quotas[b].floor();
        rb.total_cmp(&ra)
    });

    let mut remaining = total.saturating_sub(counts.iter().sum());
    for keep_test in [true, false] {
        for &i in &order {
            if remaining == 0 {
                break;
            }
            let limit = if keep_test && sizes[i] >= 2 { sizes[i] - 1 } else { sizes[i] };
            if counts[i] < limit {
                counts[i] += 1;
                remaining -= 1;
            }
        }
    }
    counts
}
