//! Per-channel message sampling.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::MessageRow;

/// Picks a fixed-size, reproducible sample of messages from each channel.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    limit: usize,
    seed: u64,
}

impl Sampler {
    pub fn new(limit: usize, seed: u64) -> Self {
        Self { limit, seed }
    }

    /// Lazily yield `(channel, row)` pairs, channel-major, channels in
    /// order of first appearance.
    ///
    /// Rows without message text are dropped first. A channel left with
    /// fewer than `limit` rows contributes nothing; every other channel
    /// contributes exactly `limit` rows drawn with an RNG seeded from
    /// `seed`, so the same input always gives the same sample.
    pub fn sample<'a>(
        &self,
        rows: &'a [MessageRow],
    ) -> impl Iterator<Item = (&'a str, &'a MessageRow)> + use<'a> {
        let Self { limit, seed } = *self;

        group_by_channel(rows)
            .into_iter()
            .flat_map(move |(channel, candidates)| {
                let picked: Vec<&MessageRow> = if limit == 0 || candidates.len() < limit {
                    tracing::info!(
                        channel,
                        available = candidates.len(),
                        required = limit,
                        "Skipping channel with too few messages"
                    );
                    Vec::new()
                } else {
                    let mut rng = StdRng::seed_from_u64(seed);
                    candidates
                        .choose_multiple(&mut rng, limit)
                        .copied()
                        .collect()
                };
                picked.into_iter().map(move |row| (channel, row))
            })
    }
}

/// Group rows with text by channel username, keeping first-seen order.
fn group_by_channel(rows: &[MessageRow]) -> Vec<(&str, Vec<&MessageRow>)> {
    let mut groups: Vec<(&str, Vec<&MessageRow>)> = Vec::new();
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for row in rows {
        let channel = row.channel_username.as_str();
        let index = *index_of.entry(channel).or_insert_with(|| {
            groups.push((channel, Vec::new()));
            groups.len() - 1
        });
        if row.text().is_some() {
            groups[index].1.push(row);
        }
    }
    groups
}
