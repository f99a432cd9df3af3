//! Boilerplate removal for extracted content blocks.

use crate::spider::profile::SourceProfile;

/// Drop every block containing one of the profile's boilerplate markers. Order of the rest is kept.
pub fn filter_blocks(blocks: Vec<String>, profile: &SourceProfile) -> Vec<String> {
    filter_with(blocks, profile.boilerplate)
}

pub(crate) fn filter_with(blocks: Vec<String>, markers: &[&str]) -> Vec<String> {
    if markers.is_empty() {
        return blocks;
    }
    blocks
        .into_iter()
        .filter(|block| !markers.iter().any(|m| block.contains(m)))
        .collect()
}
