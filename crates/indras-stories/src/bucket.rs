//! Per-author bucket index
//!
//! Groups a flat story snapshot into author buckets, keeping first-seen
//! author order and each author's insertion order.

use std::collections::HashMap;

use crate::state::SlidePosition;
use crate::story::{AuthorId, Story, StoryBucket, StoryId};

/// Group stories into per-author buckets.
///
/// Runs once per viewing session over an explicit snapshot; the result is
/// never updated if the source collection changes afterwards.
pub fn build_buckets(stories: &[Story]) -> Vec<StoryBucket> {
    let mut index: HashMap<&AuthorId, usize> = HashMap::new();
    let mut buckets: Vec<StoryBucket> = Vec::new();

    for story in stories {
        let slot = *index.entry(&story.author_id).or_insert_with(|| {
            buckets.push(StoryBucket::new(story.author_id.clone()));
            buckets.len() - 1
        });
        buckets[slot].stories.push(story.clone());
    }

    buckets
}

/// Find a story across buckets
pub fn locate(buckets: &[StoryBucket], id: &StoryId) -> Option<SlidePosition> {
    buckets.iter().enumerate().find_map(|(bucket, b)| {
        b.position_of(id)
            .map(|slide| SlidePosition::new(bucket, slide))
    })
}

/// Total number of slides across all buckets
pub fn slide_count(buckets: &[StoryBucket]) -> usize {
    buckets.iter().map(StoryBucket::len).sum()
}
