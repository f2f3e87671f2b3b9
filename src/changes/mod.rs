//! Change detection between two listing snapshots
//!
//! Listings are matched by `id` only. When an id occurs more than once on
//! one side, the first occurrence is used and later ones are ignored.

use crate::models::{ChangeReport, Listing, PriceChange};
use std::collections::{HashMap, HashSet};

/// Compare the current run against the previous one
///
/// Output sequences keep the order of the input they were taken from.
/// An empty `previous` reports every current listing as new.
pub fn detect_changes(current: &[Listing], previous: &[Listing]) -> ChangeReport {
    let current_index = index_by_id(current);
    let previous_index = index_by_id(previous);

    let mut new_listings = Vec::new();
    let mut price_changes = Vec::new();
    let mut seen = HashSet::new();

    for listing in current {
        // Duplicate ids are only considered once
        if !seen.insert(listing.id.as_str()) {
            continue;
        }

        match previous_index.get(listing.id.as_str()) {
            None => new_listings.push(listing.clone()),
            Some(old) if old.price != listing.price => price_changes.push(PriceChange {
                id: listing.id.clone(),
                title: listing.title.clone(),
                old_price: old.price.clone(),
                new_price: listing.price.clone(),
            }),
            Some(_) => {}
        }
    }

    let mut seen = HashSet::new();
    let deleted_listings = previous
        .iter()
        .filter(|&l| seen.insert(l.id.as_str()))
        .filter(|l| !current_index.contains_key(l.id.as_str()))
        .cloned()
        .collect();

    ChangeReport::new(new_listings, deleted_listings, price_changes)
}

/// First listing for every id
fn index_by_id(listings: &[Listing]) -> HashMap<&str, &Listing> {
    let mut index = HashMap::with_capacity(listings.len());
    for listing in listings {
        index.entry(listing.id.as_str()).or_insert(listing);
    }
    index
}
