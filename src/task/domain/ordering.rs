//! Listing order shared by every consumer of task lists.
//!
//! The order is a pure function of the task values, so a client cache that
//! re-sorts optimistically and the server always agree:
//!
//! 1. open tasks before `done` tasks;
//! 2. higher priority first (`urgent > high > medium > low`);
//! 3. earliest due date first, dated tasks before undated ones;
//! 4. most recently created first;
//! 5. task identifier, so equal keys still give a total order.

use super::Task;
use std::cmp::{Ordering, Reverse};

/// Compares two tasks by listing order.
#[must_use]
pub fn listing_order(a: &Task, b: &Task) -> Ordering {
    a.status()
        .is_done()
        .cmp(&b.status().is_done())
        .then_with(|| Reverse(a.priority()).cmp(&Reverse(b.priority())))
        .then_with(|| compare_due(a, b))
        .then_with(|| b.created_at().cmp(&a.created_at()))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Sorts tasks in place by [`listing_order`].
pub fn sort_for_listing(tasks: &mut [Task]) {
    tasks.sort_by(listing_order);
}

fn compare_due(a: &Task, b: &Task) -> Ordering {
    match (a.due_at(), b.due_at()) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
