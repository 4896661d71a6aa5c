// src/crawl/frontier.rs
// =============================================================================
// The crawl frontier: URLs discovered but not fetched yet.
//
// One VecDeque serves both traversal orders:
// - depth-first:   push to the back, pop from the back (a stack)
// - breadth-first: push to the back, pop from the front (a queue)
//
// For depth-first, a page's links are pushed in reverse so the first link in
// the document is explored first, the same order a recursive crawl would use.
//
// The frontier does not deduplicate. The engine checks the visited set when
// it pops a URL, which is what guarantees one fetch per URL.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalOrder {
    #[default]
    DepthFirst,
    BreadthFirst,
}

/// How a URL got into the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    Root,
    Page,
    Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub discovery: Discovery,
}

#[derive(Debug)]
pub struct CrawlFrontier {
    order: TraversalOrder,
    entries: VecDeque<FrontierEntry>,
}

impl CrawlFrontier {
    pub fn new(order: TraversalOrder) -> Self {
        Self {
            order,
            entries: VecDeque::new(),
        }
    }

    pub fn push(&mut self, entry: FrontierEntry) {
        self.entries.push_back(entry);
    }

    // Adds all links found on one page, keeping document order on the way out
    pub fn extend(&mut self, entries: Vec<FrontierEntry>) {
        match self.order {
            TraversalOrder::DepthFirst => self.entries.extend(entries.into_iter().rev()),
            TraversalOrder::BreadthFirst => self.entries.extend(entries),
        }
    }

    pub fn pop(&mut self) -> Option<FrontierEntry> {
        match self.order {
            TraversalOrder::DepthFirst => self.entries.pop_back(),
            TraversalOrder::BreadthFirst => self.entries.pop_front(),
        }
    }

    // Pending entries, for progress logs
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
