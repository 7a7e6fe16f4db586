//! Collection Walking
//!
//! Single dereferences and linked-list chains with per-walk cycle detection.

use super::{field_address, Walker};
use crate::record::DecodedRecord;
use crate::schema::{ChainMode, CollectionSpec};

use std::collections::HashSet;

/// Addresses visited by one traversal
///
/// Each collection instance and the root enumeration get their own set, so
/// unrelated chains that share nodes are not cut short.
#[derive(Debug, Default)]
pub struct SeenSet {
    visited: HashSet<u64>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `address` visited; returns false if it already was
    pub fn insert(&mut self, address: u64) -> bool {
        self.visited.insert(address)
    }

    pub fn contains(&self, address: u64) -> bool {
        self.visited.contains(&address)
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

impl Walker<'_> {
    /// Decode the elements of a collection whose head pointer is `head`
    pub(super) fn walk_collection(
        &self,
        path: &str,
        spec: &CollectionSpec,
        head: u64,
    ) -> Vec<DecodedRecord> {
        if head == 0 {
            return Vec::new();
        }

        let next_offset = match spec.chain {
            ChainMode::Single => return vec![self.decode_struct(&spec.element, head)],
            ChainMode::LinkedList { next_offset } => next_offset,
        };

        let mut elements = Vec::new();
        let mut seen = SeenSet::new();
        let mut current = head;

        while current != 0 {
            if !seen.insert(current) {
                tracing::debug!("'{}': chain revisits {:#x}, stopping", path, current);
                break;
            }
            if elements.len() >= spec.max_elements {
                tracing::warn!(
                    "'{}': stopped after {} elements (max_elements)",
                    path,
                    spec.max_elements
                );
                break;
            }

            elements.push(self.decode_struct(&spec.element, current));

            let next = field_address(current, next_offset).and_then(|a| self.read_pointer(a));
            current = match next {
                Ok(next) => next,
                Err(e) => {
                    tracing::warn!(
                        "'{}': cannot read next pointer of element at {:#x}: {}",
                        path,
                        current,
                        e
                    );
                    break;
                }
            };
        }

        tracing::trace!("'{}': {} elements from {:#x}", path, elements.len(), head);
        elements
    }
}
