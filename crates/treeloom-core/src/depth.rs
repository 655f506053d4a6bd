// SPDX-License-Identifier: AGPL-3.0-or-later
//! Recursion depth accounting shared by both builders

use crate::traits::{ConversionError, Result};
use std::cell::Cell;

/// Current nesting depth of one conversion
#[derive(Debug, Default)]
pub(crate) struct Depth {
    current: Cell<usize>,
}

impl Depth {
    /// Enter one level; the returned guard leaves it again when dropped
    pub(crate) fn enter(&self, limit: usize) -> Result<DepthGuard<'_>> {
        let next = self.current.get() + 1;
        if next > limit {
            return Err(ConversionError::DepthLimitExceeded { limit });
        }
        self.current.set(next);
        Ok(DepthGuard { depth: self })
    }

    pub(crate) fn get(&self) -> usize {
        self.current.get()
    }
}

pub(crate) struct DepthGuard<'d> {
    depth: &'d Depth,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.current.set(self.depth.current.get() - 1);
    }
}
