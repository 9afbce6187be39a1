// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::surface::{DataPoint, RenderConfig};

/// Configuration saved before a drill-down, with the point that
/// triggered it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillFrame {
    pub saved_config: RenderConfig,
    pub point: DataPoint,
}

/// Drill-down history; popping restores the previous level.
#[derive(Debug, Clone, Default)]
pub struct DrillStack {
    frames: Vec<DrillFrame>,
}

impl DrillStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, saved_config: RenderConfig, point: DataPoint) {
        self.frames.push(DrillFrame {
            saved_config,
            point,
        });
    }

    pub fn pop(&mut self) -> Option<DrillFrame> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&DrillFrame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Points along the current drill path, outermost first.
    pub fn path(&self) -> Vec<&DataPoint> {
        self.frames.iter().map(|f| &f.point).collect()
    }
}
