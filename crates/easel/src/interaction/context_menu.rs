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

use super::InstanceId;
use crate::surface::{DataPoint, ScreenPoint};
use std::fmt;
use std::sync::Arc;

/// Argument handed to a context-menu action.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuInvocation {
    pub instance: InstanceId,
    pub position: ScreenPoint,
    /// `position` translated into the instance's data space.
    pub data_position: Option<Vec<f64>>,
    pub point: Option<DataPoint>,
}

pub type ContextAction = Arc<dyn Fn(&ContextMenuInvocation) + Send + Sync>;

/// Labelled entry in an instance's context menu.
#[derive(Clone)]
pub struct ContextMenuItem {
    pub label: String,
    pub action: ContextAction,
    pub enabled: bool,
}

impl ContextMenuItem {
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn(&ContextMenuInvocation) + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            action: Arc::new(action),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl fmt::Debug for ContextMenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextMenuItem")
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// The single open menu.
#[derive(Debug, Clone)]
pub struct OpenContextMenu {
    pub invocation: ContextMenuInvocation,
    pub items: Vec<ContextMenuItem>,
}

/// What the host needs to draw the open menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenuView {
    pub instance: InstanceId,
    pub position: ScreenPoint,
    pub items: Vec<(String, bool)>,
}

impl OpenContextMenu {
    pub fn view(&self) -> ContextMenuView {
        ContextMenuView {
            instance: self.invocation.instance,
            position: self.invocation.position,
            items: self
                .items
                .iter()
                .map(|item| (item.label.clone(), item.enabled))
                .collect(),
        }
    }

    pub fn find(&self, label: &str) -> Option<&ContextMenuItem> {
        self.items.iter().find(|item| item.label == label)
    }
}
