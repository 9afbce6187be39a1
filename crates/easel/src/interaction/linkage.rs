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
use indexmap::{IndexMap, IndexSet};

/// Process-wide map from group name to member instances. Empty groups are
/// dropped as soon as their last member leaves.
#[derive(Debug, Default)]
pub struct LinkageRegistry {
    groups: IndexMap<String, IndexSet<InstanceId>>,
}

impl LinkageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the instance was already a member.
    pub fn join(&mut self, instance: InstanceId, group: &str) -> bool {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(instance)
    }

    pub fn leave(&mut self, instance: InstanceId, group: &str) -> bool {
        let Some(members) = self.groups.get_mut(group) else {
            return false;
        };
        let removed = members.shift_remove(&instance);
        if members.is_empty() {
            self.groups.shift_remove(group);
        }
        removed
    }

    /// Removes the instance from every group, returning the groups it left.
    pub fn leave_all(&mut self, instance: InstanceId) -> Vec<String> {
        let joined: Vec<String> = self
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&instance))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &joined {
            self.leave(instance, name);
        }
        joined
    }

    pub fn members(&self, group: &str) -> Vec<InstanceId> {
        self.groups
            .get(group)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Members of every group `origin` belongs to, excluding `origin`
    /// itself. Each peer appears once even when groups overlap.
    pub fn peers_of(&self, origin: InstanceId) -> Vec<InstanceId> {
        let mut peers = IndexSet::new();
        for members in self.groups.values().filter(|m| m.contains(&origin)) {
            peers.extend(members.iter().copied().filter(|id| *id != origin));
        }
        peers.into_iter().collect()
    }

    pub fn groups_of(&self, instance: InstanceId) -> Vec<String> {
        self.groups
            .iter()
            .filter(|(_, members)| members.contains(&instance))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
