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

//! Selection, drill-down and cross-chart linkage for live visualization
//! instances.
//!
//! Surfaces report input through [`InteractionCoordinator::handle_event`].
//! State lives behind short-lived locks; host callbacks and surface calls
//! always run with every lock released, so they may call back into the
//! coordinator.

pub mod context_menu;
pub mod drill;
pub mod linkage;
pub mod selection;

pub use context_menu::{
    ContextAction, ContextMenuInvocation, ContextMenuItem, ContextMenuView, OpenContextMenu,
};
pub use drill::{DrillFrame, DrillStack};
pub use linkage::LinkageRegistry;
pub use selection::{SelectionKey, SelectionSet};

use crate::surface::{DataPoint, RenderSurface, ScreenPoint, SurfaceAction, SurfaceEvent};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Handle for a registered visualization instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

/// Receives the full selection after every change.
pub type SelectionCallback = Arc<dyn Fn(&[SelectionKey]) + Send + Sync>;
pub type DrillDownCallback = Arc<dyn Fn(&DataPoint) + Send + Sync>;
pub type DrillUpCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct InstanceHandlers {
    on_selection_change: Option<SelectionCallback>,
    on_drill_down: Option<DrillDownCallback>,
    on_drill_up: Option<DrillUpCallback>,
}

struct InstanceSlot {
    surface: Arc<dyn RenderSurface>,
    selection: Mutex<SelectionSet>,
    drill: Mutex<DrillStack>,
    handlers: Mutex<InstanceHandlers>,
    context_items: Mutex<Vec<ContextMenuItem>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the coordinator's broadcast flag; released on drop, including
/// when a surface panics mid-dispatch.
struct BroadcastGuard<'a>(&'a AtomicBool);

impl<'a> BroadcastGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for BroadcastGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns every live instance's interaction state and the linkage groups
/// between them.
pub struct InteractionCoordinator {
    next_id: AtomicU64,
    instances: DashMap<InstanceId, Arc<InstanceSlot>>,
    linkage: Mutex<LinkageRegistry>,
    context_menu: Mutex<Option<OpenContextMenu>>,
    broadcasting: AtomicBool,
}

impl Default for InteractionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionCoordinator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            instances: DashMap::new(),
            linkage: Mutex::new(LinkageRegistry::new()),
            context_menu: Mutex::new(None),
            broadcasting: AtomicBool::new(false),
        }
    }

    pub fn register(&self, surface: Arc<dyn RenderSurface>) -> InstanceId {
        let id = InstanceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.instances.insert(
            id,
            Arc::new(InstanceSlot {
                surface,
                selection: Mutex::new(SelectionSet::new()),
                drill: Mutex::new(DrillStack::new()),
                handlers: Mutex::new(InstanceHandlers::default()),
                context_items: Mutex::new(Vec::new()),
            }),
        );
        debug!(instance = %id, "Registered visualization instance");
        id
    }

    /// Drops the instance's state, group memberships and any menu it owns.
    pub fn unregister(&self, instance: InstanceId) -> bool {
        let removed = self.instances.remove(&instance).is_some();
        let left = lock(&self.linkage).leave_all(instance);
        {
            let mut menu = lock(&self.context_menu);
            if menu
                .as_ref()
                .is_some_and(|m| m.invocation.instance == instance)
            {
                *menu = None;
            }
        }
        if removed {
            debug!(instance = %instance, groups = ?left, "Unregistered visualization instance");
        }
        removed
    }

    pub fn is_registered(&self, instance: InstanceId) -> bool {
        self.instances.contains_key(&instance)
    }

    fn slot(&self, instance: InstanceId) -> Option<Arc<InstanceSlot>> {
        self.instances.get(&instance).map(|s| Arc::clone(s.value()))
    }

    // Selection

    pub fn on_selection_change<F>(&self, instance: InstanceId, callback: F)
    where
        F: Fn(&[SelectionKey]) + Send + Sync + 'static,
    {
        if let Some(slot) = self.slot(instance) {
            lock(&slot.handlers).on_selection_change = Some(Arc::new(callback));
        }
    }

    /// Flips the point's membership and reports the full selection. Returns
    /// whether the point is now selected.
    pub fn toggle_select(&self, instance: InstanceId, series_id: &str, row_index: usize) -> bool {
        let Some(slot) = self.slot(instance) else {
            return false;
        };
        let (selected, snapshot) = {
            let mut selection = lock(&slot.selection);
            let selected = selection.toggle(SelectionKey::new(series_id, row_index));
            (selected, selection.to_vec())
        };
        debug!(instance = %instance, series_id, row_index, selected, "Toggled selection");
        let callback = lock(&slot.handlers).on_selection_change.clone();
        if let Some(callback) = callback {
            callback(&snapshot);
        }
        selected
    }

    pub fn clear_selection(&self, instance: InstanceId) {
        let Some(slot) = self.slot(instance) else {
            return;
        };
        lock(&slot.selection).clear();
        let callback = lock(&slot.handlers).on_selection_change.clone();
        if let Some(callback) = callback {
            callback(&[]);
        }
    }

    pub fn selection(&self, instance: InstanceId) -> Vec<SelectionKey> {
        let Some(slot) = self.slot(instance) else {
            return Vec::new();
        };
        let selection = lock(&slot.selection).to_vec();
        selection
    }

    // Drill-down / drill-up

    pub fn enable_drill_down<D>(
        &self,
        instance: InstanceId,
        on_drill_down: D,
        on_drill_up: Option<DrillUpCallback>,
    ) where
        D: Fn(&DataPoint) + Send + Sync + 'static,
    {
        if let Some(slot) = self.slot(instance) {
            let mut handlers = lock(&slot.handlers);
            handlers.on_drill_down = Some(Arc::new(on_drill_down));
            handlers.on_drill_up = on_drill_up;
        }
    }

    /// Saves the active configuration with the triggering point, then hands
    /// the point to the host, which renders the next level.
    pub fn drill_down(&self, instance: InstanceId, point: DataPoint) -> usize {
        let Some(slot) = self.slot(instance) else {
            return 0;
        };
        let current = slot.surface.get_option();
        let depth = {
            let mut stack = lock(&slot.drill);
            stack.push(current, point.clone());
            stack.depth()
        };
        debug!(instance = %instance, depth, series_id = %point.series_id, "Drill down");
        let callback = lock(&slot.handlers).on_drill_down.clone();
        if let Some(callback) = callback {
            callback(&point);
        }
        depth
    }

    /// Restores the most recently saved configuration verbatim. An empty
    /// stack is a no-op.
    pub fn drill_up(&self, instance: InstanceId) -> bool {
        let Some(slot) = self.slot(instance) else {
            return false;
        };
        let Some(frame) = lock(&slot.drill).pop() else {
            return false;
        };
        slot.surface.set_option(&frame.saved_config, true);
        debug!(instance = %instance, depth = self.depth(instance), "Drill up");
        let callback = lock(&slot.handlers).on_drill_up.clone();
        if let Some(callback) = callback {
            callback();
        }
        true
    }

    pub fn depth(&self, instance: InstanceId) -> usize {
        let Some(slot) = self.slot(instance) else {
            return 0;
        };
        let depth = lock(&slot.drill).depth();
        depth
    }

    pub fn drill_path(&self, instance: InstanceId) -> Vec<DataPoint> {
        let Some(slot) = self.slot(instance) else {
            return Vec::new();
        };
        let path = lock(&slot.drill).path().into_iter().cloned().collect();
        path
    }

    // Linkage

    pub fn join_group(&self, instance: InstanceId, group: &str) -> bool {
        if !self.is_registered(instance) {
            return false;
        }
        let joined = lock(&self.linkage).join(instance, group);
        debug!(instance = %instance, group, joined, "Join linkage group");
        joined
    }

    pub fn leave_group(&self, instance: InstanceId, group: &str) -> bool {
        let left = lock(&self.linkage).leave(instance, group);
        debug!(instance = %instance, group, left, "Leave linkage group");
        left
    }

    pub fn group_members(&self, group: &str) -> Vec<InstanceId> {
        lock(&self.linkage).members(group)
    }

    pub fn has_group(&self, group: &str) -> bool {
        lock(&self.linkage).has_group(group)
    }

    /// Mirrors `action` unmodified to every other member of the origin's
    /// groups. Actions dispatched while a broadcast is running are not
    /// re-broadcast, so surfaces that echo dispatched actions as events do
    /// not loop. Returns the number of surfaces reached.
    pub fn broadcast(&self, origin: InstanceId, action: &SurfaceAction) -> usize {
        let Some(_guard) = BroadcastGuard::acquire(&self.broadcasting) else {
            return 0;
        };
        let peers = lock(&self.linkage).peers_of(origin);
        let mut delivered = 0;
        for peer in peers {
            if let Some(slot) = self.slot(peer) {
                slot.surface.dispatch_action(action);
                delivered += 1;
            }
        }
        debug!(origin = %origin, kind = action.kind(), delivered, "Broadcast linked action");
        delivered
    }

    // Context menu

    pub fn register_context_actions(&self, instance: InstanceId, items: Vec<ContextMenuItem>) {
        if let Some(slot) = self.slot(instance) {
            *lock(&slot.context_items) = items;
        }
    }

    /// Opens the instance's menu at `position`, replacing any open menu.
    /// Returns false when the instance has no registered actions.
    pub fn open_context_menu(
        &self,
        instance: InstanceId,
        position: ScreenPoint,
        point: Option<DataPoint>,
    ) -> bool {
        self.close_context_menu();
        let Some(slot) = self.slot(instance) else {
            return false;
        };
        let items = lock(&slot.context_items).clone();
        if items.is_empty() {
            return false;
        }
        let data_position = slot.surface.convert_from_pixel(position);
        debug!(instance = %instance, x = position.x, y = position.y, "Open context menu");
        *lock(&self.context_menu) = Some(OpenContextMenu {
            invocation: ContextMenuInvocation {
                instance,
                position,
                data_position,
                point,
            },
            items,
        });
        true
    }

    pub fn close_context_menu(&self) -> bool {
        let closed = lock(&self.context_menu).take().is_some();
        if closed {
            debug!("Close context menu");
        }
        closed
    }

    pub fn context_menu(&self) -> Option<ContextMenuView> {
        lock(&self.context_menu).as_ref().map(OpenContextMenu::view)
    }

    /// Runs the enabled item called `label` from the open menu, then closes
    /// the menu. Disabled or unknown labels leave the menu open.
    pub fn invoke_context_action(&self, label: &str) -> bool {
        let selected = {
            let menu = lock(&self.context_menu);
            menu.as_ref().and_then(|open| {
                open.find(label)
                    .filter(|item| item.enabled)
                    .map(|item| (Arc::clone(&item.action), open.invocation.clone()))
            })
        };
        let Some((action, invocation)) = selected else {
            return false;
        };
        self.close_context_menu();
        action(&invocation);
        true
    }

    // Event entry point

    pub fn handle_event(&self, instance: InstanceId, event: SurfaceEvent) {
        match event {
            SurfaceEvent::PrimaryAction { point, .. } => {
                self.close_context_menu();
                let Some(point) = point else {
                    return;
                };
                let Some(slot) = self.slot(instance) else {
                    return;
                };
                let (selectable, drillable) = {
                    let handlers = lock(&slot.handlers);
                    (
                        handlers.on_selection_change.is_some(),
                        handlers.on_drill_down.is_some(),
                    )
                };
                if selectable {
                    self.toggle_select(instance, &point.series_id, point.row_index);
                }
                if drillable {
                    self.drill_down(instance, point);
                }
            }
            SurfaceEvent::SecondaryAction { point, position } => {
                self.open_context_menu(instance, position, point);
            }
            SurfaceEvent::Linked(action) => {
                self.broadcast(instance, &action);
            }
        }
    }

    /// Forgets every instance, group and open menu.
    pub fn clear(&self) {
        self.close_context_menu();
        lock(&self.linkage).clear();
        self.instances.clear();
    }
}
