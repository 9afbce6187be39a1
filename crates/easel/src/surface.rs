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

//! Contract with the external rendering surface. The engine only produces
//! declarative configuration and reacts to surface events; drawing stays
//! with the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative render configuration (type, series, styling, animation,
/// interaction flags) in the surface's own JSON schema.
pub type RenderConfig = Value;

/// Pixel position inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A data element hit by a pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub series_id: String,
    pub row_index: usize,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl DataPoint {
    pub fn new(series_id: impl Into<String>, row_index: usize) -> Self {
        Self {
            series_id: series_id.into(),
            row_index,
            name: None,
            value: Value::Null,
        }
    }
}

/// Linkage-eligible actions. Payloads are passed through unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SurfaceAction {
    Highlight { payload: Value },
    Downplay { payload: Value },
    DataZoom { payload: Value },
}

impl SurfaceAction {
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceAction::Highlight { .. } => "highlight",
            SurfaceAction::Downplay { .. } => "downplay",
            SurfaceAction::DataZoom { .. } => "dataZoom",
        }
    }
}

/// Input events raised by a surface and fed to the interaction coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Primary-action input. `point` is set when a data element was hit.
    PrimaryAction {
        point: Option<DataPoint>,
        position: ScreenPoint,
    },
    /// Secondary-action input (context menu request).
    SecondaryAction {
        point: Option<DataPoint>,
        position: ScreenPoint,
    },
    /// A highlight, downplay or zoom-range change originating on this surface.
    Linked(SurfaceAction),
}

/// Handle to one live visualization on the host's rendering surface.
pub trait RenderSurface: Send + Sync {
    fn set_option(&self, config: &RenderConfig, replace: bool);

    fn dispatch_action(&self, action: &SurfaceAction);

    fn get_option(&self) -> RenderConfig;

    /// Translates a pixel position into the chart's data coordinates, or
    /// `None` when the position is outside every coordinate system.
    fn convert_from_pixel(&self, position: ScreenPoint) -> Option<Vec<f64>>;

    /// Width and height of the surface's container element.
    fn container_size(&self) -> (f64, f64);
}

/// Sets `map[section][key]`, creating or replacing a non-object section.
pub(crate) fn set_nested(map: &mut Map<String, Value>, section: &str, key: &str, value: Value) {
    let entry = map
        .entry(section.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(inner) = entry {
        inner.insert(key.to_string(), value);
    }
}
