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

mod surface;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use easel::animation::EntranceEffect;
use easel::interaction::ContextMenuItem;
use easel::surface::{DataPoint, ScreenPoint};
use easel::{Dataset, Easel, EngineConfig, SurfaceAction, SurfaceEvent};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use surface::LoggingSurface;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Recommend a chart type for a dataset file (`{"columns", "rows"}` JSON).
    Recommend {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        question: Option<String>,
    },
    /// Stream generated rows to a logging surface.
    Stream {
        #[arg(long, default_value_t = 240)]
        rows: usize,
        #[arg(long, default_value_t = 2)]
        sessions: usize,
    },
    /// Link three charts, drill into one and open a context menu.
    Interact,
    /// Optimise and animate a large line chart.
    Animate {
        #[arg(long, default_value_t = 5000)]
        rows: usize,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "easel-demo")]
#[command(about = "Walks through chart recommendation, streaming, interaction and animation.")]
struct Cli {
    /// YAML engine configuration. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.debug {
            EnvFilter::new("debug,reqwest=info,hyper=info,hyper_util=info")
        } else {
            EnvFilter::new("info,reqwest=warn,hyper=warn,hyper_util=warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides()?;
    let easel = Easel::new(config)?;
    info!("Starting easel demo");

    let outcome = match args.command {
        Commands::Recommend { data, question } => {
            recommend(&easel, data, question.as_deref()).await
        }
        Commands::Stream { rows, sessions } => stream(&easel, rows, sessions).await,
        Commands::Interact => interact(&easel),
        Commands::Animate { rows } => animate(&easel, rows).await,
    };
    easel.shutdown();
    outcome
}

fn sample_dataset() -> Result<Dataset> {
    let rows = [
        ("2024-01", 120),
        ("2024-02", 132),
        ("2024-03", 101),
        ("2024-04", 154),
        ("2024-05", 190),
        ("2024-06", 230),
    ]
    .into_iter()
    .map(|(month, sales)| vec![json!(format!("{month}-01")), json!(sales)])
    .collect();
    Ok(Dataset::new(
        vec!["month".to_string(), "sales".to_string()],
        rows,
        None,
    )?)
}

fn generated_rows(count: usize) -> Vec<Vec<Value>> {
    (0..count)
        .map(|i| vec![json!(format!("item-{i}")), json!((i * 37) % 101)])
        .collect()
}

async fn recommend(easel: &Easel, data: Option<PathBuf>, question: Option<&str>) -> Result<()> {
    let dataset = match data {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read dataset {}", path.display()))?;
            Dataset::from_json(serde_json::from_str(&raw)?)?
        }
        None => sample_dataset()?,
    };

    let recommendation = easel.advisor().select_chart_type(&dataset, question).await;
    let available = easel.advisor().selector().get_available_types(&dataset);
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    info!(
        primary = %recommendation.primary_type,
        available = ?available,
        "Recommendation ready"
    );
    Ok(())
}

async fn stream(easel: &Easel, rows: usize, sessions: usize) -> Result<()> {
    let streaming = easel.streaming();
    if !streaming.should_use_streaming(rows) {
        info!(rows, batch_size = streaming.batch_size(), "Row count fits a single render");
    }

    let handles: Vec<_> = (0..sessions.max(1))
        .map(|_| {
            let session_id = Uuid::new_v4().to_string();
            let surface = LoggingSurface::new(&session_id[..8]);
            let label = session_id.clone();
            streaming.stream_data(
                session_id,
                generated_rows(rows),
                move |batch, buffer| {
                    surface.render_rows(batch.index, buffer.len());
                    if batch.is_last {
                        info!(session = %label, total = buffer.len(), "Final batch rendered");
                    }
                },
                Some(Box::new(|| info!("Streaming session finished"))),
            )
        })
        .collect();

    for outcome in futures::future::join_all(handles.into_iter().map(|h| h.finished())).await {
        info!(?outcome, "Session ended");
    }
    Ok(())
}

fn interact(easel: &Easel) -> Result<()> {
    let interaction = easel.interaction();
    let surfaces: Vec<_> = ["revenue", "orders", "returns"]
        .into_iter()
        .map(LoggingSurface::new)
        .collect();
    let ids: Vec<_> = surfaces
        .iter()
        .map(|surface| interaction.register(surface.clone()))
        .collect();
    for id in &ids {
        interaction.join_group(*id, "dashboard");
    }

    let origin = ids[0];
    interaction.on_selection_change(origin, |keys| info!(selected = keys.len(), "Selection changed"));
    interaction.enable_drill_down(
        origin,
        |point| info!(series = %point.series_id, row = point.row_index, "Drilled into point"),
        Some(Arc::new(|| info!("Returned to previous level"))),
    );
    interaction.register_context_actions(
        origin,
        vec![
            ContextMenuItem::new("Export", |inv| {
                info!(data_position = ?inv.data_position, "Export requested");
            }),
            ContextMenuItem::new("Annotate", |_| {}).disabled(),
        ],
    );

    interaction.handle_event(
        origin,
        SurfaceEvent::Linked(SurfaceAction::Highlight {
            payload: json!({ "seriesIndex": 0, "dataIndex": 2 }),
        }),
    );
    interaction.handle_event(
        origin,
        SurfaceEvent::PrimaryAction {
            point: Some(DataPoint::new("revenue", 2)),
            position: ScreenPoint::new(120.0, 80.0),
        },
    );
    interaction.handle_event(
        origin,
        SurfaceEvent::SecondaryAction {
            point: None,
            position: ScreenPoint::new(300.0, 200.0),
        },
    );
    if let Some(menu) = interaction.context_menu() {
        info!(items = ?menu.items, "Context menu open");
    }
    if !interaction.invoke_context_action("Export") {
        warn!("Export action was not available");
    }
    interaction.drill_up(origin);

    for surface in &surfaces {
        info!(surface = surface.name(), actions = surface.action_count(), "Linked actions received");
    }
    Ok(())
}

async fn animate(easel: &Easel, rows: usize) -> Result<()> {
    let data: Vec<usize> = (0..rows).map(|i| (i * 13) % 97).collect();
    let base = json!({
        "xAxis": { "type": "category" },
        "yAxis": { "type": "value" },
        "series": [{ "type": "line", "data": data }]
    });

    let optimizer = easel.optimizer();
    let config = if optimizer.is_large_dataset(rows) {
        let sampled = optimizer.sample_data(&data, optimizer.recommended_sample_size(rows));
        info!(from = rows, to = sampled.len(), "Sampled large series");
        let mut config = optimizer.optimize_render_config(&base, rows);
        config["series"][0]["data"] = json!(sampled);
        config
    } else {
        easel.animator().apply_default_preset(&base)
    };

    let surface = LoggingSurface::new("trend");
    let transition = easel
        .animator()
        .play_entrance(&*surface, EntranceEffect::FadeIn, config)
        .await;
    info!(phase = ?transition.phase(), "Entrance finished");
    Ok(())
}
