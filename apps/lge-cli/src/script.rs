use std::path::Path;

use anyhow::{Context, bail};
use lge_engine::Engine;
use lge_render::DrawBackend;
use serde::Deserialize;
use serde_json::Value;

/// A scripted run: each frame is a list of `["name", args...]` calls.
#[derive(Debug, Deserialize)]
pub struct Script {
    pub frames: Vec<Vec<Vec<Value>>>,
}

/// Totals over a scripted run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub calls: usize,
    pub rects: usize,
    pub pixels: u64,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> anyhow::Result<Self> {
        serde_json::from_str(data).context("parsing script JSON")
    }

    /// Execute every frame, presenting after each one unless its last call
    /// already was `present`.
    pub fn run<B: DrawBackend>(
        &self,
        engine: &mut Engine<B>,
        mut after_frame: impl FnMut(usize, &mut Engine<B>),
    ) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();
        for (n, frame) in self.frames.iter().enumerate() {
            let mut presented = false;
            for (c, call) in frame.iter().enumerate() {
                let Some((name, args)) = call.split_first() else {
                    bail!("frame {n}, call {c}: empty call");
                };
                let Some(name) = name.as_str() else {
                    bail!("frame {n}, call {c}: function name must be a string");
                };
                let result = engine
                    .invoke(name, args)
                    .with_context(|| format!("frame {n}, call {c} ({name})"))?;
                summary.calls += 1;
                presented = name == "present";
                if presented {
                    add_report(&mut summary, &result);
                }
                tracing::debug!(frame = n, function = name, %result, "call");
            }
            if !presented {
                let report = engine.present();
                summary.rects += report.rects.len();
                summary.pixels += report.pixels;
            }
            summary.frames += 1;
            after_frame(n, engine);
        }
        Ok(summary)
    }
}

fn add_report(summary: &mut RunSummary, result: &Value) {
    summary.rects += result["rects"].as_u64().unwrap_or(0) as usize;
    summary.pixels += result["pixels"].as_u64().unwrap_or(0);
}
