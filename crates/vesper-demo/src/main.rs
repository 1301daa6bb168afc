//! Scripted frame loop driving LOD selection, UI batching and the frame counters.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p vesper-demo -- --frames 300 --log-level debug`.

mod sink;

use std::f32::consts::{FRAC_PI_4, TAU};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use glam::{Mat4, Vec3};
use tracing::{debug, error, info, warn};
use vesper_config::{BatchConfig, CliArgs, Config};
use vesper_lod::{
    Camera, LodError, LodGroup, LodGroupId, LodRenderer, LodSelection, ModelId, RenderScene,
    SceneId, Transform,
};
use vesper_math::Aabb;
use vesper_profiler::{Counter, CounterOptions, PerfCounter};
use vesper_render::{
    AccessorLimits, BatchError, BatchMerger, MaterialId, Quad, RenderCommand, TextureId,
};

use sink::RecordingSink;

const FRAME_MS: f64 = 1000.0 / 60.0;
const GROUP_COUNT: u64 = 8;
const RING_RADIUS: f32 = 3.0;
const VARIANTS_PER_GROUP: u64 = 3;

const PANEL_MATERIAL: MaterialId = MaterialId(200);
const LABEL_MATERIAL: MaterialId = MaterialId(100);
const FONT_ATLAS: TextureId = TextureId(999);
/// Frames (mod 30) on which the label material is edited mid-frame.
const LABEL_EDIT_FRAME: u32 = 15;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("LOD selection failed: {0}")]
    Lod(#[from] LodError),
    #[error("batching failed: {0}")]
    Batch(#[from] BatchError),
}

/// A mesh variant with fixed world bounds.
#[derive(Debug, Clone)]
struct DemoMesh {
    bounds: Aabb,
    model: ModelId,
}

impl LodRenderer for DemoMesh {
    fn world_bounds(&self) -> Option<Aabb> {
        Some(self.bounds)
    }

    fn model(&self) -> Option<ModelId> {
        Some(self.model)
    }
}

/// Accessor sizing from the batch config. Index room is six per vertex, enough for quads.
fn accessor_limits(config: &BatchConfig) -> AccessorLimits {
    AccessorLimits {
        initial_vertex_capacity: config.initial_vertex_capacity,
        initial_index_capacity: config.initial_index_capacity,
        max_vertices: config.max_vertices_per_accessor,
        max_indices: config.max_vertices_per_accessor.saturating_mul(6),
    }
}

/// Distance of the dolly camera from the ring plane on `frame`.
fn dolly_distance(frame: u32) -> f32 {
    0.5 + (frame % 80) as f32 * 0.2
}

/// Frame stats reported by [`Demo::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameStats {
    visible: usize,
    culled: usize,
    batches: usize,
    uploads: usize,
}

struct Demo {
    scene: RenderScene,
    groups: Vec<(LodGroup<DemoMesh>, Transform)>,
    perspective: Camera,
    overlay: Camera,
    merger: BatchMerger,
    sink: RecordingSink,
    fps: PerfCounter,
    merge_time: PerfCounter,
    draw_calls: Counter,
    clock: Instant,
}

impl Demo {
    fn new(config: &Config) -> Result<Self, DemoError> {
        let mut scene = RenderScene::new(SceneId(1));
        let mut groups = Vec::with_capacity(GROUP_COUNT as usize);

        for i in 0..GROUP_COUNT {
            let angle = i as f32 / GROUP_COUNT as f32 * TAU;
            let node = Transform::from_translation(Vec3::new(
                angle.cos() * RING_RADIUS,
                angle.sin() * RING_RADIUS,
                0.0,
            ));
            // Coarser variants sit inside the full one.
            let meshes = (0..VARIANTS_PER_GROUP).map(|lod| DemoMesh {
                bounds: Aabb::from_center_half_extents(
                    node.translation,
                    Vec3::splat(1.0 - 0.1 * lod as f32),
                ),
                model: ModelId(i * VARIANTS_PER_GROUP + lod),
            });
            let mut group = LodGroup::from_renderers(LodGroupId(i), meshes, &node);
            if i % 2 == 1 {
                // Normalizing leaves the selection unchanged.
                group.reset_object_size()?;
            }
            scene.add_lod_group(&mut group)?;
            groups.push((group, node));
        }

        let window = config.profiler.average_window_ms;
        Ok(Self {
            scene,
            groups,
            perspective: Camera::perspective(
                Vec3::new(0.0, 0.0, dolly_distance(0)),
                FRAC_PI_4,
                16.0 / 9.0,
            ),
            overlay: Camera::orthographic(Vec3::new(0.0, 0.0, 10.0), 4.0, 2.5),
            merger: BatchMerger::new(accessor_limits(&config.batch)),
            sink: RecordingSink::default(),
            fps: PerfCounter::new(
                "fps",
                CounterOptions {
                    average_window_ms: Some(window),
                    below: Some(30.0),
                    ..CounterOptions::default()
                },
                0.0,
            ),
            merge_time: PerfCounter::new("merge_ms", CounterOptions::averaged(window), 0.0),
            draw_calls: Counter::new(
                "draw_calls",
                CounterOptions {
                    average_window_ms: Some(window),
                    is_integer: true,
                    ..CounterOptions::default()
                },
                0.0,
            ),
            clock: Instant::now(),
        })
    }

    fn elapsed_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    fn detach_group(&mut self, id: LodGroupId) -> bool {
        self.groups
            .iter_mut()
            .find(|(group, _)| group.id() == id)
            .is_some_and(|(group, _)| self.scene.remove_lod_group(group))
    }

    fn select(&self, camera: &Camera) -> Result<Vec<LodSelection>, LodError> {
        self.scene
            .select_visible(camera, self.groups.iter().map(|(group, node)| (group, node)))
    }

    fn frame(&mut self, index: u32) -> Result<FrameStats, DemoError> {
        self.perspective.position.z = dolly_distance(index);
        let world = self.select(&self.perspective)?;
        let minimap = self.select(&self.overlay)?;

        let merge_start = self.elapsed_ms();
        self.merge_time.start(merge_start);
        self.merger.reset();

        let panel = Quad::new(0.0, 0.0, 320.0, 240.0, [0.1, 0.1, 0.1, 0.8]);
        self.merger
            .force_merge_batches(PANEL_MATERIAL, None, &[panel.geometry()])?;

        for selection in &world {
            let Some(level) = selection.level else {
                continue;
            };
            let x = selection.group.0 as f32 * 40.0;
            let icon = Quad::new(x, 200.0, 32.0, 32.0, [1.0; 4]);
            self.merger.submit(RenderCommand {
                geometry: icon.geometry(),
                material: MaterialId(level as u64),
                texture: Some(TextureId(level as u64)),
                transform: None,
            })?;
        }

        let label = Quad::new(0.0, 0.0, 36.0, 10.0, [1.0, 1.0, 0.8, 1.0]);
        for (n, selection) in world.iter().enumerate() {
            if index % 30 == LABEL_EDIT_FRAME && n == world.len() / 2 {
                self.merger.flush_material(LABEL_MATERIAL);
            }
            let offset = Mat4::from_translation(Vec3::new(
                selection.group.0 as f32 * 40.0,
                186.0,
                0.0,
            ));
            self.merger.commit(
                label.geometry(),
                LABEL_MATERIAL,
                Some(FONT_ATLAS),
                Some(&offset),
            )?;
        }

        for selection in &minimap {
            if let Some(level) = selection.level {
                let x = 240.0 + selection.group.0 as f32 * 8.0;
                let dot = Quad::new(x, 8.0, 6.0, 6.0, [0.3, 0.9, 0.3, 1.0]);
                self.merger
                    .commit(dot.geometry(), MaterialId(300 + level as u64), None, None)?;
            }
        }

        self.merger.finish_merge_batches();
        self.sink.clear();
        let uploads = self.merger.upload_buffers(&mut self.sink);
        let merge_end = self.elapsed_ms();
        self.merge_time.end(merge_end);

        let now = f64::from(index + 1) * FRAME_MS;
        let batches = self.merger.batches().len();
        self.fps.frame(now);
        self.draw_calls.set_value(batches as f64);
        self.draw_calls.sample(now);

        let visible = world.iter().filter(|s| s.level.is_some()).count();
        let stats = FrameStats {
            visible,
            culled: world.len() - visible,
            batches,
            uploads,
        };
        debug!(
            frame = index,
            distance = self.perspective.position.z,
            visible = stats.visible,
            culled = stats.culled,
            batches = stats.batches,
            flushes_on_growth = self.merger.stats().growth_flushes,
            "frame merged"
        );
        Ok(stats)
    }

    fn report(&self) {
        let snapshots = [
            self.fps.snapshot(),
            self.merge_time.snapshot(),
            self.draw_calls.snapshot(),
        ];
        for snapshot in &snapshots {
            if snapshot.alarm {
                warn!(counter = %snapshot.id, value = snapshot.value, "counter out of range");
            }
        }
        match serde_json::to_string(&snapshots) {
            Ok(json) => info!("Counters: {json}"),
            Err(e) => warn!("Failed to serialize counters: {e}"),
        }
        info!(
            "Uploaded {} bytes, {} GPU buffer reallocations",
            self.sink.bytes(),
            self.sink.reallocations()
        );
        for record in self.sink.records() {
            debug!(
                accessor = ?record.accessor,
                generation = record.generation,
                vertices = record.vertices,
                indices = record.indices,
                "last frame upload"
            );
        }
    }
}

fn run(config: &Config, frames: u32) -> Result<(), DemoError> {
    let mut demo = Demo::new(config)?;
    info!("Running {frames} frames over {} LOD groups", demo.scene.len());

    for index in 0..frames {
        if index == frames / 2 && demo.detach_group(LodGroupId(0)) {
            info!("Detached LOD group 0 at frame {index}");
        }
        let stats = demo.frame(index)?;
        if stats.uploads == 0 {
            warn!(frame = index, "nothing uploaded");
        }
    }

    demo.report();
    Ok(())
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vesper")
    });

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    vesper_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = run(&config, args.frames) {
        error!("{e}");
        std::process::exit(1);
    }
}
