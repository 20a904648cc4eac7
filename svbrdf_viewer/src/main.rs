//! SVBRDF viewer command line front-end
//!
//! Loads meshes and measured materials through `svbrdf_engine` and drives
//! the renderer shell on the headless backend. Window integration lives
//! outside this binary; `render` replays a scripted arcball orbit instead.

mod cli;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{debug, info, warn};

use svbrdf_engine::events::MouseButton;
use svbrdf_engine::assets::LoadOptions;
use svbrdf_engine::foundation::logging;
use svbrdf_engine::prelude::*;
use svbrdf_engine::scene::MaterialDescription;

use cli::{CliArgs, ExportMtlOptions, InspectOptions, RenderOptions, SubCommand};

/// Light used when a scene is built from `--mesh` and `--svbrdf`
const DEFAULT_LIGHT_POSITION: [f32; 3] = [90.0, 90.0, 90.0];
const DEFAULT_LIGHT_INTENSITY: f32 = 8200.0;

/// Horizontal cursor travel per scripted frame, in pixels
const ORBIT_STEP: f32 = 12.0;

/// Errors raised by the front-end itself
#[derive(thiserror::Error, Debug)]
enum ViewerError {
    #[error("Unknown log level '{0}'")]
    LogLevel(String),

    #[error("Material directory does not exist: {0}")]
    MissingSvbrdf(PathBuf),

    #[error("Either --scene or --mesh with --svbrdf is required")]
    MissingSource,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config = ViewerConfig::load_or_default(args.config.as_deref())?;
    let level = match (&args.log_level, args.verbose) {
        (Some(name), _) => name.parse().map_err(|_| ViewerError::LogLevel(name.clone()))?,
        (None, 0) => config.level_filter(),
        (None, verbose) => logging::level_from_verbosity(verbose.saturating_add(2)),
    };
    logging::init_with_level(level);
    debug!("Using configuration {:?}", config);

    match args.command {
        SubCommand::Inspect(options) => inspect(&options, &config),
        SubCommand::ExportMtl(options) => export_mtl(&options, &config),
        SubCommand::Render(options) => render(&options, &config),
    }
}

fn load_options(config: &ViewerConfig) -> LoadOptions {
    LoadOptions { center: config.mesh.center }
}

fn load_mesh(path: &Path, mtl: Option<&Path>, config: &ViewerConfig) -> Result<Mesh, LoadError> {
    let mut mesh = ObjLoader::load_with_materials_and_options(path, load_options(config))?;
    if let Some(mtl) = mtl {
        let applied = MtlParser::load_into(mtl, &mut mesh)?;
        info!("Applied {} materials from {}", applied, mtl.display());
    }
    Ok(mesh)
}

fn inspect(options: &InspectOptions, config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load_mesh(&options.mesh, options.mtl.as_deref(), config)?;
    let (min, max) = mesh.bounding_box();

    info!("Mesh {}", options.mesh.display());
    info!(
        "  {} positions, {} normals, {} uvs, {} faces",
        mesh.positions().len(),
        mesh.normals().len(),
        mesh.uvs().len(),
        mesh.faces().len()
    );
    info!(
        "  {} materials, {} groups, {} objects",
        mesh.num_segments(SegmentKind::Material),
        mesh.num_segments(SegmentKind::Group),
        mesh.num_segments(SegmentKind::Object)
    );
    info!("  bounds [{}, {}, {}] .. [{}, {}, {}]", min.x, min.y, min.z, max.x, max.y, max.z);
    info!("  bounding size {}", mesh.bounding_size());

    for material in mesh.materials() {
        let faces = mesh.filtered_faces(FaceFilter::Material(material.index)).count();
        info!("  material '{}' (#{}) covers {} faces", material.name, material.index, faces);
    }

    if !mesh.uvs().is_empty() {
        let tangents = mesh.expand_tangents(FaceFilter::All);
        if tangents.degenerate_faces > 0 {
            warn!("  {} faces have degenerate texture coordinates", tangents.degenerate_faces);
        }
    }
    Ok(())
}

fn export_mtl(options: &ExportMtlOptions, config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = load_mesh(&options.mesh, options.mtl.as_deref(), config)?;
    let text = mesh.build_mtl();

    match &options.output {
        Some(path) => {
            fs::write(path, text)?;
            info!("Wrote {} materials to {}", mesh.materials().len(), path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Scene that shades every material of `mesh` with one SVBRDF
fn single_svbrdf_scene(
    mesh_path: &Path,
    svbrdf: &Path,
    config: &ViewerConfig,
) -> Result<Scene, Box<dyn std::error::Error>> {
    if !svbrdf.is_dir() {
        return Err(ViewerError::MissingSvbrdf(svbrdf.to_path_buf()).into());
    }

    let mesh = ObjLoader::load_with_materials_and_options(mesh_path, load_options(config))?;
    let described = MaterialDescription::Svbrdf { path: svbrdf.to_path_buf() };
    let mut description = SceneDescription {
        mesh: mesh_path.to_path_buf(),
        mesh_size: config.mesh.target_size,
        center: config.mesh.center,
        lights: vec![Light::new(Vec3::from(DEFAULT_LIGHT_POSITION), DEFAULT_LIGHT_INTENSITY)],
        ..SceneDescription::default()
    };

    if mesh.materials().is_empty() {
        description.materials.insert("default".to_string(), described);
    } else {
        for material in mesh.materials() {
            description.materials.insert(material.name.clone(), described.clone());
        }
    }

    Ok(Scene::from_mesh(mesh, &description, Path::new(""))?)
}

fn render(options: &RenderOptions, config: &ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let scene = match (&options.scene, &options.mesh, &options.svbrdf) {
        (Some(path), _, _) => Scene::load(path)?,
        (None, Some(mesh), Some(svbrdf)) => single_svbrdf_scene(mesh, svbrdf, config)?,
        _ => return Err(ViewerError::MissingSource.into()),
    };
    info!(
        "Scene has {} draws over a mesh of size {}",
        scene.draws.len(),
        scene.mesh.bounding_size()
    );

    config.shaders.validate()?;
    let camera = config.camera.build(config.window.width, config.window.height);
    let mut renderer = scene.into_renderer(HeadlessBackend::new(), camera, &config.shaders)?;

    if let Some(alpha) = options.alpha {
        renderer.update_alpha(alpha)?;
    }

    let (width, height) = (config.window.width as f32, config.window.height as f32);
    let mut cursor = (width * 0.5, height * 0.5);
    let mut script = vec![
        AppEvent::RedrawRequested,
        AppEvent::CursorMoved { x: cursor.0, y: cursor.1 },
        AppEvent::MouseInput { button: MouseButton::Left, pressed: true },
    ];
    for _ in 0..options.frames {
        cursor.0 = (cursor.0 + ORBIT_STEP).min(width - 1.0);
        script.push(AppEvent::CursorMoved { x: cursor.0, y: cursor.1 });
        script.push(AppEvent::RedrawRequested);
    }
    script.push(AppEvent::MouseInput { button: MouseButton::Left, pressed: false });
    script.push(AppEvent::CloseRequested);

    for event in script {
        if renderer.handle_event(event)? == EventResponse::Quit {
            break;
        }
    }

    let eye = renderer.camera().camera().world_position();
    info!(
        "Rendered {} frames with {} draw calls; camera ended at [{:.2}, {:.2}, {:.2}]",
        options.frames + 1,
        renderer.backend().draw_count(),
        eye.x,
        eye.y,
        eye.z
    );
    Ok(())
}
