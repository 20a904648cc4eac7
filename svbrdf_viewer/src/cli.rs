//! Command line arguments

use std::path::PathBuf;

/// SVBRDF viewer command line interface arguments.
#[derive(clap::Parser, Debug)]
#[clap(
    author,
    version,
    about = "Inspect Wavefront meshes and render measured SVBRDF materials."
)]
pub struct CliArgs {
    /// Raise log verbosity; repeat for more detail.
    #[clap(short, long, action = clap::ArgAction::Count, help = "Use verbose output (-v debug, -vv trace)")]
    pub verbose: u8,

    /// Explicit log level, overriding `-v` and the config file.
    #[clap(long, help = "Set the log level [error, warn, info, debug, trace]")]
    pub log_level: Option<String>,

    /// Viewer configuration file (TOML or RON).
    #[clap(short, long, global = true, help = "Path to the viewer config file")]
    pub config: Option<PathBuf>,

    /// Command to execute.
    #[clap(subcommand)]
    pub command: SubCommand,
}

/// Viewer command.
#[derive(clap::Subcommand, Debug)]
pub enum SubCommand {
    /// Prints mesh statistics.
    Inspect(InspectOptions),

    /// Writes the material library of a mesh.
    #[clap(name = "export-mtl")]
    ExportMtl(ExportMtlOptions),

    /// Renders a scene on the headless backend.
    Render(RenderOptions),
}

/// Options for `inspect`.
#[derive(clap::Args, Debug)]
pub struct InspectOptions {
    /// OBJ file to read.
    pub mesh: PathBuf,

    /// Material library applied on top of the mesh's own `mtllib` entries.
    #[clap(long)]
    pub mtl: Option<PathBuf>,
}

/// Options for `export-mtl`.
#[derive(clap::Args, Debug)]
pub struct ExportMtlOptions {
    /// OBJ file to read.
    pub mesh: PathBuf,

    /// Material library applied before exporting.
    #[clap(long)]
    pub mtl: Option<PathBuf>,

    /// Output file; stdout when omitted.
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

/// Options for `render`.
#[derive(clap::Args, Debug)]
#[clap(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["scene", "mesh"]),
))]
pub struct RenderOptions {
    /// Scene description (TOML or RON).
    #[clap(long)]
    pub scene: Option<PathBuf>,

    /// OBJ file drawn with a single SVBRDF.
    #[clap(long, requires = "svbrdf")]
    pub mesh: Option<PathBuf>,

    /// SVBRDF directory used with `--mesh`.
    #[clap(long)]
    pub svbrdf: Option<PathBuf>,

    /// Override the measured specular lobe exponent.
    #[clap(long)]
    pub alpha: Option<f32>,

    /// Number of frames in the scripted orbit.
    #[clap(long, default_value_t = 8)]
    pub frames: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_render_requires_a_source() {
        assert!(CliArgs::try_parse_from(["svbrdf_viewer", "render"]).is_err());
        assert!(CliArgs::try_parse_from(["svbrdf_viewer", "render", "--mesh", "a.obj"]).is_err());

        let args = CliArgs::try_parse_from(["svbrdf_viewer", "render", "--mesh", "a.obj", "--svbrdf", "leather"]).unwrap();
        match args.command {
            SubCommand::Render(options) => {
                assert_eq!(options.frames, 8);
                assert_eq!(options.svbrdf, Some(PathBuf::from("leather")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_counts() {
        let args = CliArgs::try_parse_from(["svbrdf_viewer", "-vv", "inspect", "bunny.obj"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, SubCommand::Inspect(InspectOptions { mtl: None, .. })));
    }

    #[test]
    fn test_export_mtl_name() {
        let args = CliArgs::try_parse_from(["svbrdf_viewer", "export-mtl", "bunny.obj", "-o", "out.mtl"]).unwrap();
        assert!(matches!(args.command, SubCommand::ExportMtl(ExportMtlOptions { output: Some(_), .. })));
    }
}
