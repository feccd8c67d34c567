use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use pixelstage::color::ansi_color_string;
use pixelstage::model::{source, Model};
use pixelstage::palette::{color_from_palette, Blend, RAINBOW_COLORS};

const GIT_HASH: &str = match option_env!("PIXELSTAGE_GIT_HASH") {
    Some(hash) => hash,
    None => "unknown",
};

/// Load a YAML model definition, print its summary, and run the validation
/// checks. Exits nonzero when the model fails validation.
#[derive(Parser, Debug)]
#[command(name = "model-inspect", version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARGO_PKG_NAME"), ")"))]
struct Args {
    /// Path to the model definition YAML.
    model: PathBuf,

    /// Skip the geometric checks (planarity, coordinate bounds).
    #[arg(long)]
    no_geometry: bool,

    /// Skip the data-integrity checks (ids, indexing, edge symmetry).
    #[arg(long)]
    no_integrity: bool,

    /// Emit the validation report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Render one ANSI color row per face from a black frame.
    #[arg(long)]
    preview: bool,

    /// Print the embedded git hash and exit.
    #[arg(long)]
    git_hash: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if args.git_hash {
        println!("{GIT_HASH}");
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(valid) => {
            if valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let def = source::load_model_def(&args.model)?;
    let model = Model::new(def)?;

    if !args.json {
        print_summary(&model);
    }

    let report = model.validate_model(!args.no_geometry, !args.no_integrity);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "validation: {} ({} checks, {} failed)",
            if report.is_valid { "ok" } else { "FAILED" },
            report.total_checks,
            report.failed_checks
        );
        for error in &report.errors {
            println!("  - {error}");
        }
        if args.preview {
            print_preview(&model);
        }
    }

    Ok(report.is_valid)
}

fn print_summary(model: &Model) {
    let def = model.def();
    println!("{} v{} ({})", def.name, def.version, def.model_type);
    if !def.description.is_empty() {
        println!("  {}", def.description);
    }
    println!(
        "  {} LEDs on {} faces, sphere radius {:.1} mm",
        model.point_count(),
        model.face_count(),
        model.sphere_radius()
    );
    let hw = model.hardware();
    println!(
        "  {} chain, {} order, {:.1} mm spacing, {} mA max per LED",
        hw.led_type, hw.color_order, hw.led_spacing_mm, hw.max_current_per_led_ma
    );
    for face in model.faces() {
        let report = face.validate_geometry();
        println!(
            "  position {}: face {} ({:?}), LEDs {}..{}, radius {:.1} mm, groups [{}]",
            face.geometric_id(),
            face.id(),
            face.face_type().polygon,
            face.led_range().start,
            face.led_range().end,
            report.face_radius,
            face.group_names().join(", ")
        );
    }
}

// One ANSI row per geometric position, hue-coded so the physical layout can
// be eyeballed against the wiring order.
fn print_preview(model: &Model) {
    let faces = model.face_count().max(1);
    for face in model.faces() {
        let hue = (face.geometric_id() as usize * 255 / faces) as u8;
        let color = color_from_palette(&RAINBOW_COLORS, hue, 255, Blend::Linear);
        let cells: String = face.led_range().map(|_| ansi_color_string(color)).collect();
        println!("  position {:>2} -> face {:>2}: {cells}", face.geometric_id(), face.id());
    }
}
