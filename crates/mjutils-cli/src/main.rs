//! `mjutils-cli` – command line front end for the MJCF and physics-model
//! helpers.
//!
//! ```text
//! mjutils clean robot.xml -o robot_clean.xml
//! mjutils tree robot.xml --bodies-only
//! mjutils reframe robot.xml forearm --pos 0 0 0.1 --quat 1 0 0 0
//! mjutils reparent robot.xml gripper torso
//! mjutils dofs robot.json knee
//! mjutils damping robot.json
//! ```
//!
//! Defaults for number formatting and enabled observables come from
//! `~/.mjutils/config.toml`; flags override them.

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::{debug, warn};

use mjutils_mjcf::{
    Element, ExportOptions, kinematic_summary, mjcf_tree, parse_file, print_tree, reparent_body,
    set_body_frame, to_clean_xml, world_pose, write_clean_xml,
};
use mjutils_physics::{
    JointRef, ObservableSet, PhysicsModel, classify_actuator, critical_damping, damping_ratio,
    effective_stiffness, joint_id, joint_to_dof_ids,
};
use mjutils_types::{MjError, ObjectKind, Pose, Quaternion, TransmissionType, Vec3};

#[derive(Debug, Parser)]
#[command(name = "mjutils", version, about = "MJCF cleanup and physics-model inspection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-export an MJCF file as tidy XML.
    Clean {
        xml: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Print the element tree under <worldbody>.
    Tree {
        xml: PathBuf,
        /// Only list bodies.
        #[arg(long)]
        bodies_only: bool,
    },
    /// Print the world pose of a body.
    Pose { xml: PathBuf, body: String },
    /// Move a body's frame without moving its children in the world.
    Reframe(ReframeArgs),
    /// Move a body under another parent, keeping its world pose.
    Reparent {
        xml: PathBuf,
        body: String,
        new_parent: String,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// DoF indices of a joint in a compiled model dump.
    Dofs { model: PathBuf, joint: String },
    /// Classify every actuator of a compiled model dump.
    Actuators { model: PathBuf },
    /// Critical damping per DoF, for one joint or all of them.
    Damping { model: PathBuf, joint: Option<String> },
    /// List sensor observables and which are enabled.
    Observables {
        model: PathBuf,
        /// Enable observables whose name contains this substring.
        #[arg(long = "enable", value_name = "SUBSTR")]
        enable: Vec<String>,
    },
    /// Print the JSON schema of the compiled model dump.
    Schema,
    /// Show the configuration, or write the defaults with --init.
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Write to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Significant digits (overrides the config file).
    #[arg(long)]
    precision: Option<usize>,
    /// Flush magnitudes below this to zero (overrides the config file).
    #[arg(long)]
    zero_threshold: Option<f64>,
}

#[derive(Debug, Args)]
struct ReframeArgs {
    xml: PathBuf,
    body: String,
    /// New frame position relative to the body's parent.
    #[arg(long, required = true, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    pos: Vec<f64>,
    /// New frame orientation relative to the body's parent.
    #[arg(long, num_args = 4, value_names = ["W", "X", "Y", "Z"], allow_negative_numbers = true)]
    quat: Option<Vec<f64>>,
    #[command(flatten)]
    output: OutputArgs,
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the level (default "info"); MJUTILS_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Logs go to stderr so stdout stays
    // clean for XML output.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("MJUTILS_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();

    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable config; using defaults");
            config::Config::default()
        }
    };

    match run(cli.command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, cfg: &config::Config) -> Result<(), MjError> {
    match command {
        Command::Clean { xml, output } => {
            let root = parse_file(&xml)?;
            emit_xml(&root, &output, cfg)
        }
        Command::Tree { xml, bodies_only } => {
            let root = parse_file(&xml)?;
            let world = root
                .child("worldbody")
                .ok_or_else(|| MjError::not_found("element", "worldbody"))?;
            let s = kinematic_summary(&root);
            println!(
                "{} {} bodies, {} joints, {} geoms, {} sites, {} actuators, {} sensors",
                "model:".bold(),
                s.bodies,
                s.joints,
                s.geoms,
                s.sites,
                s.actuators,
                s.sensors
            );
            print_tree(&mjcf_tree(world, bodies_only));
            Ok(())
        }
        Command::Pose { xml, body } => {
            let root = parse_file(&xml)?;
            let pose = world_pose(&root, &body)?;
            println!("{} {}", "pos ".bold(), join(&pose.pos.to_array()));
            println!("{} {}", "quat".bold(), join(&pose.quat.to_array()));
            Ok(())
        }
        Command::Reframe(args) => {
            let mut root = parse_file(&args.xml)?;
            let frame = parse_pose(&args.pos, args.quat.as_deref())?;
            set_body_frame(&mut root, &args.body, frame)?;
            emit_xml(&root, &args.output, cfg)
        }
        Command::Reparent {
            xml,
            body,
            new_parent,
            output,
        } => {
            let mut root = parse_file(&xml)?;
            reparent_body(&mut root, &body, &new_parent)?;
            emit_xml(&root, &output, cfg)
        }
        Command::Dofs { model, joint } => {
            let model = PhysicsModel::load(&model)?;
            let joint = joint_ref(&model, &joint);
            let id = joint_id(&model, joint)?;
            let dofs: Vec<String> = joint_to_dof_ids(&model, id)?.map(|d| d.to_string()).collect();
            println!(
                "{} {} ({:?}): {}",
                "joint".bold(),
                model.id2name(id, ObjectKind::Joint)?,
                model.jnt_type[id],
                dofs.join(" ")
            );
            Ok(())
        }
        Command::Actuators { model } => {
            let model = PhysicsModel::load(&model)?;
            for id in 0..model.nu() {
                let kind = classify_actuator(&model, id)?;
                let target = actuator_target(&model, id);
                println!(
                    "{:>3}  {:<20} {:<32} {}",
                    id,
                    model.id2name(id, ObjectKind::Actuator)?.bold(),
                    kind.to_string(),
                    target.dimmed()
                );
            }
            Ok(())
        }
        Command::Damping { model, joint } => {
            let model = PhysicsModel::load(&model)?;
            let joints = match joint {
                Some(j) => vec![joint_id(&model, joint_ref(&model, &j))?],
                None => (0..model.njnt()).collect(),
            };
            println!(
                "{}",
                format!(
                    "{:<16} {:>4} {:>12} {:>12} {:>12} {:>12} {:>8}",
                    "joint", "dof", "stiffness", "inertia", "critical", "damping", "ratio"
                )
                .bold()
            );
            for j in joints {
                let k = effective_stiffness(&model, j)?;
                let critical = critical_damping(&model, j)?;
                let ratio = damping_ratio(&model, j)?;
                for (i, dof) in joint_to_dof_ids(&model, j)?.enumerate() {
                    println!(
                        "{:<16} {:>4} {:>12.5} {:>12.5} {:>12.5} {:>12.5} {:>8.3}",
                        model.id2name(j, ObjectKind::Joint)?,
                        dof,
                        k,
                        model.dof_m0[dof],
                        critical[i],
                        model.dof_damping[dof],
                        ratio[i]
                    );
                }
            }
            Ok(())
        }
        Command::Observables { model, enable } => {
            let model = PhysicsModel::load(&model)?;
            let mut set = ObservableSet::from_model(&model)?;
            let patterns: Vec<&String> = cfg.enabled_observables.iter().chain(&enable).collect();
            let matched = set.enable_matching(&patterns);
            debug!(matched, "observables enabled");
            for obs in set.iter() {
                let mark = if obs.enabled {
                    "on ".green()
                } else {
                    "off".dimmed()
                };
                println!("{mark}  {:<24} {:<16} dim={}", obs.name, obs.sensor_type, obs.dim);
            }
            Ok(())
        }
        Command::Schema => {
            println!("{}", PhysicsModel::json_schema()?);
            Ok(())
        }
        Command::Config { init } => {
            let path = config::config_path();
            if init {
                config::save(&config::Config::default())?;
                println!("{} wrote {}", "✓".green().bold(), path.display());
            } else {
                println!("{} {}", "config:".bold(), path.display());
                println!("  precision           = {}", cfg.precision);
                println!("  zero_threshold      = {}", cfg.zero_threshold);
                println!("  enabled_observables = {:?}", cfg.enabled_observables);
            }
            Ok(())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn export_options(output: &OutputArgs, cfg: &config::Config) -> ExportOptions {
    let mut opts = cfg.export_options();
    if let Some(p) = output.precision {
        opts.precision = p;
    }
    if let Some(z) = output.zero_threshold {
        opts.zero_threshold = z;
    }
    opts
}

fn emit_xml(root: &Element, output: &OutputArgs, cfg: &config::Config) -> Result<(), MjError> {
    let opts = export_options(output, cfg);
    match &output.output {
        Some(path) => write_out(root, path, &opts),
        None => {
            print!("{}", to_clean_xml(root, &opts)?);
            Ok(())
        }
    }
}

fn write_out(root: &Element, path: &Path, opts: &ExportOptions) -> Result<(), MjError> {
    write_clean_xml(root, path, opts)?;
    eprintln!("{} wrote {}", "✓".green().bold(), path.display());
    Ok(())
}

/// A joint argument is a name, or an id when no joint has that name.
fn joint_ref<'a>(model: &PhysicsModel, arg: &'a str) -> JointRef<'a> {
    if model.name2id(arg, ObjectKind::Joint).is_err()
        && let Ok(id) = arg.parse::<usize>()
    {
        return JointRef::Id(id);
    }
    JointRef::Name(arg)
}

fn parse_pose(pos: &[f64], quat: Option<&[f64]>) -> Result<Pose, MjError> {
    let pos: [f64; 3] = pos.try_into().map_err(|_| invalid_frame("pos", "expected 3 numbers"))?;
    let quat = match quat {
        None => Quaternion::identity(),
        Some(q) => {
            let q: [f64; 4] = q
                .try_into()
                .map_err(|_| invalid_frame("quat", "expected 4 numbers"))?;
            Quaternion::from_array(q)
                .normalized()
                .ok_or_else(|| invalid_frame("quat", "zero quaternion"))?
        }
    };
    Ok(Pose::new(Vec3::from_array(pos), quat))
}

fn invalid_frame(attribute: &str, details: &str) -> MjError {
    MjError::InvalidAttribute {
        element: "frame".to_string(),
        attribute: attribute.to_string(),
        details: details.to_string(),
    }
}

/// Human-readable transmission target of actuator `id`.
///
/// Targets whose names are missing from the model are shown by id.
fn actuator_target(model: &PhysicsModel, id: usize) -> String {
    let (Some(&trntype), Some(&[trnid, _])) =
        (model.actuator_trntype.get(id), model.actuator_trnid.get(id))
    else {
        return "?".to_string();
    };
    let kind = match trntype {
        TransmissionType::Joint | TransmissionType::JointInParent => Some(ObjectKind::Joint),
        TransmissionType::Site => Some(ObjectKind::Site),
        TransmissionType::Body => Some(ObjectKind::Body),
        TransmissionType::SliderCrank | TransmissionType::Tendon => None,
    };
    match (kind, usize::try_from(trnid)) {
        (Some(kind), Ok(target)) => match model.id2name(target, kind) {
            Ok(name) => format!("{kind} {name}"),
            Err(_) => format!("{kind} #{target}"),
        },
        _ => format!("{trntype:?} {trnid}"),
    }
}

fn join(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
