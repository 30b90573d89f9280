use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use nlp_api_core::provisioning::{assemble_api, plan_fingerprint, DeploymentEnvironment};
use nlp_api_core::template::{render_template, ArtifactLocation};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const RUNTIME_BIN: &str = "nlp_runtime";
const DIST_DIR: &str = "infra/dist";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the NLP API workspace",
    long_about = "A unified CLI for packaging the Lambda runtime, synthesizing\n\
                  the deployment template, and running CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and package the Rust Lambda runtime as a bootstrap zip
    ServerlessPackage {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Write the CloudFormation template for a deployment stage
    Synth {
        /// Deployment environment (staging or prod)
        #[arg(long, env = "STAGE", default_value = "staging", value_parser = parse_stage)]
        stage: DeploymentEnvironment,
        /// S3 bucket holding the packaged runtime zip
        #[arg(long, env = "ARTIFACT_BUCKET")]
        artifact_bucket: String,
        /// S3 key of the packaged runtime zip
        #[arg(long, default_value = "nlp-api/runtime.zip")]
        artifact_key: String,
        /// Output file path; defaults to infra/dist/<stage>-template.json
        #[arg(long)]
        output: Option<String>,
    },
    /// Print the route table for a deployment stage
    Routes {
        /// Deployment environment (staging or prod)
        #[arg(long, env = "STAGE", default_value = "staging", value_parser = parse_stage)]
        stage: DeploymentEnvironment,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting and clippy
    Check,
    /// Unit and integration tests
    Test,
    /// Run check + test
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

fn parse_stage(value: &str) -> Result<DeploymentEnvironment, String> {
    value.parse().map_err(|error| format!("{error}"))
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_serverless_lambda(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build NLP runtime binary");

    let mut cargo_args = vec![
        "build",
        "-p",
        "nlp_api_lambda",
        "--target",
        target,
        "--bin",
        RUNTIME_BIN,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package lambda zip artifact");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    package_lambda_zip(
        &target_dir.join(binary_name(RUNTIME_BIN, target)),
        &dist_dir.join("runtime.zip"),
    );

    eprintln!(
        "\nPackaged artifact:\n- {}",
        dist_dir.join("runtime.zip").display()
    );
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

fn synth(
    stage: DeploymentEnvironment,
    artifact: ArtifactLocation,
    output: Option<String>,
) {
    step(&format!("Synthesize {stage} template"));

    let plan = assemble_api(stage);
    let fingerprint = plan_fingerprint(&plan).expect("failed to fingerprint api plan");
    let template = render_template(&plan, &artifact).expect("failed to render template");
    let rendered = serde_json::to_string_pretty(&template).expect("failed to serialize template");

    let output = output.unwrap_or_else(|| format!("{DIST_DIR}/{stage}-template.json"));
    let output_path = Path::new(&output);
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).expect("failed to create template directory");
    }
    fs::write(output_path, rendered).expect("failed to write template");

    eprintln!(
        "\nTemplate:\n- {}\n- plan fingerprint {fingerprint}",
        output_path.display()
    );
}

fn print_routes(stage: DeploymentEnvironment) {
    let plan = assemble_api(stage);
    println!("{} (stage: {})", plan.rest_api_name, plan.stage_name);
    for (route, function) in plan.routes.iter().zip(&plan.functions) {
        let actions: Vec<&str> = function
            .policy
            .statements
            .iter()
            .flat_map(|statement| statement.actions.iter().map(String::as_str))
            .collect();
        println!(
            "{:<6} {:<34} -> {:<28} [{}]",
            route.method,
            route.path,
            route.function_id,
            actions.join(", ")
        );
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);
}

fn ci_test() {
    step("Test nlp_api_core");
    run_cargo(&["test", "-p", "nlp_api_core"]);

    step("Test nlp_api_lambda");
    run_cargo(&["test", "-p", "nlp_api_lambda"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::ServerlessPackage { target, profile } => {
            package_serverless_lambda(&target, profile);
        }
        Commands::Synth {
            stage,
            artifact_bucket,
            artifact_key,
            output,
        } => {
            synth(
                stage,
                ArtifactLocation {
                    bucket: artifact_bucket,
                    key: artifact_key,
                },
                output,
            );
        }
        Commands::Routes { stage } => print_routes(stage),
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Test => ci_test(),
                CiJob::All => {
                    ci_check();
                    ci_test();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
