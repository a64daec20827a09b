//! wirebind-gen - generate a dispatcher and contract from files
//!
//! For projects that produce their schema outside a build script (another
//! tool writing the JSON form, or a test that dumps `demo_api::schema()`),
//! this binary runs the same generator from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Write a default configuration file
//! cargo run -p wirebind-gen -- --schema schema.json
//!
//! # Edit wirebind.toml, then generate
//! cargo run -p wirebind-gen -- --schema schema.json --config wirebind.toml
//!
//! # Override the output locations
//! cargo run -p wirebind-gen -- --schema schema.json \
//!     --dispatcher-out src/generated.rs --contract-out web/src/api.ts
//! ```
//!
//! # Configuration
//!
//! The TOML file holds the build registrations at top level and the output
//! paths in an `[output]` table:
//!
//! ```toml
//! crate_name = "demo_api"
//! context_extractors = ["demo_api::auth::session"]
//! dependencies = ["demo_api::store::UserStore"]
//!
//! [routes]
//! "math.add" = ["demo_api::math::add"]
//!
//! [output]
//! dispatcher = "src/generated/dispatcher.rs"
//! contract = "web/src/contract.ts"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wirebind_codegen::{BuildConfig, Builder};
use wirebind_core::{ObservabilityConfig, Schema};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a wirebind dispatcher and TypeScript contract", long_about = None)]
struct Args {
    /// Schema JSON describing the API's types and functions
    #[arg(short, long)]
    schema: PathBuf,

    /// Build configuration file
    #[arg(short, long, default_value = "wirebind.toml")]
    config: PathBuf,

    /// Where to write the dispatcher, overriding `[output].dispatcher`
    #[arg(long)]
    dispatcher_out: Option<PathBuf>,

    /// Where to write the contract, overriding `[output].contract`
    #[arg(long)]
    contract_out: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GenConfig {
    #[serde(flatten)]
    build: BuildConfig,
    #[serde(default)]
    output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct OutputConfig {
    dispatcher: PathBuf,
    contract: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dispatcher: PathBuf::from("src/generated/dispatcher.rs"),
            contract: PathBuf::from("web/src/contract.ts"),
        }
    }
}

fn load_config(path: &Path) -> Result<GenConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn load_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse schema {}", path.display()))
}

/// Generate both artifacts; returns the paths written, or `None` when a
/// default config was created instead
fn run(args: &Args) -> Result<Option<(PathBuf, PathBuf)>> {
    if !args.config.exists() {
        println!("Config file not found, creating default: {}", args.config.display());
        let config_toml = toml::to_string_pretty(&GenConfig::default())?;
        fs::write(&args.config, config_toml).context("Failed to write default config")?;
        println!("Add routes to {} and run again", args.config.display());
        return Ok(None);
    }

    let config = load_config(&args.config)?;
    let schema = load_schema(&args.schema)?;
    tracing::debug!(
        types = schema.types.len(),
        functions = schema.functions.len(),
        "Loaded schema"
    );

    let routes = config.build.routes.len();
    let artifacts = Builder::from_config(schema, config.build)
        .build()
        .context("Generation failed")?;

    let dispatcher = args.dispatcher_out.clone().unwrap_or(config.output.dispatcher);
    let contract = args.contract_out.clone().unwrap_or(config.output.contract);
    artifacts.write(&dispatcher, &contract)?;

    println!("Generated {routes} methods");
    println!("  ✓ Dispatcher: {}", dispatcher.display());
    println!("  ✓ Contract:   {}", contract.display());
    Ok(Some((dispatcher, contract)))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _telemetry = ObservabilityConfig::new("wirebind-gen")
        .without_export()
        .with_log_level(args.log_level.clone())
        .init()
        .context("Failed to initialise logging")?;
    run(&args)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebind_core::{FunctionSig, Param, Primitive, TypeNode};

    fn write_schema(dir: &Path) -> PathBuf {
        let int = TypeNode::primitive(Primitive::I32);
        let mut schema = Schema::new();
        schema.insert_function(
            FunctionSig::new("calc::add")
                .param(Param::owned(int.clone()))
                .param(Param::owned(int.clone()))
                .result(int),
            vec!["a".into(), "b".into()],
        );
        let path = dir.join("schema.json");
        fs::write(&path, serde_json::to_string_pretty(&schema).unwrap()).unwrap();
        path
    }

    fn args(dir: &Path) -> Args {
        Args {
            schema: write_schema(dir),
            config: dir.join("wirebind.toml"),
            dispatcher_out: None,
            contract_out: None,
            log_level: "warn".into(),
        }
    }

    #[test]
    fn test_missing_config_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path());
        assert!(run(&args).unwrap().is_none());

        let config = load_config(&args.config).unwrap();
        assert!(config.build.routes.is_empty());
        assert_eq!(config.build.runtime_path, "::wirebind::server");
        assert_eq!(config.output.contract, PathBuf::from("web/src/contract.ts"));
    }

    #[test]
    fn test_generates_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        fs::write(
            &args.config,
            r#"
            crate_name = "calc"
            contract_name = "CalcContract"

            [routes]
            "calc.add" = ["calc::add"]

            [output]
            dispatcher = "ignored.rs"
            contract = "ignored.ts"
            "#,
        )
        .unwrap();
        args.dispatcher_out = Some(dir.path().join("out/dispatcher.rs"));
        args.contract_out = Some(dir.path().join("out/contract.ts"));

        let (dispatcher, contract) = run(&args).unwrap().unwrap();
        let dispatcher = fs::read_to_string(dispatcher).unwrap();
        let contract = fs::read_to_string(contract).unwrap();
        assert!(dispatcher.contains("let result = crate::add(arg0, arg1);"));
        assert!(contract.contains("\"calc.add\": (a: number, b: number) => Promise<number>;"));
        assert!(contract.contains("export type CalcContract = {"));
    }

    #[test]
    fn test_generation_errors_carry_context() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path());
        fs::write(&args.config, "[routes]\n\"calc.sub\" = [\"calc::sub\"]\n").unwrap();

        let err = run(&args).unwrap_err();
        assert_eq!(err.to_string(), "Generation failed");
        assert!(format!("{err:#}").contains("calc::sub"));
    }
}
