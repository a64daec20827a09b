//! Generate the dispatcher and contract for demo-api from `wirebind.toml`

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use wirebind_codegen::{BuildConfig, Builder};

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=wirebind.toml");
    println!("cargo:rerun-if-changed=../demo-api/src");

    let config: BuildConfig =
        toml::from_str(include_str!("wirebind.toml")).context("Failed to parse wirebind.toml")?;
    let artifacts = Builder::from_config(demo_api::schema(), config)
        .build()
        .context("Failed to generate the demo-api dispatcher")?;

    let out_dir = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR is not set")?);
    artifacts.write(out_dir.join("dispatcher.rs"), out_dir.join("contract.ts"))?;
    Ok(())
}
