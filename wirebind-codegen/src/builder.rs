//! Builder, build configuration and artifacts
//!
//! ```
//! use wirebind_codegen::Builder;
//! use wirebind_core::{FunctionSig, Param, Primitive, Schema, TypeNode};
//!
//! let int = TypeNode::primitive(Primitive::I32);
//! let mut schema = Schema::new();
//! schema.insert_function(
//!     FunctionSig::new("app::math::add")
//!         .param(Param::owned(int.clone()))
//!         .param(Param::owned(int.clone()))
//!         .result(int),
//!     vec!["a".into(), "b".into()],
//! );
//!
//! let artifacts = Builder::new(schema)
//!     .route("math.add", ["app::math::add"])
//!     .build()
//!     .unwrap();
//! assert!(artifacts.contract.contains("\"math.add\": (a: number, b: number) => Promise<number>;"));
//! assert!(artifacts.dispatcher.contains("pub async fn handle_math_add"));
//! ```

use crate::classifier::Registry;
use crate::contract::ContractEmitter;
use crate::dispatcher::DispatcherGenerator;
use crate::error::{Error, Result};
use crate::procedure::plan_all;
use crate::type_mapper::TypeMapper;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use wirebind_core::Schema;

pub const DEFAULT_RUNTIME_PATH: &str = "::wirebind::server";
pub const DEFAULT_CONTRACT_NAME: &str = "WirebindContract";

fn default_runtime_path() -> String {
    DEFAULT_RUNTIME_PATH.to_string()
}

fn default_contract_name() -> String {
    DEFAULT_CONTRACT_NAME.to_string()
}

/// Everything registered with a build, in serializable form
///
/// ```toml
/// crate_name = "demo_api"
/// context_extractors = ["demo_api::auth::session"]
/// dependencies = ["demo_api::store::UserStore"]
///
/// [routes]
/// "math.add" = ["demo_api::math::add"]
///
/// [custom_types]
/// "demo_api::model::Timestamp" = "string"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Method name to route entries: middleware first, procedure last
    #[serde(default)]
    pub routes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub context_extractors: Vec<String>,
    /// Dependency type identities, in `Handler::new` parameter order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Declaration identity to a literal contract type
    #[serde(default)]
    pub custom_types: BTreeMap<String, String>,
    /// Paths under this crate are emitted as `crate::` paths
    #[serde(default)]
    pub crate_name: Option<String>,
    #[serde(default = "default_runtime_path")]
    pub runtime_path: String,
    #[serde(default = "default_contract_name")]
    pub contract_name: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            routes: BTreeMap::new(),
            context_extractors: Vec::new(),
            dependencies: Vec::new(),
            custom_types: BTreeMap::new(),
            crate_name: None,
            runtime_path: default_runtime_path(),
            contract_name: default_contract_name(),
        }
    }
}

/// The two generated texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Rust source of the dispatcher
    pub dispatcher: String,
    /// TypeScript contract
    pub contract: String,
}

impl Artifacts {
    /// Write both artifacts, creating parent directories as needed
    pub fn write(&self, dispatcher_path: impl AsRef<Path>, contract_path: impl AsRef<Path>) -> Result<()> {
        write_file(dispatcher_path.as_ref(), &self.dispatcher)?;
        write_file(contract_path.as_ref(), &self.contract)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let wrap = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, contents).map_err(wrap)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote artifact");
    Ok(())
}

/// Collects registrations and produces [`Artifacts`]
///
/// Registration never fails; every check runs in [`build`](Self::build),
/// which either returns both artifacts or the first error.
#[derive(Debug, Clone)]
pub struct Builder {
    schema: Schema,
    config: BuildConfig,
    duplicate_routes: Vec<String>,
}

impl Builder {
    pub fn new(schema: Schema) -> Self {
        Self::from_config(schema, BuildConfig::default())
    }

    pub fn from_config(schema: Schema, config: BuildConfig) -> Self {
        Self {
            schema,
            config,
            duplicate_routes: Vec::new(),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Bind `method` to its route entries
    pub fn route<I, S>(mut self, method: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let method = method.into();
        let entries = entries.into_iter().map(Into::into).collect();
        if self.config.routes.insert(method.clone(), entries).is_some() {
            self.duplicate_routes.push(method);
        }
        self
    }

    pub fn add_context_extractor(mut self, path: impl Into<String>) -> Self {
        self.config.context_extractors.push(path.into());
        self
    }

    pub fn add_dependency_type(mut self, id: impl Into<String>) -> Self {
        self.config.dependencies.push(id.into());
        self
    }

    /// Map the declaration `id` to the literal contract type `wire`
    pub fn add_custom_type(mut self, id: impl Into<String>, wire: impl Into<String>) -> Self {
        self.config.custom_types.insert(id.into(), wire.into());
        self
    }

    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.config.crate_name = Some(name.into());
        self
    }

    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.config.runtime_path = path.into();
        self
    }

    pub fn contract_name(mut self, name: impl Into<String>) -> Self {
        self.config.contract_name = name.into();
        self
    }

    /// Validate every registration and render both artifacts
    pub fn build(&self) -> Result<Artifacts> {
        let config = &self.config;
        if let Some(method) = self.duplicate_routes.first() {
            return Err(Error::DuplicateRoute(method.clone()));
        }
        tracing::info!(
            routes = config.routes.len(),
            extractors = config.context_extractors.len(),
            dependencies = config.dependencies.len(),
            "Building dispatcher and contract"
        );

        let mut registry = Registry::new();
        for path in &config.context_extractors {
            registry.add_extractor(&self.schema, path)?;
        }
        for id in &config.dependencies {
            registry.add_dependency(&self.schema, id)?;
        }

        let mapper = TypeMapper::new(&self.schema, &config.custom_types);
        let procedures = plan_all(&config.routes, &registry, &mapper)?;

        let mut contract = ContractEmitter::new(TypeMapper::new(&self.schema, &config.custom_types));
        for procedure in &procedures {
            contract.add(procedure)?;
        }
        let contract_text = contract.render(&config.contract_name)?;

        let dispatcher = DispatcherGenerator::new(&registry, &config.runtime_path, config.crate_name.as_deref())
            .render(&procedures)?;

        tracing::info!(
            methods = procedures.len(),
            types = contract.definitions().len(),
            "Build finished"
        );
        Ok(Artifacts {
            dispatcher,
            contract: contract_text,
        })
    }
}
