// qaspec/src/commands/project.rs
//
// Loads the project config and the adapters every import needs.

use anyhow::Context;
use tracing::debug;

use qaspec_core::application::{ImportOptions, Importer, SpecificationSelection};
use qaspec_core::infrastructure::config::{ProjectConfig, load_project_config};
use qaspec_core::infrastructure::{
    BooleanExpressionParser, CapabilityRegistry, DatasetTypeValidator, YamlCatalog,
};

use crate::cli::ImportArgs;

pub struct Project {
    pub config: ProjectConfig,
    pub catalog: YamlCatalog,
    pub registry: CapabilityRegistry,
    pub parser: BooleanExpressionParser,
    pub validator: DatasetTypeValidator,
    options: ImportOptions,
}

impl Project {
    /// `quiet` keeps stdout free for machine-readable output.
    pub fn load(args: &ImportArgs, quiet: bool) -> anyhow::Result<Self> {
        if !quiet {
            println!("⚙️  Loading configuration...");
        }
        let config = load_project_config(&args.project_dir)?;

        let catalog_path = config.catalog_path(&args.project_dir);
        let catalog = YamlCatalog::load(&catalog_path)
            .with_context(|| format!("Cannot load catalog {}", catalog_path.display()))?;

        let signatures_path = config.signatures_path(&args.project_dir);
        let registry = CapabilityRegistry::load(&signatures_path)
            .with_context(|| format!("Cannot load signatures {}", signatures_path.display()))?;

        // CLI flags win over config and environment
        let mut options = ImportOptions::from(&config.import);
        if args.tolerant {
            options.tolerant = true;
        }
        if let Some(model) = &args.default_model {
            options.default_model = Some(model.clone());
        }

        debug!(?options, "Import options");
        if !quiet {
            println!(
                "   Project: {} ({} models, {} implementations)",
                config.name,
                catalog.models().len(),
                registry.len()
            );
            if options.tolerant {
                println!("   Tolerant mode: configurations with unknown datasets are skipped");
            }
        }

        Ok(Self {
            config,
            catalog,
            registry,
            parser: BooleanExpressionParser::new(),
            validator: DatasetTypeValidator,
            options,
        })
    }

    pub fn importer(&self) -> Importer<'_> {
        Importer::new(
            &self.registry,
            &self.catalog,
            &self.parser,
            &self.validator,
            self.options.clone(),
        )
    }
}

pub fn selection(args: &ImportArgs) -> SpecificationSelection {
    if args.specifications.is_empty() {
        SpecificationSelection::All
    } else {
        SpecificationSelection::Named(args.specifications.clone())
    }
}
