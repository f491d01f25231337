// qaspec-core/src/application/fixtures.rs
//
// Shared test setup: the Roads project used by the importer and exporter tests.

use crate::application::import::{ImportOptions, Importer};
use crate::infrastructure::{
    BooleanExpressionParser, CapabilityRegistry, DatasetTypeValidator, YamlCatalog,
};

pub const CATALOG: &str = r#"
models:
  - name: Model1
    datasets:
      - { name: Roads, type: vector, geometry: polyline }
      - { name: Buildings, type: vector, geometry: polygon }
  - name: DefaultModel
    datasets:
      - { name: Roads, type: vector, geometry: polyline }
      - { name: Rivers, type: vector, geometry: polyline }
      - { name: Elevation, type: raster }
"#;

pub const SIGNATURES: &str = r#"
implementations:
  - type_name: QaMinLength
    kind: test
    parameters:
      - { name: featureClass, type: dataset, constructor: true, dataset_types: [vector] }
      - { name: limit, type: double, constructor: true }
      - { name: is3D, type: boolean }
  - type_name: QaConstraint
    kind: test
    parameters:
      - { name: table, type: dataset, constructor: true }
      - { name: reference, type: dataset }
      - { name: constraint, type: string, constructor: true }
  - type_name: TrOnlyContainedFeatures
    kind: transformer
    parameters:
      - { name: featureClass, type: dataset, constructor: true }
      - { name: containing, type: dataset }
  - type_name: IfWithin
    kind: issue_filter
    parameters:
      - { name: featureClass, type: dataset, constructor: true }
      - { name: distance, type: double }
"#;

pub const DICTIONARY: &str = r#"
namespace: "urn:qaspec:data-dictionary:3.0"
workspaces:
  - { id: WS1, model_name: Model1 }
test_descriptors:
  - { name: MinLength, implementation: QaMinLength, description: Minimum line length }
  - { name: Constraint, implementation: QaConstraint }
transformer_descriptors:
  - { name: OnlyContained, implementation: TrOnlyContainedFeatures }
issue_filter_descriptors:
  - { name: Within, implementation: IfWithin }
categories:
  - name: Topology
    list_order: 1
    sub_categories:
      - name: Lines
        quality_conditions:
          - name: C1
            descriptor: MinLength
            uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a01
            version_uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a02
            issue_filter_expression: F1
            parameters:
              - { type: dataset, parameter: featureClass, dataset: Roads, workspace_id: WS1 }
              - { type: scalar, parameter: limit, value: "10.5" }
              - { type: scalar, parameter: is3D, value: "false" }
quality_specifications:
  - name: Roads QA
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a10
    list_order: 2
    elements:
      - { condition: C1 }
      - { condition: C2, allow_errors: true }
      - { condition: C3 }
  - name: Hydro QA
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a11
    list_order: 1
    elements:
      - { condition: C3 }
quality_conditions:
  - name: C2
    descriptor: MinLength
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a03
    version_uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a04
    parameters:
      - { type: dataset, parameter: featureClass, transformer: T1 }
      - { type: scalar, parameter: limit, value: "2" }
  - name: C3
    descriptor: MinLength
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a05
    version_uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a06
    parameters:
      - { type: dataset, parameter: featureClass, transformer: T1 }
      - { type: scalar, parameter: limit, value: "5" }
transformers:
  - name: T1
    descriptor: OnlyContained
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a07
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Rivers }
      - { type: dataset, parameter: containing, dataset: Buildings, workspace_id: WS1, where_clause: "HEIGHT > 10" }
issue_filters:
  - name: F1
    descriptor: Within
    uuid: 0c7a2d34-9a55-4f4a-8a5e-3f2f2c6b0a08
    parameters:
      - { type: dataset, parameter: featureClass, dataset: Buildings, workspace_id: WS1 }
      - { type: scalar, parameter: distance, value: "1.5" }
"#;

pub struct TestPorts {
    pub registry: CapabilityRegistry,
    pub catalog: YamlCatalog,
    pub parser: BooleanExpressionParser,
    pub validator: DatasetTypeValidator,
}

impl TestPorts {
    pub fn new() -> Self {
        Self {
            registry: CapabilityRegistry::from_yaml(SIGNATURES)
                .unwrap_or_else(|e| panic!("signatures fixture: {}", e)),
            catalog: YamlCatalog::from_yaml(CATALOG)
                .unwrap_or_else(|e| panic!("catalog fixture: {}", e)),
            parser: BooleanExpressionParser::new(),
            validator: DatasetTypeValidator,
        }
    }

    pub fn importer(&self, options: ImportOptions) -> Importer<'_> {
        Importer::new(
            &self.registry,
            &self.catalog,
            &self.parser,
            &self.validator,
            options,
        )
    }

    /// Default model set so `Rivers` resolves without a workspace id.
    pub fn default_importer(&self) -> Importer<'_> {
        self.importer(ImportOptions {
            tolerant: false,
            default_model: Some("DefaultModel".to_string()),
        })
    }
}
