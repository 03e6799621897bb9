//! UML class diagram to CRUD application generator.
//!
//! The pipeline runs parser, model builder, emitter and packager in order:
//!
//! ```text
//! umlContent -> ParsedDiagram -> DomainModel -> [GeneratedFile] -> Artifact
//! ```
//!
//! [`Generator`] wraps it behind the request/response contract used by
//! the HTTP and CLI front ends. Every request is independent; the model is
//! built fresh and dropped once the response is assembled.
//!
//! # Example
//!
//! ```
//! use crudgen::{GenerationRequest, Generator};
//!
//! let generator = Generator::default();
//! let response = generator.generate(&GenerationRequest {
//!     uml_content: "class Product { id: Integer PK; name: String }".into(),
//!     framework: Some("DJANGO".into()),
//!     ..Default::default()
//! });
//! assert!(response.success);
//! assert_eq!(response.class_count, 1);
//! ```

pub mod config;
pub mod observability;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crudgen_builder::BuildOptions;
use crudgen_core::model::DomainModel;
use crudgen_export::{Artifact, PackageOptions};

pub use config::GeneratorConfig;
pub use crudgen_core::{CrudgenError, Framework, GeneratedFile, GenerationType, Language};

/// A generation request as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub uml_content: String,
    #[serde(default)]
    pub package_name: Option<String>,
    /// Client-side destination; ignored here.
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub generation_type: Option<GenerationType>,
    /// Raw framework tag, parsed at generation time.
    #[serde(default)]
    pub framework: Option<String>,
}

/// Structured error carried by failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&CrudgenError> for ErrorPayload {
    fn from(err: &CrudgenError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            field: err.field().map(str::to_string),
        }
    }
}

/// Result of one generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    pub message: String,
    pub class_count: usize,
    /// File list for `FILES_ONLY` requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<GeneratedFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    /// ZIP bytes for `COMPLETE_PROJECT` requests, streamed separately.
    #[serde(skip)]
    pub archive: Option<Vec<u8>>,
}

impl GenerationResponse {
    fn from_artifact(artifact: Artifact) -> Self {
        let files = match artifact.archive {
            Some(_) => None,
            None => Some(artifact.files),
        };
        Self {
            success: true,
            message: artifact.message,
            class_count: artifact.class_count,
            files,
            error: None,
            archive: artifact.archive,
        }
    }

    fn failure(err: &CrudgenError) -> Self {
        Self {
            success: false,
            message: format!("Generation failed: {}", err),
            class_count: 0,
            files: None,
            error: Some(err.into()),
            archive: None,
        }
    }
}

/// Result of a validation dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
}

/// Runs the generation pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate source for the request's framework.
    ///
    /// Never fails: errors come back as `success = false` with a
    /// structured payload and no files.
    #[tracing::instrument(skip_all, fields(framework = request.framework.as_deref().unwrap_or_default()))]
    pub fn generate(&self, request: &GenerationRequest) -> GenerationResponse {
        respond(self.run(request))
    }

    /// Generate the same diagram for several frameworks in parallel.
    ///
    /// The model is built once and shared by every emitter. Responses keep
    /// the order of `frameworks`.
    #[tracing::instrument(skip_all, fields(frameworks = frameworks.len()))]
    pub fn generate_many(
        &self,
        request: &GenerationRequest,
        frameworks: &[Framework],
    ) -> Vec<(Framework, GenerationResponse)> {
        let model = match self.build_model(&request.uml_content) {
            Ok(model) => model,
            Err(err) => {
                warn!(code = err.code(), error = %err, "rejected diagram");
                return frameworks
                    .iter()
                    .map(|&framework| (framework, GenerationResponse::failure(&err)))
                    .collect();
            }
        };

        frameworks
            .par_iter()
            .map(|&framework| {
                let result = self.emit_and_package(&model, request, framework);
                (framework, respond(result))
            })
            .collect()
    }

    /// Parse and build the diagram without emitting anything.
    #[tracing::instrument(skip_all)]
    pub fn validate(&self, uml_content: &str) -> ValidationResponse {
        match self.build_model(uml_content) {
            Ok(model) => ValidationResponse {
                valid: true,
                class_count: Some(model.class_count()),
                error: None,
            },
            Err(err) => {
                info!(code = err.code(), "diagram failed validation");
                ValidationResponse {
                    valid: false,
                    class_count: None,
                    error: Some((&err).into()),
                }
            }
        }
    }

    fn run(&self, request: &GenerationRequest) -> Result<Artifact, CrudgenError> {
        let framework = self.framework(request)?;
        let model = self.build_model(&request.uml_content)?;
        self.emit_and_package(&model, request, framework)
    }

    fn framework(&self, request: &GenerationRequest) -> Result<Framework, CrudgenError> {
        match request.framework.as_deref() {
            Some(tag) => Ok(tag.parse::<Framework>()?),
            None => Ok(self.config.defaults.framework),
        }
    }

    fn build_model(&self, uml_content: &str) -> Result<DomainModel, CrudgenError> {
        let parsed = crudgen_parser::parse(uml_content)?;
        let options = BuildOptions {
            key_strategy: self.config.model.key_strategy,
        };
        Ok(crudgen_builder::build_with(&parsed, &options)?)
    }

    fn emit_and_package(
        &self,
        model: &DomainModel,
        request: &GenerationRequest,
        framework: Framework,
    ) -> Result<Artifact, CrudgenError> {
        let package_name = request
            .package_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.config.defaults.package_name);
        let mode = request
            .generation_type
            .unwrap_or(self.config.defaults.generation_type);

        let files = crudgen_codegen::emit(model, package_name, framework)?;
        let options = PackageOptions {
            package_name: package_name.to_string(),
            framework,
            class_count: model.class_count(),
            archive: self.config.archive.clone(),
        };
        Ok(crudgen_export::package(files, mode, &options)?)
    }
}

fn respond(result: Result<Artifact, CrudgenError>) -> GenerationResponse {
    match result {
        Ok(artifact) => GenerationResponse::from_artifact(artifact),
        Err(err) => {
            warn!(code = err.code(), error = %err, "generation failed");
            GenerationResponse::failure(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagram(uml: &str) -> GenerationRequest {
        GenerationRequest {
            uml_content: uml.to_string(),
            ..Default::default()
        }
    }

    fn request(uml: &str, framework: &str) -> GenerationRequest {
        GenerationRequest {
            framework: Some(framework.to_string()),
            ..diagram(uml)
        }
    }

    #[test]
    fn test_request_from_json() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"umlContent": "class A", "packageName": "com.acme", "generationType": "COMPLETE_PROJECT", "framework": "FLASK"}"#,
        )
        .unwrap();
        assert_eq!(request.package_name.as_deref(), Some("com.acme"));
        assert_eq!(request.generation_type, Some(GenerationType::CompleteProject));
        assert_eq!(request.framework.as_deref(), Some("FLASK"));
        assert_eq!(request.output_path, None);
    }

    #[test]
    fn test_unknown_framework_is_a_response() {
        let response = Generator::default().generate(&request("class A", "RAILS"));
        assert!(!response.success);
        let error = response.error.unwrap();
        assert_eq!(error.code, "UNSUPPORTED_FRAMEWORK");
        assert!(response.files.is_none());
    }

    #[test]
    fn test_default_framework_and_package() {
        let response = Generator::default().generate(&diagram("class Product { name: String }"));
        assert!(response.success);
        let files = response.files.unwrap();
        assert!(files
            .iter()
            .any(|f| f.relative_path == "src/main/java/com/example/entity/Product.java"));
    }

    #[test]
    fn test_blank_package_uses_default() {
        let mut req = request("class Product", "EXPRESS");
        req.package_name = Some("  ".into());
        assert!(Generator::default().generate(&req).success);
    }

    #[test]
    fn test_invalid_package_name() {
        let mut req = request("class Product", "DOTNET");
        req.package_name = Some("com.1shop".into());
        let response = Generator::default().generate(&req);
        assert_eq!(response.error.unwrap().code, "INVALID_PACKAGE_NAME");
    }

    #[test]
    fn test_response_json_shape() {
        let response = Generator::default().generate(&request("class Product { name: String }", "FLASK"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["classCount"], 1);
        assert!(json.get("error").is_none());
        assert!(json.get("archive").is_none());
        assert_eq!(json["files"][0]["relativePath"], "app/models/product.py");
        assert_eq!(json["files"][0]["language"], "python");
    }

    #[test]
    fn test_complete_project_returns_archive() {
        let mut req = request("class Product { name: String }", "DJANGO");
        req.generation_type = Some(GenerationType::CompleteProject);
        let response = Generator::default().generate(&req);
        assert!(response.success);
        assert!(response.files.is_none());
        assert!(response.archive.is_some());
    }

    #[test]
    fn test_validate() {
        let generator = Generator::default();
        let ok = generator.validate("class A\nclass B\nA --> B");
        assert!(ok.valid);
        assert_eq!(ok.class_count, Some(2));

        let bad = generator.validate("class A {\n  name: String\n");
        assert!(!bad.valid);
        assert_eq!(bad.error.unwrap().code, "PARSE_ERROR");
    }

    #[test]
    fn test_generate_many_keeps_order() {
        let responses = Generator::default().generate_many(&diagram("class Product { name: String }"), &Framework::ALL);
        let frameworks: Vec<_> = responses.iter().map(|(f, _)| *f).collect();
        assert_eq!(frameworks, Framework::ALL);
        assert!(responses.iter().all(|(_, r)| r.success && r.class_count == 1));
    }

    #[test]
    fn test_generate_many_shares_model_errors() {
        let responses = Generator::default().generate_many(&diagram(""), &[Framework::Django, Framework::Express]);
        assert_eq!(responses.len(), 2);
        for (_, response) in responses {
            assert_eq!(response.error.unwrap().code, "EMPTY_DIAGRAM");
        }
    }
}
