//! Target framework, generation mode and output file types.

use std::fmt;
use std::str::FromStr;

use crate::errors::EmitError;

/// A target framework for code emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Framework {
    SpringBoot,
    Django,
    Flask,
    Dotnet,
    Express,
}

impl Framework {
    pub const ALL: [Framework; 5] = [
        Framework::SpringBoot,
        Framework::Django,
        Framework::Flask,
        Framework::Dotnet,
        Framework::Express,
    ];

    /// Wire tag used by the request contract.
    pub fn tag(&self) -> &'static str {
        match self {
            Framework::SpringBoot => "SPRING_BOOT",
            Framework::Django => "DJANGO",
            Framework::Flask => "FLASK",
            Framework::Dotnet => "DOTNET",
            Framework::Express => "EXPRESS",
        }
    }

    /// Source language of the emitted files.
    pub fn language(&self) -> Language {
        match self {
            Framework::SpringBoot => Language::Java,
            Framework::Django | Framework::Flask => Language::Python,
            Framework::Dotnet => Language::CSharp,
            Framework::Express => Language::JavaScript,
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Framework {
    type Err = EmitError;

    /// Accepts the wire tags plus the usual spelling variants
    /// (`spring-boot`, `springboot`, `.net`, `express.js`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' ' | '.'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "springboot" | "spring" => Ok(Framework::SpringBoot),
            "django" => Ok(Framework::Django),
            "flask" => Ok(Framework::Flask),
            "dotnet" | "net" | "aspnet" | "aspnetcore" | "csharp" => Ok(Framework::Dotnet),
            "express" | "expressjs" | "node" | "nodejs" => Ok(Framework::Express),
            _ => Err(EmitError::UnsupportedFramework {
                tag: s.to_string(),
            }),
        }
    }
}

/// Source language of a generated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Language {
    Java,
    Python,
    CSharp,
    JavaScript,
    Xml,
    Yaml,
    Json,
    Toml,
    Text,
}

impl Language {
    /// Guess the language of a bootstrap file from its extension.
    pub fn from_path(path: &str) -> Self {
        let ext = path.rsplit('.').next().unwrap_or_default();
        match ext {
            "java" => Language::Java,
            "py" => Language::Python,
            "cs" => Language::CSharp,
            "js" => Language::JavaScript,
            "xml" | "csproj" => Language::Xml,
            "yml" | "yaml" => Language::Yaml,
            "json" => Language::Json,
            "toml" => Language::Toml,
            _ => Language::Text,
        }
    }
}

/// What the packager should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum GenerationType {
    /// Raw file list for client-side writing.
    #[default]
    FilesOnly,
    /// Emitted files plus framework bootstrap, zipped.
    CompleteProject,
}

/// Type of the synthesized surrogate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum KeyStrategy {
    #[default]
    Integer,
    Uuid,
}

/// An emitted source file. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GeneratedFile {
    /// Path relative to the project root, `/`-separated.
    pub relative_path: String,
    pub content: String,
    pub language: Language,
}

impl GeneratedFile {
    pub fn new(relative_path: impl Into<String>, content: impl Into<String>, language: Language) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
            language,
        }
    }
}
