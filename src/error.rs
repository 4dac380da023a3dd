use std::fmt;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

pub type SceneResult<T> = Result<T, SceneError>;

/// Kind of symbolic id a command can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefKind {
    Actor,
    Sprite,
    Background,
    Music,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefKind::Actor => "actor",
            RefKind::Sprite => "sprite",
            RefKind::Background => "background",
            RefKind::Music => "music",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SceneError {
    #[error("invalid scene script at `{field}`: {message}")]
    #[diagnostic(code("scene.validation"))]
    Validation { field: String, message: String },
    #[error("unknown {kind} `{id}` referenced at `{field}`")]
    #[diagnostic(
        code("scene.reference"),
        help("declare the {kind} before referencing it from a command")
    )]
    Reference {
        kind: RefKind,
        id: String,
        field: String,
    },
    #[error("malformed scene json: {message}")]
    #[diagnostic(code("scene.syntax"))]
    Syntax {
        message: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },
    #[error("resource limit exceeded: {0}")]
    #[diagnostic(code("scene.resource_limit"))]
    ResourceLimit(String),
    #[error("unsupported scene type `{0}`")]
    #[diagnostic(
        code("scene.unsupported"),
        help("only story scenes can be played back")
    )]
    UnsupportedScene(String),
    #[error("could not resolve asset `{path}`: {message}")]
    #[diagnostic(code("scene.resource"))]
    Resource { path: String, message: String },
    #[error("invalid playback config: {0}")]
    #[diagnostic(code("scene.config"))]
    Config(String),
    #[error("io error: {0}")]
    #[diagnostic(code("scene.io"))]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SceneError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn reference(kind: RefKind, id: impl Into<String>, field: impl Into<String>) -> Self {
        SceneError::Reference {
            kind,
            id: id.into(),
            field: field.into(),
        }
    }

    /// Returns the offending field path for load errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            SceneError::Validation { field, .. } | SceneError::Reference { field, .. } => {
                Some(field.as_str())
            }
            _ => None,
        }
    }
}
