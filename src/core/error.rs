//! Errors reported while building, updating and rendering scenes.

// others
use thiserror::Error;
// rs_scene
use crate::core::object::Category;
use crate::core::properties::PropertyType;
use crate::core::variant::Variant;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("property \"{0}\" was specified multiple times")]
    DuplicateAttribute(String),
    #[error("property \"{0}\" has not been specified")]
    MissingAttribute(String),
    #[error("property \"{name}\" has type {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: PropertyType,
        found: PropertyType,
    },
    #[error("missing \"type\" for a {0} declaration")]
    MissingTypeName(Category),
    #[error("{category} plugin \"{name}\" is already registered for variant {variant}")]
    DuplicateRegistration {
        category: Category,
        name: String,
        variant: Variant,
    },
    #[error("unknown {category} plugin \"{name}\" for variant {variant}")]
    UnknownType {
        category: Category,
        name: String,
        variant: Variant,
    },
    #[error("could not infer the category of nested declaration \"{0}\"")]
    UnknownCategory(String),
    #[error("expected a {expected} object, got a {found} object")]
    UnexpectedCategory { expected: Category, found: Category },
    #[error("failed to construct {plugin}: {reason}")]
    ConstructionFailed { plugin: String, reason: String },
    #[error("incomplete scene: {0}")]
    IncompleteScene(String),
    #[error("variant is already set to {current}, cannot switch to {requested}")]
    VariantLocked { current: Variant, requested: Variant },
    #[error("unknown variant \"{0}\"")]
    UnknownVariant(String),
    #[error("parameter map is stale, traverse the scene again")]
    StaleParameterMap,
    #[error("unknown parameter \"{0}\"")]
    UnknownParameter(String),
    #[error("{0} parameter update(s) pending, call update() before rendering")]
    PendingUpdate(usize),
    #[error("variant {0} does not support differentiation")]
    NotDifferentiable(Variant),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl SceneError {
    pub fn construction(plugin: &str, reason: impl Into<String>) -> SceneError {
        SceneError::ConstructionFailed {
            plugin: plugin.to_string(),
            reason: reason.into(),
        }
    }
}
