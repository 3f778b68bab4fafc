//! Feature resolution: which styles, decorators, lists and annotations the
//! output may use.
//!
//! [`EnabledFeatures`] is either built directly or resolved from a compiled
//! block-content schema with [`resolve_features`]. Schemas deserialize from
//! their JSON description:
//!
//! ```ignore
//! let schema: ArraySchema = serde_json::from_str(json)?;
//! let features = resolve_features(&schema)?.enabled;
//! ```

use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::ConfigurationError;

// =============================================================================
// EnabledFeatures
// =============================================================================

/// Allow-list the output must conform to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnabledFeatures {
    styles: FxHashSet<String>,
    decorators: FxHashSet<String>,
    lists: FxHashSet<String>,
    annotations: FxHashSet<String>,
    inline_objects: FxHashSet<String>,
}

impl EnabledFeatures {
    /// Start an empty feature set
    pub fn builder() -> EnabledFeaturesBuilder {
        EnabledFeaturesBuilder::default()
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.styles.contains(style)
    }

    pub fn has_decorator(&self, decorator: &str) -> bool {
        self.decorators.contains(decorator)
    }

    pub fn has_list(&self, list: &str) -> bool {
        self.lists.contains(list)
    }

    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.contains(annotation)
    }

    pub fn has_inline_object(&self, type_name: &str) -> bool {
        self.inline_objects.contains(type_name)
    }

    pub fn styles(&self) -> &FxHashSet<String> {
        &self.styles
    }

    pub fn decorators(&self) -> &FxHashSet<String> {
        &self.decorators
    }

    pub fn lists(&self) -> &FxHashSet<String> {
        &self.lists
    }

    pub fn annotations(&self) -> &FxHashSet<String> {
        &self.annotations
    }
}

/// Builder for [`EnabledFeatures`]
#[derive(Debug, Clone, Default)]
pub struct EnabledFeaturesBuilder {
    inner: EnabledFeatures,
}

fn extend<I, S>(set: &mut FxHashSet<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    set.extend(items.into_iter().map(Into::into));
}

impl EnabledFeaturesBuilder {
    pub fn styles<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        extend(&mut self.inner.styles, items);
        self
    }

    pub fn decorators<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        extend(&mut self.inner.decorators, items);
        self
    }

    pub fn lists<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        extend(&mut self.inner.lists, items);
        self
    }

    pub fn annotations<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        extend(&mut self.inner.annotations, items);
        self
    }

    pub fn inline_objects<I: IntoIterator<Item = S>, S: Into<String>>(mut self, items: I) -> Self {
        extend(&mut self.inner.inline_objects, items);
        self
    }

    pub fn build(self) -> EnabledFeatures {
        self.inner
    }
}

// =============================================================================
// Schema description
// =============================================================================

/// Compiled block-content array type: `{name, of: [...]}`
#[derive(Debug, Clone, Deserialize)]
pub struct ArraySchema {
    pub name: String,
    #[serde(default)]
    pub of: Vec<SchemaType>,
}

/// A compiled schema type
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    pub name: String,
    /// Parent type this one was derived from
    #[serde(default, rename = "type")]
    pub base: Option<Box<SchemaType>>,
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    /// Member types, for array types
    #[serde(default)]
    pub of: Vec<SchemaType>,
    #[serde(default)]
    pub options: SchemaOptions,
    /// Decorators, for span types
    #[serde(default)]
    pub decorators: Vec<ListOption>,
    /// Annotation types, for span types
    #[serde(default)]
    pub annotations: Vec<SchemaType>,
}

/// A named field of an object type
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: SchemaType,
}

/// Type options; only the option list matters here
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaOptions {
    #[serde(default)]
    pub list: Option<Vec<ListOption>>,
}

/// Entry of an option list: `{title, value}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOption {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl SchemaType {
    /// Whether this type is `block` or derives from it
    pub fn is_block(&self) -> bool {
        self.name == "block" || self.base.as_deref().is_some_and(SchemaType::is_block)
    }

    fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Everything the resolver learns from a block-content schema.
#[derive(Debug, Clone)]
pub struct BlockContentFeatures {
    pub enabled: EnabledFeatures,
    /// Name of the block member type
    pub block_type: String,
    /// Non-span members of the block's `children`
    pub inline_object_types: Vec<String>,
    /// Members of the array other than the block type
    pub block_object_types: Vec<String>,
}

fn option_values(options: &[ListOption]) -> impl Iterator<Item = &str> {
    options.iter().filter_map(|o| o.value.as_deref())
}

/// Derive the enabled features from a block-content array type.
pub fn resolve_features(schema: &ArraySchema) -> Result<BlockContentFeatures, ConfigurationError> {
    let block_type = schema
        .of
        .iter()
        .find(|t| t.is_block())
        .ok_or(ConfigurationError::MissingBlockType)?;

    let style_field = block_type
        .field("style")
        .ok_or(ConfigurationError::MissingField("style"))?;
    let styles: Vec<&str> = style_field
        .field_type
        .options
        .list
        .as_deref()
        .map(|list| option_values(list).collect())
        .unwrap_or_default();
    if styles.is_empty() {
        return Err(ConfigurationError::EmptyStyles);
    }

    let list_field = block_type
        .field("list")
        .ok_or(ConfigurationError::MissingField("list"))?;
    let lists = list_field
        .field_type
        .options
        .list
        .as_deref()
        .ok_or(ConfigurationError::MissingListOptions)?;

    let children = block_type
        .field("children")
        .ok_or(ConfigurationError::MissingSpanType)?;
    let span_type = children
        .field_type
        .of
        .iter()
        .find(|t| t.name == "span")
        .ok_or(ConfigurationError::MissingSpanType)?;
    let inline_object_types: Vec<String> = children
        .field_type
        .of
        .iter()
        .filter(|t| t.name != "span")
        .map(|t| t.name.clone())
        .collect();

    let enabled = EnabledFeatures::builder()
        .styles(styles)
        .lists(option_values(lists))
        .decorators(option_values(&span_type.decorators))
        .annotations(span_type.annotations.iter().map(|a| a.name.as_str()))
        .inline_objects(inline_object_types.iter().map(String::as_str))
        .build();

    Ok(BlockContentFeatures {
        enabled,
        block_type: block_type.name.clone(),
        inline_object_types,
        block_object_types: schema
            .of
            .iter()
            .filter(|t| t.name != block_type.name)
            .map(|t| t.name.clone())
            .collect(),
    })
}
