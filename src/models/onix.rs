//! Typed view of an openBD detail record.
//!
//! openBD returns ONIX-like JSON where nearly everything is optional and some
//! fields are a single object in one record and an array in the next. This
//! module decodes only the parts the finder reads, once, at the boundary:
//!
//! - every field is optional and unknown fields are ignored
//! - one-or-many fields always decode into a `Vec`
//! - scalar leaves accept strings or numbers and decode into `String`

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, Result};

/// One detail record as returned by the openBD `get` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBibRecord {
    #[serde(default)]
    pub onix: Option<Onix>,

    #[serde(default)]
    pub summary: Option<Summary>,

    #[serde(default)]
    pub hanmoto: Option<Hanmoto>,
}

impl RawBibRecord {
    /// Decode a JSON value into a record.
    ///
    /// `isbn_hint` only labels the error when the value has an unexpected shape.
    pub fn decode(value: Value, isbn_hint: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| AppError::record(isbn_hint, e))
    }

    pub fn descriptive_detail(&self) -> Option<&DescriptiveDetail> {
        self.onix.as_ref()?.descriptive_detail.as_ref()
    }

    /// Raw `YYYYMM...` publication date from the summary block.
    pub fn pubdate(&self) -> Option<&str> {
        self.summary.as_ref()?.pubdate.as_deref()
    }

    /// Catalog registration date (`YYYY-MM-DD`).
    pub fn registered_on(&self) -> Option<&str> {
        self.hanmoto.as_ref()?.datekoukai.as_deref()
    }

    /// Last-modified timestamp (`YYYY-MM-DD HH:MM:SS`).
    pub fn modified_at(&self) -> Option<&str> {
        self.hanmoto.as_ref()?.datemodified.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Onix {
    #[serde(default)]
    pub product_identifier: Option<ProductIdentifier>,

    #[serde(default)]
    pub descriptive_detail: Option<DescriptiveDetail>,

    #[serde(default)]
    pub collateral_detail: Option<CollateralDetail>,

    #[serde(default)]
    pub publishing_detail: Option<PublishingDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductIdentifier {
    #[serde(rename = "IDValue", default, deserialize_with = "lenient_string")]
    pub id_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescriptiveDetail {
    /// Series/collection the product belongs to
    #[serde(default)]
    pub collection: Option<Collection>,

    /// Title of the product itself
    #[serde(default)]
    pub title_detail: Option<TitleDetail>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub contributor: Vec<Contributor>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub extent: Vec<Extent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Collection {
    #[serde(default)]
    pub title_detail: Option<TitleDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitleDetail {
    #[serde(default, deserialize_with = "one_or_many")]
    pub title_element: Vec<TitleElement>,
}

impl TitleDetail {
    /// First non-empty title text among the title elements.
    pub fn first_text(&self) -> Option<&str> {
        self.title_element
            .iter()
            .filter_map(|e| e.title_text.as_ref()?.content.as_deref())
            .find(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitleElement {
    #[serde(default)]
    pub title_text: Option<TextNode>,
}

/// `{ "content": "...", "collationkey": "..." }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextNode {
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Contributor {
    #[serde(default, deserialize_with = "one_or_many")]
    pub contributor_role: Vec<String>,

    #[serde(default)]
    pub person_name: Option<TextNode>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub biographical_note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Extent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub extent_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub extent_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollateralDetail {
    #[serde(default, deserialize_with = "one_or_many")]
    pub text_content: Vec<TextContent>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub supporting_resource: Vec<SupportingResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextContent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupportingResource {
    #[serde(default, deserialize_with = "lenient_string")]
    pub resource_content_type: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub resource_version: Vec<ResourceVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceVersion {
    #[serde(default, deserialize_with = "lenient_string")]
    pub resource_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishingDetail {
    #[serde(default)]
    pub imprint: Option<Imprint>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub publisher: Vec<Publisher>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Imprint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub imprint_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Publisher {
    #[serde(default, deserialize_with = "lenient_string")]
    pub publisher_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub isbn: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub pubdate: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hanmoto {
    #[serde(default, deserialize_with = "lenient_string")]
    pub datekoukai: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub datemodified: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Decode either `T` or `[T]` (or null) into a `Vec<T>`.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

/// Decode a string or number leaf; anything else becomes `None`.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
