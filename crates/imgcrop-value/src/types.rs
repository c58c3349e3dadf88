//! Core value types
//!
//! [`MediaReference`] is owned by the media catalog; this crate only keeps a
//! cached copy inside [`StructuredValue`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Media identifier as issued by the catalog
///
/// Catalogs emit either numeric or string ids. The original form is kept so
/// that re-encoding a decoded value writes the id back unchanged. Equality is
/// on the representation: `Number(42)` and `Text("42")` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaId {
    /// Numeric id
    Number(u64),
    /// String id
    Text(String),
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for MediaId {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for MediaId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Cached copy of a catalog media record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReference {
    /// Catalog identifier
    pub id: MediaId,

    /// Display title
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,

    /// Primary image URL
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub url: String,

    /// URL of the full-size admin rendition, preferred by the crop editor
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub admin_url: Option<String>,

    /// Thumbnail URLs keyed by crop variant
    #[serde(
        default,
        deserialize_with = "lenient_thumbnails",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub thumbnails: BTreeMap<String, String>,

    /// Catalog fields this crate does not interpret, kept for re-encoding
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaReference {
    /// Create reference with id and title
    #[must_use]
    pub fn new(id: impl Into<MediaId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            admin_url: None,
            thumbnails: BTreeMap::new(),
            extra: Map::new(),
        }
    }

    /// With primary URL
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// With admin URL
    #[inline]
    #[must_use]
    pub fn with_admin_url(mut self, url: impl Into<String>) -> Self {
        self.admin_url = Some(url.into());
        self
    }

    /// With thumbnail for a crop variant
    #[inline]
    #[must_use]
    pub fn with_thumbnail(mut self, crop_key: impl Into<String>, url: impl Into<String>) -> Self {
        self.thumbnails.insert(crop_key.into(), url.into());
        self
    }

    /// Thumbnail URL for a crop variant, if the catalog rendered one
    #[inline]
    #[must_use]
    pub fn thumbnail(&self, crop_key: &str) -> Option<&str> {
        self.thumbnails.get(crop_key).map(String::as_str)
    }
}

/// The field's persisted / edited payload
///
/// `StructuredValue::default()` is the empty value `{}`. When `media` is
/// `None` the other two keys carry no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredValue {
    /// Selected media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaReference>,

    /// Crop variant shown as preview
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_crop_key: Option<String>,

    /// Cache-busting token set after a successful resync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_crop_version: Option<String>,
}

impl StructuredValue {
    /// Create value holding `media`
    #[inline]
    #[must_use]
    pub fn with_media(media: MediaReference) -> Self {
        Self {
            media: Some(media),
            ..Self::default()
        }
    }

    /// Copy of this value with `media` replaced
    #[inline]
    #[must_use]
    pub fn replace_media(&self, media: Option<MediaReference>) -> Self {
        Self {
            media,
            ..self.clone()
        }
    }

    /// Id of the selected media
    #[inline]
    #[must_use]
    pub fn media_id(&self) -> Option<&MediaId> {
        self.media.as_ref().map(|m| &m.id)
    }

    /// True when no key is set
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.media.is_none() && self.preview_crop_key.is_none() && self.last_crop_version.is_none()
    }
}

/// Single- or multi-valued property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    /// One JSON string
    #[default]
    Single,
    /// One-element array of JSON strings
    Multiple,
}

impl Multiplicity {
    /// Host's `isMultiple` flag
    #[inline]
    #[must_use]
    pub fn is_multiple(self) -> bool {
        matches!(self, Self::Multiple)
    }
}

impl From<bool> for Multiplicity {
    fn from(is_multiple: bool) -> Self {
        if is_multiple {
            Self::Multiple
        } else {
            Self::Single
        }
    }
}

/// `null` and other non-strings read as an empty string
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// Non-string values read as absent.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Anything but an object of strings reads as no thumbnails.
/// Serializers that cannot tell an empty map from an empty list emit `[]`.
fn lenient_thumbnails<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let Value::Object(map) = raw else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, url)| match url {
            Value::String(url) => Some((key, url)),
            _ => None,
        })
        .collect())
}
