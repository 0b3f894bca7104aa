//! Job templates: the operator-declared recipes that events are expanded into

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TemplateError;

/// Longest template name accepted.
///
/// Leaves room for `-{hash}-{unix seconds}` within the 63 character Job name limit.
pub const MAX_TEMPLATE_NAME_LEN: usize = 43;

/// A declared recipe for one batch Job
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplate {
    /// Prefix of every generated Job name
    #[serde(default)]
    pub name: String,

    /// Container image
    #[serde(default)]
    pub image: String,

    /// Container entrypoint override
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub command: Option<Vec<String>>,

    /// Arguments passed to the entrypoint
    #[serde(
        default,
        deserialize_with = "string_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub args: Option<Vec<String>>,

    /// ConfigMap whose keys are injected as environment variables
    #[serde(
        default,
        rename = "configmap",
        alias = "configSource",
        skip_serializing_if = "Option::is_none"
    )]
    pub config_source: Option<String>,

    /// Secret whose keys are injected as environment variables
    #[serde(
        default,
        rename = "secret",
        alias = "secretSource",
        skip_serializing_if = "Option::is_none"
    )]
    pub secret_source: Option<String>,
}

impl JobTemplate {
    /// Create a template with just a name and image
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    /// Check the template against the naming and content rules.
    ///
    /// Rules are checked in order and the first violation is returned.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.name.is_empty() {
            return Err(TemplateError::NameRequired);
        }
        if self.name.len() > MAX_TEMPLATE_NAME_LEN {
            return Err(TemplateError::NameTooLong {
                max: MAX_TEMPLATE_NAME_LEN,
            });
        }
        if !is_dns1123_subdomain(&self.name) {
            return Err(TemplateError::InvalidName {
                name: self.name.clone(),
            });
        }
        if self.image.is_empty() {
            return Err(TemplateError::ImageRequired);
        }
        Ok(())
    }
}

/// Whether `s` is a DNS-1123 subdomain: dot-separated labels of lowercase
/// alphanumerics and '-', each starting and ending with an alphanumeric.
pub fn is_dns1123_subdomain(s: &str) -> bool {
    !s.is_empty() && s.split('.').all(is_dns1123_label)
}

fn is_dns1123_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();

    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            alnum(first) && alnum(last) && bytes.iter().all(|b| alnum(b) || *b == b'-')
        }
        _ => false,
    }
}

/// Templates that have all passed validation.
///
/// The only way to build one is through validation, so a generator holding a
/// `TemplateSet` never sees an invalid template.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateSet(Vec<JobTemplate>);

impl TemplateSet {
    /// Validate every template; one failure rejects the whole set.
    ///
    /// On failure returns the index of the offending template with the error.
    pub fn new(templates: Vec<JobTemplate>) -> Result<Self, (usize, TemplateError)> {
        for (index, template) in templates.iter().enumerate() {
            template.validate().map_err(|e| (index, e))?;
        }
        Ok(Self(templates))
    }

    /// Append another validated set, keeping declaration order
    pub fn extend(&mut self, other: TemplateSet) {
        self.0.extend(other.0);
    }

    /// Templates in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, JobTemplate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a JobTemplate;
    type IntoIter = std::slice::Iter<'a, JobTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Accept `command: [a, b]` or the shorthand `command: "a b"` (split on whitespace)
fn string_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        match Option::<StringOrList>::deserialize(deserializer)? {
            None => None,
            Some(StringOrList::One(s)) => Some(s.split_whitespace().map(str::to_string).collect()),
            Some(StringOrList::Many(v)) => Some(v),
        },
    )
}
