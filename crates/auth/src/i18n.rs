//! Localized string lookup
//!
//! Strings are templates with `{name}` placeholders, grouped per locale. A
//! lookup falls back from `pt_br` to `pt` and finally to English.

use crate::error::{AuthError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Locale every lookup falls back to
pub const FALLBACK_LOCALE: &str = "en";

pub type StringParams = HashMap<String, String>;

pub trait Localizer: Send + Sync {
    fn format(&self, key: &str, params: &StringParams, locale: &str) -> String;
}

const EN_STRINGS: &[(&str, &str)] = &[
    (
        "task_apple_expiry_reminder",
        "Apple client secret expiry reminder",
    ),
    (
        "appleclientexpiredsubject",
        "The client secret for {clientname} expires today",
    ),
    (
        "appleclientexpiredmessage",
        "Hi {tousername},\n\n\
         The client secret of the OAuth 2 service \"{clientname}\" (id {clientid}) expires today. \
         Once it has expired, users will not be able to log in with this service.\n\n\
         Generate a new client secret with the identity provider and save it {editlink}.\n\n\
         All configured services: {managelink}",
    ),
    (
        "emailsuccessnotice",
        "Expiry reminder for {clientname} sent to {tousername}",
    ),
    (
        "emailfailednotice",
        "Failed to send expiry reminder for {clientname} to {tousername}",
    ),
    ("noreplyname", "Do not reply to this email"),
];

/// In-memory catalog of string packs
#[derive(Debug, Clone)]
pub struct StringCatalog {
    packs: HashMap<String, HashMap<String, String>>,
}

impl Default for StringCatalog {
    fn default() -> Self {
        let english = EN_STRINGS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let mut packs = HashMap::new();
        packs.insert(FALLBACK_LOCALE.to_string(), english);
        Self { packs }
    }
}

impl StringCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override strings for `locale`
    pub fn add_pack(&mut self, locale: &str, strings: HashMap<String, String>) {
        self.packs
            .entry(normalize_locale(locale))
            .or_default()
            .extend(strings);
    }

    /// Load every `<locale>.json` file in `dir` on top of the built-in strings
    pub fn load_dir(mut self, dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AuthError::Config(format!("cannot read lang dir {}: {}", dir.display(), e))
        })?;

        for entry in entries {
            let path = entry
                .map_err(|e| AuthError::Config(format!("cannot list lang dir: {}", e)))?
                .path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!(path = %path.display(), "Skipping language pack with non UTF-8 name");
                continue;
            };

            let content = std::fs::read_to_string(&path).map_err(|e| {
                AuthError::Config(format!("cannot read {}: {}", path.display(), e))
            })?;
            let strings: HashMap<String, String> = serde_json::from_str(&content)
                .map_err(|e| AuthError::Config(format!("invalid {}: {}", path.display(), e)))?;

            debug!(locale, count = strings.len(), "Loaded language pack");
            self.add_pack(locale, strings);
        }

        Ok(self)
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.packs.contains_key(&normalize_locale(locale))
    }

    fn lookup(&self, key: &str, locale: &str) -> Option<&str> {
        let locale = normalize_locale(locale);
        let parent = locale.split('_').next().unwrap_or_default().to_string();

        [locale, parent, FALLBACK_LOCALE.to_string()]
            .iter()
            .filter_map(|candidate| self.packs.get(candidate))
            .find_map(|pack| pack.get(key))
            .map(String::as_str)
    }
}

impl Localizer for StringCatalog {
    fn format(&self, key: &str, params: &StringParams, locale: &str) -> String {
        match self.lookup(key, locale) {
            Some(template) => substitute(template, params),
            None => {
                warn!(key, locale, "Missing language string");
                format!("[[{}]]", key)
            }
        }
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().to_ascii_lowercase().replace('-', "_")
}

/// Replace `{name}` placeholders; unknown names are left as written
fn substitute(template: &str, params: &StringParams) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let name_len = after
            .find('}')
            .filter(|&end| {
                end > 0
                    && after[..end]
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
            });

        match name_len.and_then(|end| params.get(&after[..end]).map(|value| (end, value))) {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn params(pairs: &[(&str, &str)]) -> StringParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitutes_known_placeholders() {
        let out = substitute(
            "{greeting}, {name}! {unknown} {not a key} {}",
            &params(&[("greeting", "Hi"), ("name", "Sam")]),
        );
        assert_eq!(out, "Hi, Sam! {unknown} {not a key} {}");
    }

    #[test]
    fn test_unterminated_brace_is_kept() {
        assert_eq!(substitute("cost {", &StringParams::new()), "cost {");
    }

    #[test]
    fn test_fallback_chain() {
        let mut catalog = StringCatalog::new();
        catalog.add_pack("pt", params(&[("noreplyname", "Não responda")]));

        let none = StringParams::new();
        assert_eq!(catalog.format("noreplyname", &none, "pt-BR"), "Não responda");
        assert_eq!(
            catalog.format("noreplyname", &none, "de"),
            "Do not reply to this email"
        );
        assert_eq!(catalog.format("nosuchstring", &none, "en"), "[[nosuchstring]]");
    }

    #[test]
    fn test_load_dir_reads_json_packs() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("fr.json")).unwrap();
        write!(
            file,
            r#"{{"appleclientexpiredsubject": "Le secret de {{clientname}} expire aujourd'hui"}}"#
        )
        .unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignored").unwrap();

        let catalog = StringCatalog::new().load_dir(dir.path()).unwrap();
        assert!(catalog.has_locale("fr"));

        let out = catalog.format(
            "appleclientexpiredsubject",
            &params(&[("clientname", "Apple")]),
            "fr",
        );
        assert_eq!(out, "Le secret de Apple expire aujourd'hui");
    }

    #[test]
    fn test_load_dir_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("es.json"), "not json").unwrap();

        assert!(matches!(
            StringCatalog::new().load_dir(dir.path()),
            Err(AuthError::Config(_))
        ));
    }
}
