//! Integer enumerations extracted from protocol schema text.
//!
//! This is pattern scanning, not a protobuf parser. Only `enum Name { KEY = 1; }`
//! blocks are understood, optionally scoped to the `message` that contains them.
use crate::identifier::{Identifier, Reference};

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_]+)\s*=\s*(-?\d+)").expect("valid enum entry pattern")
});

/// The raw schema of a single load, with its resolved enumerations cached.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    text: String,
    cache: BTreeMap<String, Arc<Enumeration>>,
}

impl Schema {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cache: BTreeMap::new(),
        }
    }

    /// Resolves the enumeration `name`, optionally looking only inside
    /// `message` and stripping `remove` from every key.
    ///
    /// Returns [`Enumeration::unknown`] if the pattern is not found.
    pub fn enumeration(
        &mut self,
        name: &str,
        message: Option<&str>,
        remove: Option<&str>,
    ) -> Arc<Enumeration> {
        let key = format!(
            "{}:{}",
            message.unwrap_or("none").to_lowercase(),
            name.to_lowercase()
        );

        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let Some(enumeration) = self.extract(name, message, remove) else {
            log::warn!("Enum {name} not found in protos");

            return Arc::new(Enumeration::unknown(name));
        };

        let enumeration = Arc::new(enumeration);
        let _ = self.cache.insert(key, enumeration.clone());

        enumeration
    }

    fn extract(&self, name: &str, message: Option<&str>, remove: Option<&str>) -> Option<Enumeration> {
        let scope = match message {
            Some(message) => {
                let pattern = format!(
                    r"(?is)message\s+{}\b.*?(?:\bmessage\b|\z)",
                    regex::escape(message)
                );
                let scope = Regex::new(&pattern).ok()?.find(&self.text)?;

                scope.as_str()
            }
            None => self.text.as_str(),
        };

        let pattern = format!(r"(?i)enum\s+{}\s*\{{([^}}]*)\}}", regex::escape(name));
        let body = Regex::new(&pattern).ok()?.captures(scope)?.get(1)?.as_str();

        let mut enumeration = Enumeration::new(name);

        for line in body.lines() {
            let Some(entry) = ENTRY.captures(line) else {
                continue;
            };

            let Ok(value) = entry[2].parse() else {
                continue;
            };

            let key = match remove {
                Some(remove) => entry[1].replace(remove, ""),
                None => entry[1].to_owned(),
            };

            enumeration.insert(key, value);
        }

        Some(enumeration)
    }
}

/// A bidirectional name/value mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    name: String,
    by_name: BTreeMap<String, i64>,
    by_value: BTreeMap<i64, String>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            by_name: BTreeMap::new(),
            by_value: BTreeMap::new(),
        }
    }

    /// The sentinel for enumerations missing from the schema. It only
    /// contains the default member.
    pub fn unknown(name: impl Into<String>) -> Self {
        let mut enumeration = Self::new(name);
        enumeration.insert(Identifier::UNSET.to_owned(), 0);
        enumeration
    }

    pub fn insert(&mut self, key: String, value: i64) {
        // Aliased values keep their first name
        let _ = self.by_value.entry(value).or_insert_with(|| key.clone());
        let _ = self.by_name.insert(key, value);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    pub fn key(&self, value: i64) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }

    /// Members in ascending value order.
    pub fn members(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.by_value
            .iter()
            .map(|(value, key)| Identifier::new(*value, key.clone()))
    }

    pub fn get(&self, value: i64) -> Identifier {
        self.try_get(value).unwrap_or_default()
    }

    pub fn try_get(&self, value: i64) -> Option<Identifier> {
        Some(Identifier::new(value, self.key(value)?))
    }

    /// Resolves a raw template field, falling back to the default identifier.
    pub fn resolve(&self, reference: &Reference) -> Identifier {
        self.try_resolve(reference).unwrap_or_default()
    }

    pub fn try_resolve(&self, reference: &Reference) -> Option<Identifier> {
        match reference {
            Reference::Id(value) => self.try_get(*value),
            Reference::Name(name) => match self.value(name) {
                Some(value) => Some(Identifier::new(value, name.clone())),
                None => self.try_get(name.parse().ok()?),
            },
        }
    }

    pub fn resolve_optional(&self, reference: Option<&Reference>) -> Identifier {
        reference
            .map(|reference| self.resolve(reference))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod proto_test {
    use pretty_assertions::assert_eq;

    use crate::identifier::{Identifier, Reference};
    use crate::proto::Schema;

    const PROTOS: &str = "
message PokemonDisplayProto {
\tenum Costume {
\t\tUNSET = 0;
\t\tHOLIDAY_2016 = 1;
\t\tANNIVERSARY = 2;
\t}
\tenum Form {
\t\tFORM_UNSET = 0;
\t\tUNOWN_A = 1;
\t}
}

message WeatherAffinityProto {
\tenum Form {
\t\tWRONG_SCOPE = 7;
\t}
}

enum HoloPokemonType {
\tPOKEMON_TYPE_NONE = 0;
\tPOKEMON_TYPE_NORMAL = 1;
\tPOKEMON_TYPE_FIRE = 10;
}
";

    #[test]
    fn extracts_enum_members() {
        let mut schema = Schema::new(PROTOS);
        let types = schema.enumeration("HoloPokemonType", None, None);

        assert_eq!(types.len(), 3);
        assert_eq!(types.value("POKEMON_TYPE_FIRE"), Some(10));
        assert_eq!(types.key(1), Some("POKEMON_TYPE_NORMAL"));
        assert_eq!(
            types.members().map(|member| member.id).collect::<Vec<_>>(),
            vec![0, 1, 10]
        );
    }

    #[test]
    fn scopes_to_message() {
        let mut schema = Schema::new(PROTOS);
        let forms = schema.enumeration("Form", Some("WeatherAffinityProto"), None);

        assert_eq!(forms.value("WRONG_SCOPE"), Some(7));
        assert_eq!(forms.value("UNOWN_A"), None);
    }

    #[test]
    fn strips_prefix() {
        let mut schema = Schema::new(PROTOS);
        let types = schema.enumeration("HoloPokemonType", None, Some("POKEMON_TYPE_"));

        assert_eq!(types.value("FIRE"), Some(10));
    }

    #[test]
    fn caches_case_insensitively() {
        let mut schema = Schema::new(PROTOS);
        let first = schema.enumeration("Costume", None, None);
        let second = schema.enumeration("COSTUME", None, None);

        assert!(std::sync::Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn unknown_enum_degrades_to_default() {
        let mut schema = Schema::new(PROTOS);
        let missing = schema.enumeration("HoloPokemonMove", None, None);

        assert_eq!(missing.len(), 1);
        assert_eq!(
            missing.resolve(&Reference::Name("TACKLE_FAST".to_owned())),
            Identifier::default()
        );
        assert_eq!(
            schema.enumeration("Form", Some("MissingProto"), None).len(),
            1
        );
    }

    #[test]
    fn resolves_references() {
        let mut schema = Schema::new(PROTOS);
        let costumes = schema.enumeration("Costume", None, None);

        assert_eq!(
            costumes.resolve(&Reference::Id(2)),
            Identifier::new(2, "ANNIVERSARY")
        );
        assert_eq!(
            costumes.resolve(&Reference::Name("HOLIDAY_2016".to_owned())),
            Identifier::new(1, "HOLIDAY_2016")
        );
        assert_eq!(costumes.resolve(&Reference::Id(99)), Identifier::default());
        assert_eq!(costumes.try_resolve(&Reference::Name("NOPE".to_owned())), None);
    }
}
