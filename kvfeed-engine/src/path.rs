//! Key layout of entities under an engine prefix.
//!
//! | Kind     | Key                              |
//! |----------|----------------------------------|
//! | Host     | `prefix/hosts/<name>`            |
//! | Listener | `prefix/listeners/<id>`          |
//! | Backend  | `prefix/backends/<id>/backend`   |
//! | Frontend | `prefix/frontends/<id>/frontend` |
//!
//! Matching is structural: a key is split into segments and compared
//! segment by segment, so a template only ever matches keys of its own
//! collection. Each kind owns a distinct collection segment, which keeps
//! the templates disjoint.

use kvfeed_types::EntityKind;

/// Path template of one entity kind, relative to the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyTemplate {
    /// First segment after the prefix.
    pub collection: &'static str,
    /// Fixed segment after the identifier, if the kind has one.
    pub leaf: Option<&'static str>,
}

impl KeyTemplate {
    /// Extracts the identifier from a prefix-relative path.
    pub fn match_relative<'a>(&self, relative: &'a str) -> Option<&'a str> {
        let mut segments = relative.split('/');
        if segments.next()? != self.collection {
            return None;
        }
        let id = segments.next().filter(|id| !id.is_empty())?;
        if let Some(leaf) = self.leaf {
            if segments.next()? != leaf {
                return None;
            }
        }
        match segments.next() {
            None => Some(id),
            Some(_) => None,
        }
    }
}

/// Result of classifying a raw key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKey {
    Host(String),
    Listener(String),
    Backend(String),
    Frontend(String),
    Unrecognized,
}

impl ResolvedKey {
    fn new(kind: EntityKind, id: &str) -> Self {
        let id = id.to_string();
        match kind {
            EntityKind::Host => ResolvedKey::Host(id),
            EntityKind::Listener => ResolvedKey::Listener(id),
            EntityKind::Backend => ResolvedKey::Backend(id),
            EntityKind::Frontend => ResolvedKey::Frontend(id),
        }
    }

    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            ResolvedKey::Host(_) => Some(EntityKind::Host),
            ResolvedKey::Listener(_) => Some(EntityKind::Listener),
            ResolvedKey::Backend(_) => Some(EntityKind::Backend),
            ResolvedKey::Frontend(_) => Some(EntityKind::Frontend),
            ResolvedKey::Unrecognized => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            ResolvedKey::Host(id)
            | ResolvedKey::Listener(id)
            | ResolvedKey::Backend(id)
            | ResolvedKey::Frontend(id) => Some(id),
            ResolvedKey::Unrecognized => None,
        }
    }
}

/// Bidirectional mapping between `(kind, id)` and store keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathScheme {
    prefix: String,
}

impl PathScheme {
    /// Surrounding `/` are dropped: store keys never start with one.
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix the watch lists: the root followed by `/`, so sibling
    /// prefixes such as `vulcand2/` are never included.
    pub fn watch_prefix(&self) -> String {
        format!("{}/", self.prefix)
    }

    /// Subtree holding every entity of `kind`.
    pub fn kind_prefix(&self, kind: EntityKind) -> String {
        format!("{}/{}/", self.prefix, Self::template_for(kind).collection)
    }

    pub fn template_for(kind: EntityKind) -> KeyTemplate {
        match kind {
            EntityKind::Host => KeyTemplate {
                collection: "hosts",
                leaf: None,
            },
            EntityKind::Listener => KeyTemplate {
                collection: "listeners",
                leaf: None,
            },
            EntityKind::Backend => KeyTemplate {
                collection: "backends",
                leaf: Some("backend"),
            },
            EntityKind::Frontend => KeyTemplate {
                collection: "frontends",
                leaf: Some("frontend"),
            },
        }
    }

    /// Key of the entity `id` of `kind`. The id must already be validated.
    pub fn path_for(&self, kind: EntityKind, id: &str) -> String {
        let template = Self::template_for(kind);
        match template.leaf {
            Some(leaf) => format!("{}/{}/{}/{}", self.prefix, template.collection, id, leaf),
            None => format!("{}/{}/{}", self.prefix, template.collection, id),
        }
    }

    pub fn is_kind(&self, key: &str, kind: EntityKind) -> bool {
        self.relative(key)
            .and_then(|relative| Self::template_for(kind).match_relative(relative))
            .is_some()
    }

    /// Classifies a raw key into its entity kind and identifier.
    pub fn resolve(&self, key: &str) -> ResolvedKey {
        let Some(relative) = self.relative(key) else {
            return ResolvedKey::Unrecognized;
        };
        EntityKind::ALL
            .into_iter()
            .find_map(|kind| {
                Self::template_for(kind)
                    .match_relative(relative)
                    .map(|id| ResolvedKey::new(kind, id))
            })
            .unwrap_or(ResolvedKey::Unrecognized)
    }

    fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())?.strip_prefix('/')
    }
}
