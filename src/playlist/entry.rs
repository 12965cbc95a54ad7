use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    System,
}

/// Who added an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub role: Role,
    /// Role specific id, e.g. a chat platform user id.
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Entity {
    pub fn user(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    /// The bot itself, used for everything extrapolation adds.
    pub fn system() -> Self {
        Self {
            role: Role::System,
            id: None,
            name: None,
        }
    }

    /// Name shown in listings; unnamed entities fall back to their role.
    pub fn display_name(&self) -> &str {
        match (self.name.as_deref(), self.role) {
            (Some(name), _) if !name.is_empty() => name,
            (_, Role::System) => "bot",
            (_, Role::User) => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Source {
    #[default]
    YouTube,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub added_at: OffsetDateTime,
    pub title: String,
    pub added_by: Entity,
    pub source: Source,
    /// Source specific identifier, a video id for YouTube.
    pub uri: String,
}

impl PlaylistEntry {
    pub fn new(title: impl Into<String>, uri: impl Into<String>, added_by: Entity) -> Self {
        Self {
            added_at: OffsetDateTime::now_utc(),
            title: title.into(),
            added_by,
            source: Source::YouTube,
            uri: uri.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        assert_eq!(Entity::system().display_name(), "bot");
        assert_eq!(Entity::user("42", "alice").display_name(), "alice");

        let anonymous = Entity {
            role: Role::User,
            id: Some("7".into()),
            name: Some(String::new()),
        };
        assert_eq!(anonymous.display_name(), "user");
    }
}
