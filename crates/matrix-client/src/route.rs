use std::fmt;

/// Client-side locations. `Login` lives at `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Profile { username: String },
    Users,
    NotFound { path: String },
}

impl Route {
    pub fn profile(username: impl Into<String>) -> Self {
        Self::Profile {
            username: username.into(),
        }
    }

    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = trimmed.trim_end_matches('/');

        match normalized {
            "" => Self::Login,
            "/users" => Self::Users,
            _ => match normalized.strip_prefix("/profile/") {
                Some(username) if !username.is_empty() && !username.contains('/') => {
                    Self::profile(username)
                }
                _ => Self::NotFound {
                    path: trimmed.to_string(),
                },
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Login => "/".to_string(),
            Self::Profile { username } => format!("/profile/{}", username),
            Self::Users => "/users".to_string(),
            Self::NotFound { path } => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
