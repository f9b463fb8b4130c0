//! Top-level navigation targets.

/// Screen addressed by a navigation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Garden,
    Meditate,
    Journal,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Garden, Route::Meditate, Route::Journal];

    /// Resolves a path. Empty, root and unknown paths land on the garden.
    pub fn resolve(path: &str) -> Self {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "/meditate" => Self::Meditate,
            "/journal" => Self::Journal,
            _ => Self::Garden,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Garden => "/garden",
            Self::Meditate => "/meditate",
            Self::Journal => "/journal",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Garden => "Garden",
            Self::Meditate => "Meditate",
            Self::Journal => "Journal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn known_paths_resolve() {
        for route in Route::ALL {
            assert_eq!(Route::resolve(route.path()), route);
        }
        assert_eq!(Route::resolve("/journal/"), Route::Journal);
    }

    #[test]
    fn unknown_paths_fall_back_to_garden() {
        for path in ["", "/", "/settings", "journal", "/Journal"] {
            assert_eq!(Route::resolve(path), Route::Garden, "{path}");
        }
    }
}
