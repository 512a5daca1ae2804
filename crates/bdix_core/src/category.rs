use std::fmt;
use std::str::FromStr;

/// Block of the server-list document a run tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Ftp,
    Tv,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Ftp, Category::Tv];

    /// Uppercase name used inside the document markers.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ftp => "FTP",
            Category::Tv => "TV",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}' (expected FTP or TV)", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseCategoryError(trimmed.to_string()))
    }
}
