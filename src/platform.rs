//! Host platform conventions, decided once and passed into the builder and executor.

/// Target platform for path separators and shell selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Unix,
    Windows,
}

impl Platform {
    /// Platform the binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    pub fn separator(self) -> char {
        match self {
            Platform::Unix => '/',
            Platform::Windows => '\\',
        }
    }

    /// Shell binary and the flag that makes it run a command string.
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            Platform::Unix => ("bash", "-c"),
            Platform::Windows => ("powershell", "-Command"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators() {
        assert_eq!(Platform::Unix.separator(), '/');
        assert_eq!(Platform::Windows.separator(), '\\');
    }

    #[test]
    fn shells() {
        assert_eq!(Platform::Unix.shell().0, "bash");
        assert_eq!(Platform::Windows.shell().0, "powershell");
    }
}
