use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Anything other than `light` reads as the dark theme.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "light" { Theme::Light } else { Theme::Dark }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                background: Rgb(0x00, 0x00, 0x00),
                foreground: Rgb(0x00, 0x80, 0x00),
                accent: Rgb(0x0f, 0x51, 0x32),
                accent_active: Rgb(0x14, 0x53, 0x2d),
            },
            Theme::Light => Palette {
                background: Rgb(0xff, 0xff, 0xff),
                foreground: Rgb(0x00, 0x00, 0x00),
                accent: Rgb(0xd1, 0xd1, 0xd1),
                accent_active: Rgb(0xc1, 0xc1, 0xc1),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub foreground: Rgb,
    pub accent: Rgb,
    pub accent_active: Rgb,
}

/// Current theme plus the one-line file it is persisted to.
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    current: Theme,
}

impl ThemeStore {
    /// Reads the persisted theme, defaulting to dark when the file is absent or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => Theme::parse(&raw),
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Could not read theme file {}: {}", path.display(), e);
                }
                Theme::Dark
            }
        };
        debug!("Loaded theme {}", current);
        Self { path, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Switches to `theme` and persists it.
    pub fn set(&mut self, theme: Theme) -> io::Result<()> {
        self.current = theme;
        fs::write(&self.path, theme.as_str())
    }
}
