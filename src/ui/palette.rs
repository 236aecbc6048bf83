use console::Term;
use owo_colors::Style;
use std::sync::OnceLock;

static STDOUT: OnceLock<Palette> = OnceLock::new();
static STDERR: OnceLock<Palette> = OnceLock::new();

/// Styles for the startup banner and the stats report
#[derive(Debug, Clone)]
pub struct Palette {
    pub title: Style,
    pub label: Style,
    pub accent: Style,
    pub caution: Style,
}

impl Palette {
    /// Colored when `term` is an interactive terminal and colors are not disabled
    pub fn for_term(term: &Term) -> Self {
        if term.is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().white().dimmed(),
            accent: Style::new().magenta(),
            caution: Style::new().yellow().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            title: Style::new(),
            label: Style::new(),
            accent: Style::new(),
            caution: Style::new(),
        }
    }
}

pub fn stdout_palette() -> &'static Palette {
    STDOUT.get_or_init(|| Palette::for_term(&Term::stdout()))
}

pub fn stderr_palette() -> &'static Palette {
    STDERR.get_or_init(|| Palette::for_term(&Term::stderr()))
}
