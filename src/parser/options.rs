//! Parsing options and configuration.

/// Options for parsing Markdown report sections.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// How many characters before a diagram fence are searched for its caption
    pub caption_lookback: usize,

    /// Fence language tag that marks a diagram
    pub diagram_language: String,

    /// Caption label for figures (`[그림Ⅰ-1]`)
    pub figure_label: String,

    /// Caption label for tables (`[표Ⅰ-1]`)
    pub table_label: String,

    /// Bullet text longer than this is presented as a hanging paragraph
    pub hanging_min_length: usize,

    /// A colon within this many leading characters makes a bullet hanging
    pub hanging_colon_window: usize,

    /// Whether manual heading numbers are removed
    pub strip_heading_numbers: bool,

    /// Whether figure captions are moved after their image
    pub arrange_captions: bool,

    /// Whether input is NFC-normalized before tokenizing
    pub normalize_unicode: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip missing sections).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the caption lookback window in characters.
    pub fn with_caption_lookback(mut self, chars: usize) -> Self {
        self.caption_lookback = chars;
        self
    }

    /// Set the fence language that marks a diagram.
    pub fn with_diagram_language(mut self, language: impl Into<String>) -> Self {
        self.diagram_language = language.into();
        self
    }

    /// Set caption labels for figures and tables.
    pub fn with_caption_labels(
        mut self,
        figure: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        self.figure_label = figure.into();
        self.table_label = table.into();
        self
    }

    /// Set the hanging-bullet thresholds.
    pub fn with_hanging_thresholds(mut self, min_length: usize, colon_window: usize) -> Self {
        self.hanging_min_length = min_length;
        self.hanging_colon_window = colon_window;
        self
    }

    /// Keep manual heading numbers as written.
    pub fn keep_heading_numbers(mut self) -> Self {
        self.strip_heading_numbers = false;
        self
    }

    /// Enable or disable caption arrangement.
    pub fn with_caption_arrangement(mut self, arrange: bool) -> Self {
        self.arrange_captions = arrange;
        self
    }

    /// Enable or disable Unicode normalization.
    pub fn with_unicode_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            caption_lookback: 500,
            diagram_language: "mermaid".to_string(),
            figure_label: "그림".to_string(),
            table_label: "표".to_string(),
            hanging_min_length: 80,
            hanging_colon_window: 30,
            strip_heading_numbers: true,
            arrange_captions: true,
            normalize_unicode: true,
        }
    }
}

/// Error handling mode for missing inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any missing section
    #[default]
    Strict,
    /// Skip missing sections and continue
    Lenient,
}
