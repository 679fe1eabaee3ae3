// Default values for the widget - these are the single source of truth for defaults

// Popup launcher
pub const DEFAULT_CARD_SELECTOR: &str = ".pending-task-card";
pub const DEFAULT_CARD_URL_ATTRIBUTE: &str = "data-url";
pub const DEFAULT_POPUP_WINDOW_NAME: &str = "TaskAction";
pub const DEFAULT_POPUP_WIDTH: u32 = 900;
pub const DEFAULT_POPUP_HEIGHT: u32 = 700;

// Poll trigger
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 60_000;
pub const DEFAULT_REFRESH_GLYPH: &str = "🔄";
pub const DEFAULT_REFRESH_MESSAGE: &str = "process-tracker:refresh";

// Diagram viewer DOM contract
pub const DEFAULT_CONTAINER_ID: &str = "canvas";
pub const DEFAULT_LOADING_ID: &str = "loading";
pub const DEFAULT_CONTROLS_ID: &str = "controls";
pub const DEFAULT_LEGEND_ID: &str = "legend";
pub const DEFAULT_LOADING_TEXT: &str = "🔄 Loading diagram...";
pub const DEFAULT_ERROR_TEXT: &str = "❌ Failed to load the diagram.";

// Node colors
pub const COMPLETED_FILL: &str = "#d4edda"; // Light green
pub const COMPLETED_STROKE: &str = "#155724";
pub const PENDING_FILL: &str = "#fff3cd"; // Light amber
pub const PENDING_STROKE: &str = "#856404";

// Zoom
pub const ZOOM_STEP: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.1;
pub const FIT_VIEWPORT: &str = "fit-viewport";

// Layout retry
pub const LAYOUT_RETRY_INITIAL_MS: u32 = 50;
pub const LAYOUT_RETRY_MAX_MS: u32 = 1_000;
pub const LAYOUT_RETRY_MAX_ATTEMPTS: u32 = 120;
