use chrono::Weekday;
use std::path::PathBuf;

use crate::theme::Theme;

/// Configuration for the plum growth animation.
#[derive(Clone)]
pub struct PlumConfig {
    pub print: bool,
    pub infinite: bool,
    pub time_wait: f64,
    pub seed: Option<u64>,
    pub theme_override: Option<Theme>,
}

/// Configuration for the contribution heatmap view.
#[derive(Clone)]
pub struct ContribConfig {
    pub user: Option<String>,
    pub file: Option<PathBuf>,
    pub week_start: Weekday,
    pub theme_override: Option<Theme>,
    pub motion: bool,
    pub slug: Option<String>,
}
