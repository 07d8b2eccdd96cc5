//! Runtime configuration.
//!
//! Two optional inputs feed a run:
//!
//! - a YAML [`ScraperConfig`] describing the target site, the bounded waits
//!   and every selector the navigator and promo parser rely on;
//! - a JSON work-item payload (`{"query", "section", "months"}`) that is
//!   turned into [`SearchParameters`] by [`search_parameters_from_payload`].
//!
//! Every configuration field has a default matching the live site, so an
//! empty file, or no file at all, is valid.

use crate::error::ConfigError;
use crate::models::SearchParameters;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Scraper configuration loaded from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root the browser opens before searching.
    pub site_url: String,
    /// Run Chromium without a window.
    pub headless: bool,
    /// Chromium binary to launch; chromiumoxide looks one up when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Launch Chromium with `--no-sandbox` (needed when running as root in containers).
    pub no_sandbox: bool,
    /// Extra command-line flags passed to Chromium.
    pub browser_args: Vec<String>,
    pub waits: WaitConfig,
    pub selectors: SelectorConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_url: "https://www.latimes.com/".to_string(),
            headless: true,
            chrome_executable: None,
            no_sandbox: false,
            browser_args: vec![
                "--disable-gpu".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-extensions".to_string(),
            ],
            waits: WaitConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// Upper bounds for each blocking wait.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Search button, search input, section filter and next-page link, in seconds.
    pub control_secs: u64,
    /// Sort dropdown, in seconds.
    pub sort_secs: u64,
    /// First promo element of a results page, in seconds.
    pub results_secs: u64,
    /// URL change after clicking next page, in seconds.
    pub page_change_secs: u64,
    /// Delay between polls while waiting, in milliseconds.
    pub poll_millis: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            control_secs: 5,
            sort_secs: 10,
            results_secs: 5,
            page_change_secs: 10,
            poll_millis: 250,
        }
    }
}

impl WaitConfig {
    pub fn control(&self) -> Duration {
        Duration::from_secs(self.control_secs)
    }

    pub fn sort(&self) -> Duration {
        Duration::from_secs(self.sort_secs)
    }

    pub fn results(&self) -> Duration {
        Duration::from_secs(self.results_secs)
    }

    pub fn page_change(&self) -> Duration {
        Duration::from_secs(self.page_change_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_millis.max(1))
    }
}

/// CSS selectors (and one XPath template) for the search results site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub search_button: String,
    pub search_input: String,
    pub sort_select: String,
    /// Visible text of the sort option to pick.
    pub sort_option: String,
    /// XPath of the section checkbox; `{label}` is replaced by a quoted label.
    pub section_checkbox_xpath: String,
    pub promo: String,
    pub promo_timestamp: String,
    /// Attribute of `promo_timestamp` holding epoch milliseconds.
    pub timestamp_attribute: String,
    pub promo_title: String,
    pub promo_description: String,
    pub promo_image: String,
    pub next_page: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            search_button: "button[data-element='search-button']".to_string(),
            search_input: "input[data-element='search-form-input']".to_string(),
            sort_select: "select.select-input".to_string(),
            sort_option: "Newest".to_string(),
            section_checkbox_xpath: "//label[span[text()={label}]]//input[@type='checkbox']"
                .to_string(),
            promo: "div.promo-wrapper".to_string(),
            promo_timestamp: ".promo-timestamp".to_string(),
            timestamp_attribute: "data-timestamp".to_string(),
            promo_title: ".promo-title".to_string(),
            promo_description: ".promo-description".to_string(),
            promo_image: ".image".to_string(),
            next_page: "div.search-results-module-next-page a".to_string(),
        }
    }
}

impl SelectorConfig {
    /// XPath of the checkbox for `label`.
    pub fn section_checkbox(&self, label: &str) -> String {
        self.section_checkbox_xpath
            .replace("{label}", &xpath_literal(label))
    }
}

/// Quote `text` as an XPath string literal, whatever quotes it contains.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts = text
            .split('\'')
            .map(|p| format!("'{p}'"))
            .collect::<Vec<_>>()
            .join(", \"'\", ");
        format!("concat({parts})")
    }
}

/// Load a [`ScraperConfig`] from a YAML file, or the defaults when `path` is `None`.
///
/// # Arguments
///
/// * `path` - Optional YAML file; keys it omits keep their defaults
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read and
/// [`ConfigError::Yaml`] if it is not a valid config document.
#[instrument(level = "info")]
pub fn load_config(path: Option<&Path>) -> Result<ScraperConfig, ConfigError> {
    let Some(path) = path else {
        info!("No configuration file given; using defaults");
        return Ok(ScraperConfig::default());
    };
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&raw)
}

/// Parse YAML text into a [`ScraperConfig`]; blank text yields the defaults.
pub fn parse_config(raw: &str) -> Result<ScraperConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(ScraperConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

/// Read a work-item payload file as JSON.
#[instrument(level = "info")]
pub fn load_payload(path: &Path) -> Result<Value, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

/// Turn a work-item payload into [`SearchParameters`].
///
/// # Arguments
///
/// * `payload` - The parsed work-item JSON, ideally an object with `query`,
///   `section` and `months`
///
/// # Returns
///
/// Parameters that always pass [`SearchParameters::validate`]. Missing
/// `query`/`section` become empty strings and a missing or non-numeric
/// `months` becomes `1`; each is logged. `months <= 0` is normalised to `1`.
pub fn search_parameters_from_payload(payload: &Value) -> SearchParameters {
    let query = string_field(payload, "query");
    let section = string_field(payload, "section");

    let months = match payload.get("months") {
        None | Some(Value::Null) => {
            error!("The 'months' field is missing in the payload; using 1");
            1
        }
        Some(raw) => match months_value(raw) {
            Some(m) => m,
            None => {
                error!(months = %raw, "The 'months' field is not a number; using 1");
                1
            }
        },
    };

    SearchParameters::new(query, section, normalize_months(months))
}

/// Clamp a requested month count to at least one.
pub fn normalize_months(months: i64) -> u32 {
    if months <= 0 {
        warn!(months, "Non-positive month count; searching the last month");
        1
    } else {
        u32::try_from(months).unwrap_or(u32::MAX)
    }
}

fn string_field(payload: &Value, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            error!(field = key, "Field is missing in the payload; using an empty string");
            String::new()
        }
        Some(other) => other.to_string(),
    }
}

fn months_value(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), ScraperConfig::default());
        assert_eq!(parse_config("  \n").unwrap(), ScraperConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let cfg = parse_config(
            "headless: false\nwaits:\n  sort_secs: 20\nselectors:\n  sort_option: Relevance\n",
        )
        .unwrap();
        assert!(!cfg.headless);
        assert_eq!(cfg.waits.sort_secs, 20);
        assert_eq!(cfg.waits.control_secs, 5);
        assert_eq!(cfg.selectors.sort_option, "Relevance");
        assert_eq!(cfg.selectors.promo, "div.promo-wrapper");
        assert_eq!(cfg.site_url, "https://www.latimes.com/");
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(matches!(
            parse_config("waits: [1, 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_section_checkbox_quoting() {
        let sel = SelectorConfig::default();
        assert_eq!(
            sel.section_checkbox("World & Nation"),
            "//label[span[text()='World & Nation']]//input[@type='checkbox']"
        );
        assert_eq!(
            sel.section_checkbox("Editor's Picks"),
            "//label[span[text()=\"Editor's Picks\"]]//input[@type='checkbox']"
        );
        assert_eq!(xpath_literal("a'b\"c"), "concat('a', \"'\", 'b\"c')");
    }

    #[test]
    fn test_payload_complete() {
        let params = search_parameters_from_payload(&json!({
            "query": "wildfire",
            "section": "California",
            "months": 3
        }));
        assert_eq!(params, SearchParameters::new("wildfire", "California", 3));
    }

    #[test]
    fn test_payload_defaults_missing_fields() {
        let params = search_parameters_from_payload(&json!({}));
        assert_eq!(params, SearchParameters::new("", "", 1));
    }

    #[test]
    fn test_payload_normalizes_months() {
        let zero = search_parameters_from_payload(&json!({"query": "q", "months": 0}));
        assert_eq!(zero.months, 1);
        let negative = search_parameters_from_payload(&json!({"query": "q", "months": -4}));
        assert_eq!(negative.months, 1);
        let text = search_parameters_from_payload(&json!({"query": "q", "months": "2"}));
        assert_eq!(text.months, 2);
        let junk = search_parameters_from_payload(&json!({"query": "q", "months": "soon"}));
        assert_eq!(junk.months, 1);
    }

    #[test]
    fn test_load_payload_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("payload.json");
        std::fs::write(&path, r#"{"query": "fed", "section": "Business", "months": 2}"#).unwrap();
        let params = search_parameters_from_payload(&load_payload(&path).unwrap());
        assert_eq!(params, SearchParameters::new("fed", "Business", 2));
    }
}
