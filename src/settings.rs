use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parser::layout::ExtractionLayout;
use crate::render::{OnInvalidRecord, TemplateRef};

pub const DEFAULT_CONFIG_FILE: &str = "jobads.toml";
pub const ENV_PREFIX: &str = "JOBADS";

const SEARCH_API_URL: &str = concat!(
    "https://porsche-beesite-production-gjb.app.beesite.de/search/?data=%7B",
    "%22LanguageCode%22%3A%22DE%22%2C%22SearchParameters%22%3A%7B%22FirstItem",
    "%22%3A1%2C%22CountItem%22%3A1567%2C%22Sort%22%3A%5B%7B%22Criterion%22%",
    "3A%22PublicationStartDate%22%2C%22Direction%22%3A%22DESC%22%7D%5D%2C%22",
    "MatchedObjectDescriptor%22%3A%5B%22ID%22%2C%22PositionTitle%22%2C%22",
    "PositionURI%22%2C%22PositionShortURI%22%2C%22PositionLocation.CountryName",
    "%22%2C%22PositionLocation.CityName%22%2C%22PositionLocation.Longitude",
    "%22%2C%22PositionLocation.Latitude%22%2C%22PositionLocation.PostalCode",
    "%22%2C%22PositionLocation.StreetName%22%2C%22PositionLocation.Building",
    "Number%22%2C%22PositionLocation.Distance%22%2C%22JobCategory.Name%22%",
    "2C%22PublicationStartDate%22%2C%22ParentOrganizationName%22%2C%22",
    "ParentOrganization%22%2C%22OrganizationShortName%22%2C%22CareerLevel.Name",
    "%22%2C%22JobSector.Name%22%2C%22PositionIndustry.Name%22%2C%22Publication",
    "Code%22%2C%22PublicationChannel.Id%22%5D%7D%2C%22SearchCriteria%22%3A%5B%",
    "7B%22CriterionName%22%3A%22PublicationChannel.Code%22%2C%22CriterionValue",
    "%22%3A%5B%2212%22%5D%7D%5D%7D",
);
const DETAIL_BASE_URL: &str = "https://jobs.porsche.com/index.php?ac=jobad&id=";

/// Runtime settings: defaults, then an optional TOML file, then `JOBADS_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base for every relative path below.
    pub project_root: PathBuf,
    pub data_dir: PathBuf,
    /// Run directory name; `<YYYYMMDD>-dev-jobs` when unset.
    pub version: Option<String>,
    pub api_url: String,
    pub detail_base_url: String,
    pub template_dir: PathBuf,
    pub template_name: String,
    pub stylesheet_name: String,
    pub wkhtmltopdf: PathBuf,
    pub crawl_concurrency: usize,
    pub request_timeout_secs: u64,
    pub on_invalid: OnInvalidRecord,
    pub log_level: String,
    pub layout: ExtractionLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            data_dir: PathBuf::from("data"),
            version: None,
            api_url: SEARCH_API_URL.to_string(),
            detail_base_url: DETAIL_BASE_URL.to_string(),
            template_dir: PathBuf::from("templates"),
            template_name: "template.html".into(),
            stylesheet_name: "style.css".into(),
            wkhtmltopdf: PathBuf::from("wkhtmltopdf"),
            crawl_concurrency: 4,
            request_timeout_secs: 30,
            on_invalid: OnInvalidRecord::Skip,
            log_level: "info".into(),
            layout: ExtractionLayout::default(),
        }
    }
}

/// Artifact locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub dir: PathBuf,
    pub filter_config: PathBuf,
    pub ids: PathBuf,
    pub records: PathBuf,
    pub pdf_dir: PathBuf,
}

impl Settings {
    /// Load settings. `file` must exist when given; otherwise
    /// `jobads.toml` in the working directory is used if present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn run_paths(&self, version: Option<&str>) -> RunPaths {
        let version = version
            .map(str::to_string)
            .or_else(|| self.version.clone())
            .unwrap_or_else(default_version);
        let dir = self.resolve(&self.data_dir).join(version);
        RunPaths {
            filter_config: dir.join("filter_config.json"),
            ids: dir.join("job_ids.npy"),
            records: dir.join("jobs.json"),
            pdf_dir: dir.join("pdfs"),
            dir,
        }
    }

    pub fn template_ref(&self) -> TemplateRef {
        TemplateRef {
            dir: self.resolve(&self.template_dir),
            name: self.template_name.clone(),
            stylesheet: self.stylesheet_name.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn default_version() -> String {
    format!("{}-dev-jobs", Local::now().format("%Y%m%d"))
}
