//! Offer import configuration loaded via OrthoConfig.
//!
//! Values come from `OFFER_IMPORT_*` environment variables or a config file.
//! Missing values fall back to the defaults of the offer import job.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::offer_import::{ImportJobConfig, RecordErrorKind};
use crate::domain::{DomainResult, Error};

const DEFAULT_JOB_NAME: &str = "offer-import";
const DEFAULT_CHUNK_SIZE: usize = 2;
const DEFAULT_SKIP_LIMIT: u64 = 1;
const DEFAULT_DELIMITER: char = ',';
const DEFAULT_COMMENT_PREFIX: &str = "#";

/// Configuration values controlling an offer import run.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "OFFER_IMPORT")]
pub struct ImportSettings {
    /// Logical job name keying run ids.
    pub job_name: Option<String>,
    /// Records per committed chunk.
    pub chunk_size: Option<usize>,
    /// Tolerated number of skipped records.
    pub skip_limit: Option<u64>,
    /// Single-character field delimiter.
    pub delimiter: Option<String>,
    /// Leading lines ignored before parsing, such as a header.
    pub lines_to_skip: Option<usize>,
    /// Prefix marking comment lines. An empty value disables comments.
    pub comment_prefix: Option<String>,
    /// Restrict skipping to these record error kinds, written in snake case
    /// (`incorrect_token_count`, `malformed_line`, `invalid_field`).
    pub skippable: Option<Vec<RecordErrorKind>>,
}

impl ImportSettings {
    /// Return the configured job name, falling back to the default.
    pub fn job_name(&self) -> &str {
        self.job_name.as_deref().unwrap_or(DEFAULT_JOB_NAME)
    }

    /// Return the configured chunk size, falling back to the default.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE)
    }

    /// Return the configured skip limit, falling back to the default.
    pub fn skip_limit(&self) -> u64 {
        self.skip_limit.unwrap_or(DEFAULT_SKIP_LIMIT)
    }

    /// Return the configured comment prefix, falling back to the default.
    pub fn comment_prefix(&self) -> &str {
        self.comment_prefix
            .as_deref()
            .unwrap_or(DEFAULT_COMMENT_PREFIX)
    }

    /// Validate the settings into a job configuration.
    ///
    /// # Examples
    /// ```
    /// use restaurant_backend::config::ImportSettings;
    ///
    /// let settings = ImportSettings {
    ///     chunk_size: Some(10),
    ///     ..ImportSettings::default()
    /// };
    /// let config = settings.to_job_config()?;
    /// assert_eq!(config.chunk_size().get(), 10);
    /// # Ok::<(), restaurant_backend::domain::Error>(())
    /// ```
    pub fn to_job_config(&self) -> DomainResult<ImportJobConfig> {
        let mut config = ImportJobConfig::new(self.chunk_size(), self.skip_limit())?
            .with_delimiter(self.delimiter()?)?
            .with_lines_to_skip(self.lines_to_skip.unwrap_or_default())
            .with_comment_prefix(Some(self.comment_prefix().to_owned()));
        if let Some(kinds) = &self.skippable {
            config = config.with_skippable(kinds.iter().copied().collect());
        }
        Ok(config)
    }

    fn delimiter(&self) -> DomainResult<char> {
        let Some(raw) = self.delimiter.as_deref() else {
            return Ok(DEFAULT_DELIMITER);
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(delimiter), None) => Ok(delimiter),
            _ => Err(Error::invalid_request(format!(
                "delimiter must be a single character, got {raw:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for offer import configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use crate::domain::ErrorCode;

    const VARS: [&str; 7] = [
        "OFFER_IMPORT_JOB_NAME",
        "OFFER_IMPORT_CHUNK_SIZE",
        "OFFER_IMPORT_SKIP_LIMIT",
        "OFFER_IMPORT_DELIMITER",
        "OFFER_IMPORT_LINES_TO_SKIP",
        "OFFER_IMPORT_COMMENT_PREFIX",
        "OFFER_IMPORT_SKIPPABLE",
    ];

    fn load_from_empty_args() -> ImportSettings {
        ImportSettings::load_from_iter([OsString::from("import-offers")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        let config = settings.to_job_config().expect("valid defaults");

        assert_eq!(settings.job_name(), DEFAULT_JOB_NAME);
        assert_eq!(config, ImportJobConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("OFFER_IMPORT_JOB_NAME", Some("nightly-offers".to_owned())),
            ("OFFER_IMPORT_CHUNK_SIZE", Some("50".to_owned())),
            ("OFFER_IMPORT_SKIP_LIMIT", Some("3".to_owned())),
            ("OFFER_IMPORT_DELIMITER", Some(";".to_owned())),
            ("OFFER_IMPORT_LINES_TO_SKIP", Some("1".to_owned())),
            ("OFFER_IMPORT_COMMENT_PREFIX", None),
            ("OFFER_IMPORT_SKIPPABLE", None),
        ]);

        let settings = load_from_empty_args();
        let config = settings.to_job_config().expect("valid overrides");

        assert_eq!(settings.job_name(), "nightly-offers");
        assert_eq!(config.chunk_size().get(), 50);
        assert_eq!(config.skip_policy().skip_limit(), 3);
        assert_eq!(config.tokenizer().delimiter(), ';');
        assert_eq!(config.lines_to_skip(), 1);
    }

    #[rstest]
    #[case(ImportSettings { chunk_size: Some(0), ..ImportSettings::default() })]
    #[case(ImportSettings { delimiter: Some(";;".to_owned()), ..ImportSettings::default() })]
    #[case(ImportSettings { delimiter: Some("\"".to_owned()), ..ImportSettings::default() })]
    fn invalid_settings_are_rejected(#[case] settings: ImportSettings) {
        let error = settings.to_job_config().expect_err("invalid settings");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn empty_comment_prefix_disables_comments() {
        let settings = ImportSettings {
            comment_prefix: Some(String::new()),
            skippable: Some(vec![RecordErrorKind::IncorrectTokenCount]),
            ..ImportSettings::default()
        };

        let config = settings.to_job_config().expect("valid settings");

        assert_eq!(config.comment_prefix(), None);
        assert!(
            config
                .skip_policy()
                .is_skippable(RecordErrorKind::IncorrectTokenCount)
        );
        assert!(!config.skip_policy().is_skippable(RecordErrorKind::InvalidField));
    }

    #[rstest]
    fn skippable_kinds_deserialise_in_snake_case() {
        let settings: ImportSettings =
            serde_json::from_str(r#"{ "skippable": ["malformed_line", "invalid_field"] }"#)
                .expect("known kinds");

        let config = settings.to_job_config().expect("valid settings");

        let policy = config.skip_policy();
        assert!(policy.is_skippable(RecordErrorKind::MalformedLine));
        assert!(policy.is_skippable(RecordErrorKind::InvalidField));
        assert!(!policy.is_skippable(RecordErrorKind::IncorrectTokenCount));
    }

    #[rstest]
    #[case(r#"{ "skippable": ["disk_full"] }"#)]
    #[case(r#"{ "skippable": ["IncorrectTokenCount"] }"#)]
    fn unknown_skippable_kinds_are_rejected(#[case] raw: &str) {
        assert!(serde_json::from_str::<ImportSettings>(raw).is_err());
    }
}
