//! # Service settings
//!
//! [`Settings`] gathers everything a pipeline run needs to know about its surroundings: where the
//! archive API lives, where transient files go, which frames are eligible, and how to reach the
//! object store. It is built once per process and handed to the pipeline explicitly; nothing in
//! the crate reads credentials or endpoints from global state.

use camino::Utf8PathBuf;

/// Connection settings of the S3-compatible object store holding rendered thumbnails.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint, `None` for AWS itself
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            bucket: "thumbnails".into(),
            region: "us-west-2".into(),
            endpoint_url: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the archive API, always ending with a `/`
    pub archive_api_url: String,
    /// Directory receiving downloaded frames, aligned copies and rendered JPEGs
    pub tmp_dir: Utf8PathBuf,
    /// Prefix of every transient file name created by the service
    pub temp_filename_prefix: String,
    /// Configuration types a thumbnail can be generated for (upper case)
    pub valid_configuration_types: Vec<String>,
    /// Configuration types a color thumbnail can be generated for (upper case)
    pub color_configuration_types: Vec<String>,
    /// Recognized raw image filename extensions
    pub raw_image_extensions: Vec<String>,
    pub storage: StorageSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let to_strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Settings {
            archive_api_url: "http://localhost/".into(),
            tmp_dir: Utf8PathBuf::from("/tmp"),
            temp_filename_prefix: "thumbservice-".into(),
            valid_configuration_types: to_strings(&[
                "ARC",
                "EXPERIMENTAL",
                "EXPOSE",
                "GUIDE",
                "LAMPFLAT",
                "REPEAT_EXPOSE",
                "SKYFLAT",
                "SPECTRUM",
                "STANDARD",
                "TARGET",
                "TRAILED",
            ]),
            color_configuration_types: to_strings(&["EXPOSE", "REPEAT_EXPOSE", "STANDARD"]),
            raw_image_extensions: to_strings(&[".fits", ".fits.fz"]),
            storage: StorageSettings::default(),
        }
    }
}

impl Settings {
    /// Replace the archive API base URL, normalizing it to end with a `/`.
    pub fn with_archive_api_url(mut self, url: &str) -> Self {
        self.archive_api_url = format!("{}/", url.trim_end_matches('/'));
        self
    }

    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<Utf8PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    pub fn with_storage(mut self, storage: StorageSettings) -> Self {
        self.storage = storage;
        self
    }

    /// Listing endpoint of the archive frames collection.
    pub fn frames_url(&self) -> String {
        format!("{}frames/", self.archive_api_url)
    }

    /// Detail endpoint of one archive frame.
    pub fn frame_url(&self, frame_id: u64) -> String {
        format!("{}frames/{}/", self.archive_api_url, frame_id)
    }
}

#[cfg(test)]
mod settings_test {
    use super::*;

    #[test]
    fn test_archive_url_normalization() {
        let settings = Settings::default().with_archive_api_url("https://archive-api.lco.global");
        assert_eq!(settings.frames_url(), "https://archive-api.lco.global/frames/");
        assert_eq!(
            settings.frame_url(42),
            "https://archive-api.lco.global/frames/42/"
        );

        let settings = settings.with_archive_api_url("https://archive-api.lco.global//");
        assert_eq!(settings.archive_api_url, "https://archive-api.lco.global/");
    }

    #[test]
    fn test_bias_is_not_a_valid_configuration_type() {
        let settings = Settings::default();
        assert!(!settings
            .valid_configuration_types
            .contains(&"BIAS".to_string()));
        assert!(settings
            .color_configuration_types
            .iter()
            .all(|t| settings.valid_configuration_types.contains(t)));
    }
}
