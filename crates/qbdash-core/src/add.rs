//! Add-torrents form and its request body.

use qbdash_api_models::{AddTorrentsRequest, Category, Preferences, TorrentUpload};

use crate::error::{CoreError, CoreResult};
use crate::logic::{BYTES_PER_KB, effective_save_path};

/// User input for adding torrents from uploaded files or links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddTorrentsForm {
    /// Uploaded `.torrent` files.
    pub files: Vec<TorrentUpload>,
    /// Magnet or HTTP links, one per entry.
    pub links: Vec<String>,
    /// Let the daemon derive the save path from the category.
    pub auto_manage: bool,
    /// Manual save path.
    pub save_path: String,
    /// Category to assign.
    pub category: String,
    /// Cookie forwarded for HTTP links.
    pub download_cookie: String,
    /// Name override.
    pub torrent_name: String,
    /// Start right away.
    pub start_torrent: bool,
    /// Skip verifying existing data.
    pub skip_hash_check: bool,
    /// Create a subfolder for multi-file torrents.
    pub create_subfolder: bool,
    /// Download pieces in order.
    pub download_seq_order: bool,
    /// Fetch first and last pieces early.
    pub download_edge_first: bool,
    /// Download cap in kB/s, `0` for none.
    pub download_limit_kbps: i64,
    /// Upload cap in kB/s, `0` for none.
    pub upload_limit_kbps: i64,
}

impl AddTorrentsForm {
    /// Form pre-filled from the daemon preferences.
    #[must_use]
    pub fn from_preferences(preferences: Option<&Preferences>) -> Self {
        let defaults = preferences.cloned().unwrap_or_default();
        Self {
            save_path: defaults.save_path,
            start_torrent: !defaults.start_paused_enabled,
            create_subfolder: defaults.create_subfolder_enabled,
            ..Self::default()
        }
    }

    /// Directory the added torrents land in.
    #[must_use]
    pub fn destination(&self, preferences: Option<&Preferences>, categories: &[Category]) -> String {
        effective_save_path(
            preferences,
            categories,
            self.category.trim(),
            self.auto_manage,
            self.save_path.trim(),
        )
    }

    /// Links with blank entries removed.
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.links
            .iter()
            .map(|link| link.trim())
            .filter(|link| !link.is_empty())
    }

    /// Check that there is something to add and somewhere to put it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompleteAddForm`] naming the missing input.
    pub fn validate(&self) -> CoreResult<()> {
        if self.files.is_empty() && self.links().next().is_none() {
            return Err(CoreError::IncompleteAddForm {
                reason: "no torrent files or links",
            });
        }
        if !self.auto_manage && self.save_path.trim().is_empty() {
            return Err(CoreError::IncompleteAddForm {
                reason: "save path required without automatic management",
            });
        }
        Ok(())
    }

    /// Build the request body after validating the form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompleteAddForm`] when validation fails.
    pub fn to_request(&self) -> CoreResult<AddTorrentsRequest> {
        self.validate()?;

        let files: Vec<(String, String)> = self.files.iter().map(TorrentUpload::encoded).collect();
        let links: Vec<String> = self.links().map(str::to_string).collect();

        Ok(AddTorrentsRequest {
            files: (!files.is_empty()).then_some(files),
            links: (!links.is_empty()).then_some(links),
            download_cookie: non_empty(&self.download_cookie),
            category: non_empty(&self.category),
            save_path: if self.auto_manage {
                None
            } else {
                non_empty(&self.save_path)
            },
            torrent_name: non_empty(&self.torrent_name),
            download_limit: positive_limit(self.download_limit_kbps),
            upload_limit: positive_limit(self.upload_limit_kbps),
            auto_manage: self.auto_manage,
            start_torrent: self.start_torrent,
            skip_hash_check: self.skip_hash_check,
            create_subfolder: self.create_subfolder,
            download_seq_order: self.download_seq_order,
            download_edge_first: self.download_edge_first,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn positive_limit(limit_kbps: i64) -> Option<i64> {
    (limit_kbps > 0).then(|| limit_kbps.saturating_mul(BYTES_PER_KB))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_preferences() {
        let prefs = Preferences {
            save_path: "/downloads/".to_string(),
            start_paused_enabled: true,
            create_subfolder_enabled: true,
        };
        let form = AddTorrentsForm::from_preferences(Some(&prefs));
        assert_eq!(form.save_path, "/downloads/");
        assert!(!form.start_torrent);
        assert!(form.create_subfolder);

        let bare = AddTorrentsForm::from_preferences(None);
        assert!(bare.start_torrent);
    }

    #[test]
    fn destination_uses_manual_path_unless_auto_managed() {
        let prefs = Preferences {
            save_path: "/downloads/".to_string(),
            ..Preferences::default()
        };
        let mut form = AddTorrentsForm {
            save_path: " /data ".to_string(),
            category: "linux".to_string(),
            ..AddTorrentsForm::default()
        };
        assert_eq!(form.destination(Some(&prefs), &[]), "/data");

        form.auto_manage = true;
        assert_eq!(form.destination(Some(&prefs), &[]), "/downloads/linux");
    }

    #[test]
    fn empty_form_is_rejected() {
        let form = AddTorrentsForm {
            links: vec!["  ".to_string()],
            save_path: "/downloads/".to_string(),
            ..AddTorrentsForm::default()
        };
        assert_eq!(
            form.validate(),
            Err(CoreError::IncompleteAddForm {
                reason: "no torrent files or links"
            })
        );
    }

    #[test]
    fn manual_save_path_is_required_unless_auto_managed() {
        let mut form = AddTorrentsForm {
            links: vec!["magnet:?xt=urn:btih:abc".to_string()],
            ..AddTorrentsForm::default()
        };
        assert!(form.validate().is_err());

        form.auto_manage = true;
        let request = form.to_request().expect("auto-managed form is valid");
        assert_eq!(request.save_path, None);
        assert_eq!(
            request.links,
            Some(vec!["magnet:?xt=urn:btih:abc".to_string()])
        );
        assert_eq!(request.files, None);
    }

    #[test]
    fn request_carries_only_meaningful_options() {
        let form = AddTorrentsForm {
            files: vec![TorrentUpload {
                name: "a.torrent".to_string(),
                contents: vec![1, 2, 3],
            }],
            links: vec![String::new()],
            save_path: "/data".to_string(),
            category: "linux".to_string(),
            download_limit_kbps: 250,
            upload_limit_kbps: 0,
            start_torrent: true,
            ..AddTorrentsForm::default()
        };

        let request = form.to_request().expect("form is valid");
        assert_eq!(request.files.as_ref().map(Vec::len), Some(1));
        assert_eq!(request.links, None);
        assert_eq!(request.save_path.as_deref(), Some("/data"));
        assert_eq!(request.category.as_deref(), Some("linux"));
        assert_eq!(request.download_limit, Some(250_000));
        assert_eq!(request.upload_limit, None);
        assert_eq!(request.download_cookie, None);
        assert!(request.start_torrent);
    }
}
