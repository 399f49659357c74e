//! Pure helpers that turn user input into daemon requests.

use qbdash_api_models::{Category, FilePriority, Preferences, Torrent, TorrentFile};

use crate::contents::{ItemPath, split_path};
use crate::error::{CoreError, CoreResult};

/// Bytes per second in one kB/s as entered by the user.
pub const BYTES_PER_KB: i64 = 1_000;

/// Save path a category resolves to: its own path when set, otherwise the
/// default save path with the category name appended.
#[must_use]
fn category_save_path(preferences: Option<&Preferences>, category: &Category) -> String {
    if category.save_path.is_empty() {
        let base = preferences.map_or("", |prefs| prefs.save_path.as_str());
        format!("{base}{}", category.name)
    } else {
        category.save_path.clone()
    }
}

/// Save path a new torrent will land in.
///
/// Manual paths win when the torrent is not auto-managed. Auto-managed
/// torrents follow their category, or the default save path without one.
#[must_use]
pub fn effective_save_path(
    preferences: Option<&Preferences>,
    categories: &[Category],
    category: &str,
    auto_manage: bool,
    manual: &str,
) -> String {
    if !auto_manage {
        return manual.to_string();
    }
    let default_path = || preferences.map_or_else(String::new, |prefs| prefs.save_path.clone());
    if category.is_empty() {
        return default_path();
    }
    categories
        .iter()
        .find(|candidate| candidate.name == category)
        .map_or_else(
            || {
                category_save_path(
                    preferences,
                    &Category {
                        name: category.to_string(),
                        save_path: String::new(),
                    },
                )
            },
            |found| category_save_path(preferences, found),
        )
}

/// Display form of a limit in kB/s.
#[must_use]
pub fn format_speed_limit(limit_kbps: i64) -> String {
    if limit_kbps <= 0 {
        "No limit".to_string()
    } else {
        format!("{limit_kbps} kB/s")
    }
}

/// Parse a kB/s limit from free text, keeping digits only. No digits means
/// no limit.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSpeedLimit`] when the number overflows.
pub fn parse_speed_limit(input: &str) -> CoreResult<i64> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Ok(0);
    }
    digits
        .parse::<i64>()
        .ok()
        .filter(|value| value.checked_mul(BYTES_PER_KB).is_some())
        .ok_or_else(|| CoreError::InvalidSpeedLimit {
            value: input.to_string(),
        })
}

/// Current limit in kB/s, rounded, as pre-filled in the limit dialog.
#[must_use]
pub fn limit_to_kbps(limit_bytes: i64) -> i64 {
    let rounded = (limit_bytes + BYTES_PER_KB / 2).div_euclid(BYTES_PER_KB);
    rounded.max(0)
}

/// Byte-per-second limit to send, or `None` when the answer was cancelled or
/// matches the current limit.
///
/// # Errors
///
/// Returns [`CoreError::InvalidSpeedLimit`] when the input cannot be parsed.
pub fn plan_speed_limit(current_bytes: i64, answer: Option<&str>) -> CoreResult<Option<i64>> {
    let Some(answer) = answer else {
        return Ok(None);
    };
    let requested = parse_speed_limit(answer)?.saturating_mul(BYTES_PER_KB);
    let unchanged = requested == current_bytes || (requested <= 0 && current_bytes <= 0);
    Ok((!unchanged).then_some(requested))
}

/// Indices of files covered by `targets` whose priority differs from the
/// requested one.
///
/// # Errors
///
/// Returns [`CoreError::MixedPriority`] when asked to apply `Mixed`.
pub fn resolve_priority_ids(
    files: &[TorrentFile],
    targets: &[ItemPath],
    priority: FilePriority,
) -> CoreResult<Vec<usize>> {
    if priority == FilePriority::Mixed {
        return Err(CoreError::MixedPriority);
    }
    Ok(files
        .iter()
        .enumerate()
        .filter(|(_, file)| {
            file.priority != priority && targets.iter().any(|target| target.covers(&file.name))
        })
        .map(|(id, _)| id)
        .collect())
}

/// Final segment of a file path, the part a rename replaces.
#[must_use]
pub fn leaf_name(path: &str) -> &str {
    split_path(path).last().unwrap_or(path)
}

/// Indices of files to rename and the trimmed new leaf name, or `None` when
/// the answer was cancelled, blank or unchanged.
#[must_use]
pub fn plan_file_rename<'a>(
    files: &[TorrentFile],
    path: &str,
    answer: Option<&'a str>,
) -> Option<(Vec<usize>, &'a str)> {
    let name = answer.map(str::trim).filter(|name| !name.is_empty())?;
    if name == leaf_name(path) {
        return None;
    }
    let ids: Vec<usize> = files
        .iter()
        .enumerate()
        .filter(|(_, file)| file.name == path)
        .map(|(id, _)| id)
        .collect();
    (!ids.is_empty()).then_some((ids, name))
}

/// New value from a text prompt, or `None` when cancelled, blank or unchanged.
#[must_use]
pub fn changed_text<'a>(current: &str, answer: Option<&'a str>) -> Option<&'a str> {
    answer
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != current)
}

/// Queue-position label: `#n` for queued, unfinished torrents.
#[must_use]
pub fn queue_label(torrent: &Torrent) -> Option<String> {
    (torrent.priority > 0 && !torrent.is_completed()).then(|| format!("#{}", torrent.priority))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(path: &str) -> Preferences {
        Preferences {
            save_path: path.to_string(),
            ..Preferences::default()
        }
    }

    fn category(name: &str, save_path: &str) -> Category {
        Category {
            name: name.to_string(),
            save_path: save_path.to_string(),
        }
    }

    fn file(name: &str, priority: FilePriority) -> TorrentFile {
        TorrentFile {
            name: name.to_string(),
            priority,
            ..TorrentFile::default()
        }
    }

    #[test]
    fn save_path_follows_category_then_default() {
        let prefs = prefs("/downloads/");
        let categories = vec![category("movies", "/media/movies"), category("tv", "")];

        assert_eq!(
            effective_save_path(Some(&prefs), &categories, "movies", false, "/manual"),
            "/manual"
        );
        assert_eq!(
            effective_save_path(Some(&prefs), &categories, "movies", true, "/manual"),
            "/media/movies"
        );
        assert_eq!(
            effective_save_path(Some(&prefs), &categories, "tv", true, ""),
            "/downloads/tv"
        );
        assert_eq!(
            effective_save_path(Some(&prefs), &categories, "", true, ""),
            "/downloads/"
        );
        assert_eq!(
            effective_save_path(Some(&prefs), &categories, "unknown", true, ""),
            "/downloads/unknown"
        );
        assert_eq!(effective_save_path(None, &categories, "tv", true, ""), "tv");
    }

    #[test]
    fn speed_limit_text_round_trips_through_display() {
        assert_eq!(format_speed_limit(0), "No limit");
        assert_eq!(format_speed_limit(-1), "No limit");
        assert_eq!(format_speed_limit(512), "512 kB/s");
        assert_eq!(parse_speed_limit("512 kB/s"), Ok(512));
        assert_eq!(parse_speed_limit("No limit"), Ok(0));
        assert!(parse_speed_limit("99999999999999999999").is_err());
        assert_eq!(limit_to_kbps(1_499), 1);
        assert_eq!(limit_to_kbps(1_500), 2);
        assert_eq!(limit_to_kbps(-1), 0);
    }

    #[test]
    fn limit_plan_skips_cancelled_and_unchanged_input() {
        assert_eq!(plan_speed_limit(0, None), Ok(None));
        assert_eq!(plan_speed_limit(512_000, Some("512 kB/s")), Ok(None));
        assert_eq!(plan_speed_limit(-1, Some("No limit")), Ok(None));
        assert_eq!(plan_speed_limit(512_000, Some("100")), Ok(Some(100_000)));
        assert_eq!(plan_speed_limit(512_000, Some("")), Ok(Some(0)));
    }

    #[test]
    fn priority_ids_skip_files_already_at_target() {
        let files = vec![
            file("a/one", FilePriority::Normal),
            file("a/two", FilePriority::High),
            file("b", FilePriority::Normal),
        ];
        let targets = vec![ItemPath::Directory("a/".to_string())];

        assert_eq!(
            resolve_priority_ids(&files, &targets, FilePriority::High),
            Ok(vec![0])
        );
        assert_eq!(
            resolve_priority_ids(&files, &[ItemPath::File("b".to_string())], FilePriority::Normal),
            Ok(vec![])
        );
        assert_eq!(
            resolve_priority_ids(&files, &targets, FilePriority::Mixed),
            Err(CoreError::MixedPriority)
        );
    }

    #[test]
    fn rename_plan_replaces_leaf_only_when_changed() {
        let files = vec![
            file("dir/old.txt", FilePriority::Normal),
            file("other.txt", FilePriority::Normal),
        ];

        assert_eq!(leaf_name("dir\\old.txt"), "old.txt");
        assert_eq!(
            plan_file_rename(&files, "dir/old.txt", Some(" new.txt ")),
            Some((vec![0], "new.txt"))
        );
        assert_eq!(plan_file_rename(&files, "dir/old.txt", Some("old.txt")), None);
        assert_eq!(plan_file_rename(&files, "dir/old.txt", Some("   ")), None);
        assert_eq!(plan_file_rename(&files, "dir/old.txt", None), None);
        assert_eq!(plan_file_rename(&files, "missing", Some("x")), None);
    }

    #[test]
    fn text_prompts_ignore_unchanged_answers() {
        assert_eq!(changed_text("name", Some("name")), None);
        assert_eq!(changed_text("name", None), None);
        assert_eq!(changed_text("name", Some("other")), Some("other"));
    }

    #[test]
    fn queue_label_hides_finished_and_unqueued() {
        let mut torrent = Torrent {
            priority: 2,
            size: 10,
            ..Torrent::default()
        };
        assert_eq!(queue_label(&torrent), Some("#2".to_string()));
        torrent.total_pieces = 1;
        torrent.bytes_downloaded = 10;
        assert_eq!(queue_label(&torrent), None);
    }
}
