//! The one posts-source adapter this workspace actually ships: a CSV file
//! reader, plus the CSV edge-table writer for the sink side.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;
use std::sync::LazyLock;

use coordination_core::{FinalEdge, PostId, RawPost};
use regex::Regex;
use snafu::{OptionExt as _, ResultExt as _};

use crate::error::{
    BadTimestampSnafu, CsvSnafu, ExcludeListSnafu, FlushSnafu, MissingColumnSnafu, OpenSnafu,
    PersistSnafu, PostsIoError, PostsOutputError, TempFileSnafu, WriteSnafu,
};

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// Tunables for the CSV posts source, mirroring the search-index adapter's
/// "hashtag regex / caller-supplied regex / optional lower-casing" knobs
/// (§6) even though only the file adapter is shipped here.
pub struct CsvSourceConfig {
    pub link_regex: Option<Regex>,
    pub lowercase: bool,
}

/// Reads `Post_ID, User_ID, Post_text, Post_time[, Post_links]` from a CSV
/// file and flattens it into one `RawPost` per `(post, entity)` pair.
pub fn read_posts(path: &Path, cfg: &CsvSourceConfig) -> Result<Vec<RawPost>, PostsIoError> {
    let file = File::open(path).context(OpenSnafu { path })?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(file);

    let headers = reader.headers().context(CsvSnafu { path })?.clone();
    let column = |name: &str| -> Result<usize, PostsIoError> {
        headers
            .iter()
            .position(|h| h == name)
            .context(MissingColumnSnafu {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let post_id_col = column("Post_ID")?;
    let user_id_col = column("User_ID")?;
    let time_col = column("Post_time")?;
    let text_col = headers.iter().position(|h| h == "Post_text");
    let links_col = headers.iter().position(|h| h == "Post_links");

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.context(CsvSnafu { path })?;
        let post_id = record.get(post_id_col).unwrap_or_default().to_string();
        let user_id = record.get(user_id_col).unwrap_or_default().to_string();
        let raw_time = record.get(time_col).unwrap_or_default();
        let post_time = parse_post_time(raw_time).context(BadTimestampSnafu {
            path: path.to_path_buf(),
            value: raw_time.to_string(),
        })?;

        let entities = match links_col {
            Some(col) => parse_link_list(record.get(col).unwrap_or_default()),
            None => {
                let text = text_col.and_then(|col| record.get(col)).unwrap_or_default();
                extract_hashtags(text, cfg.link_regex.as_ref())
            }
        };

        for entity in entities {
            let entity = if cfg.lowercase {
                entity.to_lowercase()
            } else {
                entity
            };
            out.push(RawPost {
                user_id: user_id.clone(),
                entity,
                post_time,
                post_id: post_id.clone(),
            });
        }
    }

    Ok(out)
}

/// Reads the exclusion list: one entity per line, case-folded (§6).
pub fn read_exclusions(path: &Path) -> Result<HashSet<String>, PostsIoError> {
    let content = std::fs::read_to_string(path).context(ExcludeListSnafu { path })?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Strips everything from the first `+` onward (trailing timezone offsets
/// are not needed for decay-constant math) and parses the remainder as
/// either an ISO-8601-ish timestamp or, failing that, a raw
/// Unix-epoch-seconds float, since some exported CSVs carry numeric
/// timestamps directly.
fn parse_post_time(raw: &str) -> Option<f64> {
    let stripped = raw.split('+').next().unwrap_or(raw).trim();
    if stripped.is_empty() {
        return None;
    }
    if let Ok(epoch) = stripped.parse::<f64>() {
        if epoch.is_finite() {
            return Some(epoch);
        }
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(stripped, fmt) {
            return Some(dt.and_utc().timestamp() as f64);
        }
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(stripped, "%Y-%m-%d") {
        let dt = date.and_hms_opt(0, 0, 0)?;
        return Some(dt.and_utc().timestamp() as f64);
    }
    None
}

/// Re-parses a `Post_links` cell as its own CSV record, letting several
/// comma-separated entities live in one column without inventing a
/// bespoke escaping rule.
fn parse_link_list(raw: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    if let Some(Ok(record)) = reader.records().next() {
        for field in record.iter() {
            if !field.is_empty() {
                out.insert(field.to_string());
            }
        }
    }
    out
}

fn extract_hashtags(text: &str, custom: Option<&Regex>) -> HashSet<String> {
    let re = custom.unwrap_or(&HASHTAG_RE);
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Writes the final edge table to `path`, going through a temp file in the
/// same directory and renaming atomically on success so a killed process
/// never leaves a partial output visible (§5).
pub fn write_edges(path: &Path, edges: &[FinalEdge]) -> Result<(), PostsOutputError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new(),
    }
    .context(TempFileSnafu {
        path: path.to_path_buf(),
    })?;

    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        writer
            .write_record(["From", "To", "Link", "Weight", "PostIDs_from", "PostIDs_to"])
            .context(WriteSnafu)?;
        for edge in edges {
            writer
                .write_record([
                    edge.from.as_str(),
                    edge.to.as_str(),
                    edge.entity.as_str(),
                    &edge.weight.to_string(),
                    &format_post_ids(&edge.post_ids_from),
                    &format_post_ids(&edge.post_ids_to),
                ])
                .context(WriteSnafu)?;
        }
        writer.flush().context(FlushSnafu)?;
    }

    tmp.persist(path).context(PersistSnafu {
        path: path.to_path_buf(),
    })?;
    Ok(())
}

/// Serialises a post-id list as a bracketed, quoted, comma-separated
/// sequence for a single CSV cell.
fn format_post_ids(ids: &[PostId]) -> String {
    let inner = ids
        .iter()
        .map(|id| format!("{:?}", id.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}
