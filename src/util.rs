use chrono::{DateTime, Datelike, Utc};

pub fn month_key(timestamp: &DateTime<Utc>) -> String {
    format!("{:04}-{:02}", timestamp.year(), timestamp.month())
}

/// Lowercased alphanumerics and underscores of `name`, for use in file names.
pub fn sanitize_for_filename(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// `<prefix>_<timestamp>_<author>.<extension>`; several authors share one label.
pub fn report_file_name(
    prefix: &str,
    generated_at: &DateTime<Utc>,
    author_names: &[&str],
    extension: &str,
) -> String {
    let author = match author_names {
        [single] => {
            let clean = sanitize_for_filename(single);
            if clean.is_empty() {
                "unknown".to_string()
            } else {
                clean
            }
        }
        [] => "all_authors".to_string(),
        _ => "multiple_authors".to_string(),
    };
    format!(
        "{}_{}_{}.{}",
        prefix,
        generated_at.format("%Y-%m-%d-%H-%M-%S"),
        author,
        extension
    )
}
