//! TOML parser with helpful error messages

use super::profile::ProfileFile;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse spdeploy.toml with detailed error messages
pub fn parse_profiles(path: &Path) -> Result<ProfileFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

    parse_profiles_str(&content)
        .with_context(|| format!("Failed to parse profile file: {}", path.display()))
}

/// Parse spdeploy.toml content from string
pub fn parse_profiles_str(content: &str) -> Result<ProfileFile> {
    let file: ProfileFile =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    file.validate()?;

    Ok(file)
}

/// Enhance TOML parsing errors with the offending line and its neighbours
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let message = error.message().to_string();

    let line_num = error
        .span()
        .map(|span| line_of_offset(content, span.start));

    match line_num {
        Some(line_num) => anyhow::anyhow!(
            "TOML parsing error at line {}:\n{}\n\nError: {}",
            line_num,
            get_line_context(content, line_num),
            message
        ),
        None => anyhow::anyhow!("TOML parsing error: {}", message),
    }
}

/// 1-based line holding byte `offset`.
fn line_of_offset(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 1).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_valid_profiles() {
        let toml = r#"
[profile.default]
username = "admin@contoso.onmicrosoft.com"
tenant = "contoso"
site = "sites/apps"
filename = "solution.sppkg"

[profile.staging]
hostname = "https://staging.example.com"
site = "sites/catalog"
skip_feature_deployment = false
"#;

        let file = parse_profiles_str(toml).unwrap();
        assert_eq!(file.profile.len(), 2);
        let staging = file.get("staging").unwrap();
        assert_eq!(staging.skip_feature_deployment, Some(false));
        assert_eq!(
            staging.hostname.as_deref(),
            Some("https://staging.example.com")
        );
    }

    #[test]
    fn test_parse_empty_file() {
        let file = parse_profiles_str("").unwrap();
        assert!(file.profile.is_empty());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let toml = r#"
[profile.default]
usernme = "typo"
"#;
        assert!(parse_profiles_str(toml).is_err());
    }

    #[test]
    fn test_error_mentions_line() {
        let toml = "[profile.default]\nsite = [unclosed\n";
        let err = parse_profiles_str(toml).unwrap_err().to_string();
        assert!(err.contains("TOML parsing error"));
    }

    #[test]
    fn test_line_of_offset_at_line_start() {
        let content = "[profile.default]\ntenant = \"a\"\n=oops\n";
        let offset = content.find("=oops").unwrap();
        assert_eq!(line_of_offset(content, offset), 3);
        assert_eq!(line_of_offset(content, 0), 1);
        assert_eq!(line_of_offset(content, content.len()), 4);
    }

    #[test]
    fn test_parse_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[profile.default]
tenant = "contoso"
"#
        )
        .unwrap();

        let file = parse_profiles(temp_file.path()).unwrap();
        assert_eq!(
            file.get("default").unwrap().tenant.as_deref(),
            Some("contoso")
        );
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = parse_profiles(Path::new("/nonexistent/path/spdeploy.toml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read profile file")
        );
    }
}
