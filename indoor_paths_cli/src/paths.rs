use std::path::{Path, PathBuf};

/// Inserts `suffix` before the input's extension, matching the source's
/// `input_file_name[:-4] + '__routes' + input_file_name[-4:]` (and `__merged` analogously) —
/// works for any extension, not just the source's hardcoded 4-character `.osm` slice.
pub fn with_suffix(input: &Path, suffix: &str) -> PathBuf {
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            let mut name = stem.to_string();
            name.push_str(suffix);
            name.push('.');
            name.push_str(ext);
            input.with_file_name(name)
        }
        None => {
            let mut name = input.to_string_lossy().into_owned();
            name.push_str(suffix);
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_suffix_before_extension() {
        assert_eq!(with_suffix(Path::new("building.osm"), "__routes"), PathBuf::from("building__routes.osm"));
    }

    #[test]
    fn falls_back_to_appending_when_extensionless() {
        assert_eq!(with_suffix(Path::new("building"), "__merged"), PathBuf::from("building__merged"));
    }
}
