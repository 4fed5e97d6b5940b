use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;

pub(crate) static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Word list a test draws from.
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load an embedded language by file stem, e.g. `"english"`.
    ///
    /// Language files are compiled into the binary, so a missing or malformed
    /// file is a packaging bug rather than a runtime condition.
    pub fn new(file_name: &str) -> Self {
        read_language_from_file(&format!("{file_name}.json"))
            .unwrap_or_else(|e| panic!("embedded language {file_name} is invalid: {e}"))
    }

    pub fn english() -> Self {
        Self::new("english")
    }

    /// Words containing at least one of `chars`.
    pub fn words_containing(&self, chars: &[char]) -> Vec<&str> {
        self.words
            .iter()
            .filter(|w| w.chars().any(|c| chars.contains(&c)))
            .map(String::as_str)
            .collect()
    }
}

pub(crate) fn read_embedded(file_name: &str) -> Result<&'static str, Box<dyn Error>> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| format!("language file not found: {file_name}"))?;

    file.contents_utf8()
        .ok_or_else(|| format!("language file is not utf-8: {file_name}").into())
}

fn read_language_from_file(file_name: &str) -> Result<Language, Box<dyn Error>> {
    let lang = from_str(read_embedded(file_name)?)?;

    Ok(lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_english() {
        let lang = Language::english();

        assert_eq!(lang.name, "english");
        assert!(!lang.words.is_empty());
        assert_eq!(lang.size as usize, lang.words.len());
        assert!(lang.words.iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn test_language_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 3,
            "words": ["hello", "world", "test"]
        }
        "#;

        let lang: Language = from_str(json_data).expect("Failed to deserialize test language");

        assert_eq!(lang.name, "test");
        assert_eq!(lang.size, 3);
        assert_eq!(lang.words.len(), 3);
    }

    #[test]
    fn test_words_containing() {
        let lang = Language {
            name: "test".to_string(),
            size: 4,
            words: vec![
                "easy".to_string(),
                "hard".to_string(),
                "zap".to_string(),
                "fox".to_string(),
            ],
        };

        assert_eq!(lang.words_containing(&['z', 'x']), vec!["zap", "fox"]);
        assert!(lang.words_containing(&['q']).is_empty());
        assert!(lang.words_containing(&[]).is_empty());
    }

    #[test]
    fn test_read_nonexistent_language_file() {
        assert!(read_language_from_file("nonexistent.json").is_err());
    }
}
