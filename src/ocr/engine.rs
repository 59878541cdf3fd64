use anyhow::{Result, anyhow};
use image::DynamicImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::TesseractPaths;

/// Anything that turns an image into candidate text strings.
///
/// Implementations are built once and then only read from, so a single
/// instance can serve every frame of a run.
pub trait TextRecognizer {
    /// Returns recognized text, one entry per detected line, top to bottom.
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>>;
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        (**self).recognize(image)
    }
}

/// Tesseract driven as a child process, one call per image.
#[derive(Clone, Debug)]
pub struct TesseractEngine {
    paths: TesseractPaths,
    language: String,
    page_seg_mode: u8,
}

impl TesseractEngine {
    pub fn new(paths: TesseractPaths, language: &str, page_seg_mode: u8) -> Self {
        Self {
            paths,
            language: language.to_string(),
            page_seg_mode,
        }
    }

    /// Runs Tesseract and returns the recognized lines, top to bottom.
    pub fn recognize_lines(&self, img: &DynamicImage) -> Result<Vec<String>> {
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())?;

        // Tesseract appends .tsv to the output base
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = Command::new(&self.paths.executable)
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("--tessdata-dir")
            .arg(&self.paths.tessdata)
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(self.page_seg_mode.to_string())
            .arg("tsv")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content))
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<String>> {
        self.recognize_lines(image)
    }
}

/// Parses Tesseract TSV output into text lines.
///
/// TSV columns: level, page_num, block_num, par_num, line_num, word_num,
/// left, top, width, height, conf, text. Only level-5 (word) rows with text
/// and a non-negative confidence are kept; words are joined per
/// (block, paragraph, line).
pub fn parse_tsv_output(tsv: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current_key: Option<(i32, i32, i32)> = None;
    let mut current_words: Vec<&str> = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        let level: i32 = fields[0].parse().unwrap_or(-1);
        let key = (
            fields[2].parse().unwrap_or(-1),
            fields[3].parse().unwrap_or(-1),
            fields[4].parse().unwrap_or(-1),
        );
        let conf: f32 = fields[10].parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        if current_key.is_some_and(|k| k != key) && !current_words.is_empty() {
            lines.push(current_words.join(" "));
            current_words.clear();
        }
        current_key = Some(key);
        current_words.push(text);
    }

    if !current_words.is_empty() {
        lines.push(current_words.join(" "));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: i32, line: i32, word: i32, conf: f32, text: &str) -> String {
        format!("5\t1\t{}\t1\t{}\t{}\t0\t0\t10\t10\t{}\t{}", block, line, word, conf, text)
    }

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let tsv = [
            HEADER.to_string(),
            "1\t1\t0\t0\t0\t0\t0\t0\t100\t30\t-1\t".to_string(),
            word(1, 1, 1, 90.0, "Score:"),
            word(1, 1, 2, 80.0, "87"),
            word(1, 2, 1, 70.0, "HP"),
        ]
        .join("\n");

        let lines = parse_tsv_output(&tsv);
        assert_eq!(lines, vec!["Score: 87", "HP"]);
    }

    #[test]
    fn test_parse_tsv_same_line_number_in_new_block() {
        let tsv = [HEADER.to_string(), word(1, 1, 1, 90.0, "12"), word(2, 1, 1, 90.0, "34")].join("\n");

        let lines = parse_tsv_output(&tsv);
        assert_eq!(lines, vec!["12", "34"]);
    }

    #[test]
    fn test_parse_tsv_skips_empty_and_unconfident_words() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 1, 90.0, " "),
            word(1, 1, 2, -1.0, "ghost"),
            "garbage row".to_string(),
        ]
        .join("\n");

        assert!(parse_tsv_output(&tsv).is_empty());
        assert!(parse_tsv_output("").is_empty());
    }
}
