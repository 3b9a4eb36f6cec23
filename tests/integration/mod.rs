// Integration test utilities and common code

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use folio::generation::QaPair;

/// Temporary working directory holding source documents and run outputs
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self { temp_dir, root_path }
    }

    /// Write a source document relative to the fixture root
    pub fn create_source_file<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write a PDF with one line of Courier text per page
    pub fn create_pdf_file<P: AsRef<Path>>(&self, relative_path: P, pages: &[&str]) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let kids: Vec<Object> = pages
            .iter()
            .map(|text| {
                let content = Content {
                    operations: vec![
                        Operation::new("BT", vec![]),
                        Operation::new("Tf", vec!["F1".into(), 12.into()]),
                        Operation::new("Td", vec![72.into(), 700.into()]),
                        Operation::new("Tj", vec![Object::string_literal(*text)]),
                        Operation::new("ET", vec![]),
                    ],
                };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().expect("Failed to encode page")));
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                    "Contents" => content_id,
                });
                page_id.into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages.len() as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(&file_path).expect("Failed to write test PDF");
        file_path
    }

    pub fn path<P: AsRef<Path>>(&self, relative_path: P) -> PathBuf {
        self.root_path.join(relative_path)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root_path.join("progress.txt")
    }

    pub fn read_checkpoint(&self) -> Option<String> {
        fs::read_to_string(self.checkpoint_path()).ok()
    }

    pub fn read_json<P: AsRef<Path>>(&self, relative_path: P) -> serde_json::Value {
        let content = fs::read_to_string(self.path(relative_path)).expect("Failed to read JSON output");
        serde_json::from_str(&content).expect("Output is not valid JSON")
    }

    pub fn read_pairs<P: AsRef<Path>>(&self, relative_path: P) -> Vec<QaPair> {
        let content = fs::read_to_string(self.path(relative_path)).expect("Failed to read pairs output");
        serde_json::from_str(&content).expect("Pairs output is not a list of pairs")
    }
}

/// Whitespace-separated tokens, for order-preserving content comparisons
pub fn tokens(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Build `count` sentences of exactly `non_ws` non-whitespace characters each
pub fn uniform_sentences(count: usize, non_ws: usize) -> String {
    assert!(non_ws >= 10 && non_ws % 5 == 0, "sentence size must be a multiple of five");
    let mut sentence = vec!["Abcde"];
    sentence.extend(std::iter::repeat("abcde").take(non_ws / 5 - 2));
    sentence.push("abcd.");
    vec![sentence.join(" "); count].join(" ")
}
