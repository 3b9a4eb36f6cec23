// Test fixtures: source documents shaped like real extracted text

#![allow(dead_code)]

/// Plain-text chapter with a numbered heading, a footnote marker, a
/// line-break hyphen and a typographic quote.
pub const CHAPTER_TEXT: &str = "1. Introduction To Paragraphs

The archive holds letters written over several decades. Each letter was trans-
cribed by hand before the originals were lost[1]. Readers often ask how the
collection survived. The answer is simple: a single librarian kept copies.

2. Method

We split every document into sentences. Sentences are then grouped into
paragraphs of a bounded size. No sentence is ever cut in half. The last
paragraph may be short when the text runs out. It is still kept.
";

/// Text carrying inline page markers the way the PDF loader emits them.
pub const PAGED_TEXT: &str = "<!-- PAGE 12 -->
The first page opens with a long sentence about the harbour and its ships. It goes on to describe the tides.

<!-- PAGE 13 -->
The second page turns to the town itself. Streets run down toward the water.

<!-- PAGE 14 -->
The third page closes the chapter with a quiet evening scene.
";

/// Turkish prose where sentences start with letters outside A-Z.
pub const TURKISH_TEXT: &str =
    "Kitap eski bir evde bulundu. İlk sayfası yırtılmıştı. Ünlü bir yazarın notları vardı. Çok az kişi biliyordu.";
